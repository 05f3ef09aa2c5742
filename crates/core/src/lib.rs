//! Core business logic for Matchbook.
//!
//! This crate contains pure business logic with ZERO file, network or logging
//! dependencies. Document types, validation rules, and match calculations live here.
//!
//! # Modules
//!
//! - `matching` - Three-way match of purchase order, goods receipt and invoice

pub mod matching;
