//! Error types and error handling for the language pipeline.
//!
//! This module defines the error types shared by every stage. It includes:
//!
//! - Error structures with source position information
//! - Specific error variants for lexing, parsing, analysis and execution
//! - Error formatting and display functionality
//! - Helpful error messages and suggestions

pub mod errors;
