//! Semantic analysis module.
//!
//! - analyzer: the static pass resolving names and checking types
//! - analysis: the side table recording per-node results

pub mod analysis;
pub mod analyzer;

#[cfg(test)]
mod tests;
