// src/extractors/mod.rs
pub mod patterns;
pub mod table;
pub mod verdict;

// Re-export key extraction types for convenience
#[allow(unused_imports)]
pub use patterns::{ChargeMatcher, ChargeSentencePair};
#[allow(unused_imports)]
pub use table::TableResult;
#[allow(unused_imports)]
pub use verdict::DocumentFacts;
