//! PPTX (Office Open XML) slide text extractor.
//!
//! Reads .pptx files, which are ZIP archives of XML parts, and returns the
//! text of each slide's text-bearing shapes in presentation order.

pub mod parser;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use parser::PptxParser;
