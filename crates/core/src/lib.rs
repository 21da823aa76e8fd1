//! Core domain types, boilerplate cleaning, and quiz prompt/response
//! handling for slide decks.

pub mod clean;
pub mod error;
pub mod quiz;
pub mod types;

pub use clean::{CleaningPass, TextCleaner};
pub use error::{Error, Result};
pub use quiz::{aggregate, parse_response, Quiz, QuizPrompt};
pub use types::{CleanedSlide, Deck, ExtractedDeck, Slide};
