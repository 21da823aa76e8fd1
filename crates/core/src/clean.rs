//! Boilerplate removal for slide text.
//!
//! Course slides repeat course codes, lecturer names and template phrases on
//! nearly every page. Cleaning is a fixed, ordered list of rewrite passes;
//! each pass is a plain function so it can be tested on its own. Passes only
//! ever delete text or swap one character for another, so cleaned text is
//! never longer than its input.

use crate::{CleanedSlide, Deck, ExtractedDeck};
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// Course codes like `ISB46703`: 2-4 capitals then 4-6 digits, as a whole token.
static COURSE_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z]{2,4}\d{4,6}\b").unwrap());

/// An honorific followed by a capitalized name, e.g. `Dr. Smith`.
static LECTURER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(Prof\.?|Dr\.?|Lecturer|Professor|Mr\.?|Ms\.?)\s[A-Z][a-z]+").unwrap()
});

/// Template phrases removed wherever they occur, even inside words.
pub const UNWANTED_PHRASES: &[&str] = &["Slide", "OCTOBER", "Short URL"];

const EN_DASH: char = '\u{2013}';

/// A rewrite applied to a block of text.
pub type Rewrite = for<'a> fn(&'a str) -> Cow<'a, str>;

/// One named step of the cleaning pipeline.
#[derive(Debug, Clone, Copy)]
pub struct CleaningPass {
    pub name: &'static str,
    pub apply: Rewrite,
}

/// The cleaning pipeline, in the order the passes must run.
pub const DEFAULT_PASSES: [CleaningPass; 4] = [
    CleaningPass {
        name: "course_codes",
        apply: strip_course_codes,
    },
    CleaningPass {
        name: "lecturer_mentions",
        apply: strip_lecturer_mentions,
    },
    CleaningPass {
        name: "phrases",
        apply: strip_phrases,
    },
    CleaningPass {
        name: "dashes",
        apply: normalize_dashes,
    },
];

/// Remove course codes.
pub fn strip_course_codes(text: &str) -> Cow<'_, str> {
    COURSE_CODE_REGEX.replace_all(text, "")
}

/// Remove honorific + name pairs.
pub fn strip_lecturer_mentions(text: &str) -> Cow<'_, str> {
    LECTURER_REGEX.replace_all(text, "")
}

/// Remove every literal occurrence of [`UNWANTED_PHRASES`].
pub fn strip_phrases(text: &str) -> Cow<'_, str> {
    let mut result = Cow::Borrowed(text);
    for phrase in UNWANTED_PHRASES {
        if result.contains(phrase) {
            result = Cow::Owned(result.replace(phrase, ""));
        }
    }
    result
}

/// Replace en-dashes with plain hyphens.
pub fn normalize_dashes(text: &str) -> Cow<'_, str> {
    if text.contains(EN_DASH) {
        Cow::Owned(text.replace(EN_DASH, "-"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Applies the cleaning passes to slide text.
#[derive(Debug, Clone)]
pub struct TextCleaner {
    passes: Vec<CleaningPass>,
}

impl TextCleaner {
    /// Create a cleaner running [`DEFAULT_PASSES`].
    pub fn new() -> Self {
        Self {
            passes: DEFAULT_PASSES.to_vec(),
        }
    }

    /// Names of the passes, in run order.
    pub fn passes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.passes.iter().map(|p| p.name)
    }

    /// Clean a block of text. Never fails; empty input gives empty output.
    pub fn clean(&self, text: &str) -> String {
        let mut current = text.to_string();
        for pass in &self.passes {
            current = (pass.apply)(&current).into_owned();
        }
        current
    }

    /// Clean every slide of a deck.
    pub fn clean_deck(&self, deck: &Deck) -> ExtractedDeck {
        let slides: Vec<CleanedSlide> = deck
            .slides
            .iter()
            .map(|slide| CleanedSlide::new(slide.number, self.clean(&slide.raw_text())))
            .collect();

        log::debug!(
            "Cleaned {} slides of {} ({} with text)",
            slides.len(),
            deck.filename,
            slides.iter().filter(|s| !s.text.is_empty()).count()
        );

        ExtractedDeck {
            filename: deck.filename.clone(),
            slides,
        }
    }
}

impl Default for TextCleaner {
    fn default() -> Self {
        Self::new()
    }
}
