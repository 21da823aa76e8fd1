//! Domain types for representing extracted deck content.

use serde::{Deserialize, Serialize};

/// A slide deck as read from the uploaded file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deck {
    /// Original filename (without path).
    pub filename: String,

    /// Slides in presentation order.
    pub slides: Vec<Slide>,
}

impl Deck {
    /// Create an empty deck for the given filename.
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            slides: Vec::new(),
        }
    }

    /// Add a slide to the deck.
    pub fn add_slide(&mut self, slide: Slide) {
        self.slides.push(slide);
    }

    /// Number of slides in the deck.
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }
}

/// A single slide and the text of its text-bearing shapes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slide {
    /// 1-based slide number.
    pub number: usize,

    /// Text of each text-bearing shape, in shape order. Shapes with an
    /// empty text frame are kept as empty strings.
    pub shapes: Vec<String>,
}

impl Slide {
    /// Create a new slide with the given number.
    pub fn new(number: usize) -> Self {
        Self {
            number,
            shapes: Vec::new(),
        }
    }

    /// Create a slide with the given shape texts.
    pub fn with_shapes(number: usize, shapes: Vec<String>) -> Self {
        Self { number, shapes }
    }

    /// Add the text of one shape.
    pub fn add_shape(&mut self, text: impl Into<String>) {
        self.shapes.push(text.into());
    }

    /// All shape texts joined by newlines.
    pub fn raw_text(&self) -> String {
        self.shapes.join("\n")
    }
}

/// Slide text after boilerplate removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanedSlide {
    /// 1-based slide number.
    pub number: usize,

    /// Cleaned text.
    pub text: String,
}

impl CleanedSlide {
    pub fn new(number: usize, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }

    /// Display label, e.g. `Slide 3:`.
    pub fn label(&self) -> String {
        format!("Slide {}:", self.number)
    }
}

/// A deck after cleaning: what the page shows and what the quiz is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedDeck {
    /// Original filename.
    pub filename: String,

    /// Cleaned slides in presentation order.
    pub slides: Vec<CleanedSlide>,
}

impl ExtractedDeck {
    /// True if at least one slide has non-empty cleaned text.
    pub fn has_text(&self) -> bool {
        self.slides.iter().any(|s| !s.text.is_empty())
    }

    /// Cleaned slide texts joined into the text sent for quiz generation.
    pub fn aggregated_text(&self) -> String {
        crate::quiz::aggregate(&self.slides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_text_joins_shapes_with_newlines() {
        let slide = Slide::with_shapes(1, vec!["Title".into(), "".into(), "Body".into()]);
        assert_eq!(slide.raw_text(), "Title\n\nBody");
    }

    #[test]
    fn test_raw_text_empty_slide() {
        assert_eq!(Slide::new(4).raw_text(), "");
    }

    #[test]
    fn test_has_text() {
        let empty = ExtractedDeck {
            filename: "a.pptx".into(),
            slides: vec![CleanedSlide::new(1, ""), CleanedSlide::new(2, "")],
        };
        assert!(!empty.has_text());

        let some = ExtractedDeck {
            filename: "a.pptx".into(),
            slides: vec![CleanedSlide::new(1, ""), CleanedSlide::new(2, "Cells")],
        };
        assert!(some.has_text());
    }

    #[test]
    fn test_label() {
        assert_eq!(CleanedSlide::new(7, "x").label(), "Slide 7:");
    }
}
