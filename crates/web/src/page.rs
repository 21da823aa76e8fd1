//! HTML rendering for the single page.

use html_escape::{encode_double_quoted_attribute, encode_text};
use slidequiz_core::{ExtractedDeck, Quiz};
use std::fmt;

pub const TITLE: &str = "PowerPoint Text Extractor and MCQ Generator";
pub const NO_TEXT_NOTICE: &str = "No text found in the PowerPoint.";
pub const GENERATE_LABEL: &str = "Generate MCQs and Summary";
pub const QUESTIONS_HEADING: &str = "Generated Multiple-Choice Questions with Answers";
pub const SUMMARY_HEADING: &str = "Generated Summary";

const STYLE: &str = r#"
        body { font-family: Arial, sans-serif; margin: 40px; max-width: 960px; }
        .upload-box { background-color: #f0f8ff; padding: 20px; border-radius: 8px; margin: 20px 0; }
        .slide { background-color: #f5f5f5; padding: 10px; margin: 10px 0; border-radius: 4px; }
        .slide pre, .question pre, .summary pre { white-space: pre-wrap; font-family: inherit; margin: 4px 0; }
        .question { border-left: 4px solid #4a90d9; padding: 4px 12px; margin: 12px 0; }
        .error { background-color: #fdecea; color: #611a15; padding: 12px; border-radius: 4px; margin: 20px 0; }
"#;

/// Everything the page can show. Fields left `None` are not rendered.
#[derive(Debug, Default)]
pub struct Page {
    /// The uploaded deck after cleaning.
    pub deck: Option<ExtractedDeck>,

    /// The deck serialized for the generate form.
    deck_payload: Option<String>,

    pub quiz: Option<Quiz>,

    /// Error banner text.
    pub error: Option<String>,
}

impl Page {
    /// The initial page: upload form only.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A page showing an extracted deck and the generate button.
    pub fn with_deck(deck: ExtractedDeck) -> Self {
        let deck_payload = match serde_json::to_string(&deck) {
            Ok(payload) => Some(payload),
            Err(e) => {
                log::error!("Failed to serialize deck for the generate form: {}", e);
                None
            }
        };
        Self {
            deck: Some(deck),
            deck_payload,
            ..Self::default()
        }
    }

    pub fn with_quiz(mut self, quiz: Quiz) -> Self {
        self.quiz = Some(quiz);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    fn write_upload_form(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, r#"    <div class="upload-box">"#)?;
        writeln!(
            f,
            r#"        <form action="/upload" method="post" enctype="multipart/form-data">"#
        )?;
        writeln!(f, r#"            <label for="deck">Upload a PowerPoint (PPTX)</label>"#)?;
        writeln!(
            f,
            r#"            <input type="file" id="deck" name="deck" accept=".pptx,application/vnd.openxmlformats-officedocument.presentationml.presentation" required>"#
        )?;
        writeln!(f, r#"            <button type="submit">Upload</button>"#)?;
        writeln!(f, "        </form>")?;
        writeln!(f, "    </div>")
    }

    fn write_deck(&self, f: &mut fmt::Formatter<'_>, deck: &ExtractedDeck) -> fmt::Result {
        writeln!(f, "    <p>Filename: {}</p>", encode_text(&deck.filename))?;
        writeln!(f, "    <h2>Extracted Text from PowerPoint</h2>")?;

        for slide in &deck.slides {
            writeln!(
                f,
                "    <div class=\"slide\"><strong>{}</strong><pre>\n{}</pre></div>",
                slide.label(),
                encode_text(&slide.text)
            )?;
        }

        if !deck.has_text() {
            writeln!(f, "    <p>{}</p>", NO_TEXT_NOTICE)?;
        }

        if let Some(ref payload) = self.deck_payload {
            writeln!(f, r#"    <form action="/generate" method="post">"#)?;
            writeln!(
                f,
                r#"        <input type="hidden" name="deck" value="{}">"#,
                encode_double_quoted_attribute(payload)
            )?;
            writeln!(f, r#"        <button type="submit">{}</button>"#, GENERATE_LABEL)?;
            writeln!(f, "    </form>")?;
        }

        Ok(())
    }

    fn write_quiz(&self, f: &mut fmt::Formatter<'_>, quiz: &Quiz) -> fmt::Result {
        writeln!(f, "    <h2>{}</h2>", QUESTIONS_HEADING)?;
        for question in &quiz.questions {
            writeln!(
                f,
                "    <div class=\"question\"><pre>\n{}</pre></div>",
                encode_text(question)
            )?;
        }

        if quiz.has_summary() {
            writeln!(f, "    <h2>{}</h2>", SUMMARY_HEADING)?;
            writeln!(
                f,
                "    <div class=\"summary\"><pre>\n{}</pre></div>",
                encode_text(&quiz.summary)
            )?;
        }

        Ok(())
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "<!DOCTYPE html>")?;
        writeln!(f, "<html>")?;
        writeln!(f, "<head>")?;
        writeln!(f, "    <title>{}</title>", TITLE)?;
        writeln!(f, r#"    <meta charset="utf-8">"#)?;
        writeln!(f, "    <style>{}    </style>", STYLE)?;
        writeln!(f, "</head>")?;
        writeln!(f, "<body>")?;
        writeln!(f, "    <h1>{}</h1>", TITLE)?;

        if let Some(ref error) = self.error {
            writeln!(f, r#"    <div class="error">{}</div>"#, encode_text(error))?;
        }

        self.write_upload_form(f)?;

        if let Some(ref deck) = self.deck {
            self.write_deck(f, deck)?;
        }

        if let Some(ref quiz) = self.quiz {
            self.write_quiz(f, quiz)?;
        }

        writeln!(f, "</body>")?;
        writeln!(f, "</html>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slidequiz_core::quiz::NO_SUMMARY;
    use slidequiz_core::CleanedSlide;

    fn deck(texts: &[&str]) -> ExtractedDeck {
        ExtractedDeck {
            filename: "week1.pptx".to_string(),
            slides: texts
                .iter()
                .enumerate()
                .map(|(i, t)| CleanedSlide::new(i + 1, *t))
                .collect(),
        }
    }

    #[test]
    fn test_empty_page_has_only_upload_form() {
        let html = Page::empty().to_string();
        assert!(html.contains(TITLE));
        assert!(html.contains(r#"action="/upload""#));
        assert!(!html.contains("Filename:"));
        assert!(!html.contains(GENERATE_LABEL));
    }

    #[test]
    fn test_deck_page_lists_slides() {
        let html = Page::with_deck(deck(&["Intro", "Cells & tissues"])).to_string();
        assert!(html.contains("Filename: week1.pptx"));
        assert!(html.contains("<strong>Slide 1:</strong><pre>\nIntro</pre>"));
        assert!(html.contains("<strong>Slide 2:</strong><pre>\nCells &amp; tissues</pre>"));
        assert!(html.contains(GENERATE_LABEL));
        assert!(!html.contains(NO_TEXT_NOTICE));
        assert!(!html.contains(QUESTIONS_HEADING));
    }

    #[test]
    fn test_no_text_notice() {
        let html = Page::with_deck(deck(&["", "", ""])).to_string();
        assert!(html.contains(NO_TEXT_NOTICE));
        assert!(html.contains("Slide 3:"));
    }

    #[test]
    fn test_hidden_payload_is_escaped() {
        let html = Page::with_deck(deck(&["say \"hi\" <b>"])).to_string();
        assert!(html.contains(r#"name="deck" value="{&quot;filename&quot;"#));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn test_quiz_with_summary() {
        let quiz = Quiz {
            questions: vec!["Q1?\nA) x\nAnswer: A".into(), "Q2?".into()],
            summary: "All about cells.".into(),
        };
        let html = Page::with_deck(deck(&["Cells"])).with_quiz(quiz).to_string();
        assert!(html.contains(QUESTIONS_HEADING));
        assert!(html.contains("<pre>\nQ1?\nA) x\nAnswer: A</pre>"));
        assert!(html.contains(SUMMARY_HEADING));
        assert!(html.contains("<pre>\nAll about cells.</pre>"));
    }

    #[test]
    fn test_placeholder_summary_not_shown() {
        let quiz = Quiz {
            questions: vec!["Q1?".into()],
            summary: NO_SUMMARY.into(),
        };
        let html = Page::with_deck(deck(&["Cells"])).with_quiz(quiz).to_string();
        assert!(!html.contains(NO_SUMMARY));
        assert!(!html.contains(SUMMARY_HEADING));
    }

    #[test]
    fn test_leading_newline_survives_pre() {
        let html = Page::with_deck(deck(&["\nB"])).to_string();
        assert!(html.contains("<strong>Slide 1:</strong><pre>\n\nB</pre>"));
    }

    #[test]
    fn test_error_banner_escaped() {
        let html = Page::empty().with_error("bad <file>").to_string();
        assert!(html.contains(r#"<div class="error">bad &lt;file&gt;</div>"#));
    }
}
