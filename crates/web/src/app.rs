//! Routes and handlers.
//!
//! The page has two states. `GET /` shows only the upload form. Uploading a
//! deck renders its cleaned text together with a generate button; the
//! cleaned deck travels back in that button's form, so nothing is kept on
//! the server between requests.

use crate::page::Page;
use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Form, Multipart, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use slidequiz_core::{ExtractedDeck, Quiz, Result, TextCleaner};
use slidequiz_llm::QuizClient;
use slidequiz_pptx::PptxParser;
use std::sync::Arc;

/// Multipart field carrying the uploaded deck.
const UPLOAD_FIELD: &str = "deck";

#[derive(Clone)]
pub struct AppState {
    cleaner: Arc<TextCleaner>,
    quiz_client: Arc<QuizClient>,
}

impl AppState {
    pub fn new(cleaner: TextCleaner, quiz_client: QuizClient) -> Self {
        Self {
            cleaner: Arc::new(cleaner),
            quiz_client: Arc::new(quiz_client),
        }
    }

    /// Parse and clean an uploaded deck.
    fn extract(&self, filename: &str, data: &[u8]) -> Result<ExtractedDeck> {
        let deck = PptxParser::new().parse_bytes(data, filename)?;
        Ok(self.cleaner.clean_deck(&deck))
    }

    /// Generate a quiz, falling back to an empty one on failure.
    async fn generate(&self, deck: &ExtractedDeck) -> (Quiz, Option<String>) {
        match self.quiz_client.generate(&deck.aggregated_text()).await {
            Ok(quiz) => (quiz, None),
            Err(e) => {
                log::error!("Quiz generation failed for {}: {}", deck.filename, e);
                (
                    Quiz::default(),
                    Some(format!(
                        "Error generating multiple-choice questions and summary: {}",
                        e
                    )),
                )
            }
        }
    }
}

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/upload", post(upload))
        .route("/generate", post(generate))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

type PageResponse = (StatusCode, Html<String>);

fn render(status: StatusCode, page: Page) -> PageResponse {
    (status, Html(page.to_string()))
}

async fn index() -> Html<String> {
    Html(Page::empty().to_string())
}

async fn health_check() -> &'static str {
    "OK"
}

async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> PageResponse {
    let (filename, data) = match read_upload(&mut multipart).await {
        Ok(Some(upload)) => upload,
        Ok(None) => {
            return render(
                StatusCode::BAD_REQUEST,
                Page::empty().with_error("No file was uploaded."),
            );
        }
        Err(e) => {
            log::warn!("Bad upload request: {}", e);
            return render(
                StatusCode::BAD_REQUEST,
                Page::empty().with_error(format!("Upload failed: {}", e)),
            );
        }
    };

    log::info!("Received {} ({} bytes)", filename, data.len());

    match state.extract(&filename, &data) {
        Ok(deck) => render(StatusCode::OK, Page::with_deck(deck)),
        Err(e) => {
            log::warn!("Could not read {}: {}", filename, e);
            render(
                StatusCode::UNPROCESSABLE_ENTITY,
                Page::empty().with_error(format!("Could not read {}: {}", filename, e)),
            )
        }
    }
}

/// The first file in the upload field, with its filename.
async fn read_upload(
    multipart: &mut Multipart,
) -> std::result::Result<Option<(String, Vec<u8>)>, MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field
            .file_name()
            .filter(|name| !name.is_empty())
            .unwrap_or("upload.pptx")
            .to_string();
        let data = field.bytes().await?;
        if data.is_empty() {
            return Ok(None);
        }
        return Ok(Some((filename, data.to_vec())));
    }

    Ok(None)
}

#[derive(Debug, Deserialize)]
struct GenerateForm {
    deck: String,
}

async fn generate(State(state): State<AppState>, Form(form): Form<GenerateForm>) -> PageResponse {
    let deck: ExtractedDeck = match serde_json::from_str(&form.deck) {
        Ok(deck) => deck,
        Err(e) => {
            log::warn!("Bad generate request: {}", e);
            return render(
                StatusCode::BAD_REQUEST,
                Page::empty().with_error("The extracted slides were missing; upload the file again."),
            );
        }
    };

    let (quiz, error) = state.generate(&deck).await;
    let mut page = Page::with_deck(deck).with_quiz(quiz);
    if let Some(error) = error {
        page = page.with_error(error);
    }

    render(StatusCode::OK, page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{GENERATE_LABEL, NO_TEXT_NOTICE, QUESTIONS_HEADING, SUMMARY_HEADING};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use axum::Json;
    use serde_json::{json, Value};
    use slidequiz_core::CleanedSlide;
    use slidequiz_llm::LlmConfig;
    use slidequiz_pptx::fixtures::{picture, text_shape, DeckFixture};
    use tokio::net::TcpListener;
    use tower::ServiceExt;

    const BOUNDARY: &str = "slidequiz-test-boundary";

    fn app_with_api(base_url: &str) -> Router {
        let client = QuizClient::new(LlmConfig::default().with_base_url(base_url)).unwrap();
        router(AppState::new(TextCleaner::new(), client), 10 * 1024 * 1024)
    }

    fn app() -> Router {
        app_with_api("http://127.0.0.1:9/v1")
    }

    fn multipart_body(filename: &str, data: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"deck\"; filename=\"{filename}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    async fn post_upload(app: Router, filename: &str, data: &[u8]) -> (StatusCode, String) {
        let request = Request::builder()
            .method("POST")
            .uri("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(filename, data)))
            .unwrap();
        send(app, request).await
    }

    async fn post_generate(app: Router, deck: &ExtractedDeck) -> (StatusCode, String) {
        let payload = serde_json::to_string(deck).unwrap();
        let request = Request::builder()
            .method("POST")
            .uri("/generate")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(serde_urlencoded::to_string([("deck", payload)]).unwrap()))
            .unwrap();
        send(app, request).await
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, String) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn spawn_fake_api(content: &'static str) -> String {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(move |Json(_body): Json<Value>| async move {
                Json(json!({"choices": [{"message": {"role": "assistant", "content": content}}]}))
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/v1", addr)
    }

    fn sample_deck() -> ExtractedDeck {
        ExtractedDeck {
            filename: "bio101.pptx".to_string(),
            slides: vec![
                CleanedSlide::new(1, "Cell structure"),
                CleanedSlide::new(2, "Mitochondria produce ATP"),
            ],
        }
    }

    #[tokio::test]
    async fn test_index() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let (status, html) = send(app(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains(r#"enctype="multipart/form-data""#));
        assert!(!html.contains(GENERATE_LABEL));
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }

    #[tokio::test]
    async fn test_upload_shows_cleaned_slides() {
        let bytes = DeckFixture::new()
            .slide(vec![
                text_shape(&["Networks ISB46703"]),
                text_shape(&["Prof. Tan"]),
            ])
            .slide(vec![text_shape(&["Routing \u{2013} basics"])])
            .build();

        let (status, html) = post_upload(app(), "week3.pptx", &bytes).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Filename: week3.pptx"));
        assert!(html.contains("<strong>Slide 1:</strong><pre>\nNetworks \n</pre>"));
        assert!(html.contains("<strong>Slide 2:</strong><pre>\nRouting - basics</pre>"));
        assert!(!html.contains("ISB46703"));
        assert!(html.contains(GENERATE_LABEL));
        assert!(!html.contains(QUESTIONS_HEADING));
    }

    #[tokio::test]
    async fn test_upload_without_text() {
        let bytes = DeckFixture::new()
            .slide(vec![picture()])
            .slide(vec![])
            .build();

        let (status, html) = post_upload(app(), "photos.pptx", &bytes).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains(NO_TEXT_NOTICE));
        assert!(html.contains("Slide 2:"));
    }

    #[tokio::test]
    async fn test_upload_rejects_other_files() {
        let (status, html) = post_upload(app(), "notes.txt", b"plain text notes").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(html.contains("Could not read notes.txt"));
        assert!(!html.contains(GENERATE_LABEL));
    }

    #[tokio::test]
    async fn test_generate_shows_quiz() {
        let base_url = spawn_fake_api(
            "1. What produces ATP?\nA) Nucleus\nB) Mitochondria\nC) Ribosome\nD) Golgi\nAnswer: B\n\n\
             2. Second question?\nA) a\nB) b\nC) c\nD) d\nAnswer: A\n--- Summary ---\nCells and energy.",
        )
        .await;

        let (status, html) = post_generate(app_with_api(&base_url), &sample_deck()).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Mitochondria produce ATP"));
        assert!(html.contains(QUESTIONS_HEADING));
        assert!(html.contains("1. What produces ATP?"));
        assert!(html.contains("2. Second question?"));
        assert!(html.contains(SUMMARY_HEADING));
        assert!(html.contains("<pre>\nCells and energy.</pre>"));
        assert!(!html.contains(r#"class="error""#));
    }

    #[tokio::test]
    async fn test_generate_failure_keeps_slides_visible() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let app = app_with_api(&format!("http://{}/v1", addr));
        let (status, html) = post_generate(app, &sample_deck()).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Error generating multiple-choice questions and summary"));
        assert!(html.contains("Cell structure"));
        assert!(html.contains(GENERATE_LABEL));
        assert!(!html.contains(r#"class="question""#));
    }

    #[tokio::test]
    async fn test_generate_with_bad_payload() {
        let request = Request::builder()
            .method("POST")
            .uri("/generate")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("deck=not-json"))
            .unwrap();
        let (status, html) = send(app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(html.contains("upload the file again"));
    }
}
