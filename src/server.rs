//! Web front-end: an upload form posting back to itself.

use crate::app::App;
use crate::frontend::{HtmlPresenter, Presenter, PreviewImage, RenderContext};
use crate::image::{mime, Upload};
use crate::{Error, Result};
use crate::error::error_chain;
use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Largest accepted form submission.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Hard cap on any request body. Leaves room above [`MAX_UPLOAD_BYTES`] so an
/// oversized upload is answered with the page rather than a bare 413.
const MAX_REQUEST_BYTES: usize = MAX_UPLOAD_BYTES + 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub app: Arc<App>,
    pub presenter: Arc<HtmlPresenter>,
}

pub fn create_router(app: Arc<App>, presenter: HtmlPresenter) -> Router {
    let state = AppState {
        app,
        presenter: Arc::new(presenter),
    };

    Router::new()
        .route("/", get(index_handler))
        .route("/analyze", post(analyze_handler).get(index_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index_handler(State(state): State<AppState>) -> Html<String> {
    let context = RenderContext::new(state.app.model(), "");
    Html(state.presenter.render_form(&context))
}

async fn health_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "model": state.app.model(),
    }))
}

/// Form fields of one submission.
#[derive(Debug, Default)]
struct Submission {
    question: String,
    upload: Option<Upload>,
}

fn multipart_error(e: MultipartError) -> Error {
    let cause = error_chain(&e);
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE || cause.contains("length limit exceeded") {
        Error::PayloadTooLarge(format!(
            "the limit is {} MB",
            MAX_UPLOAD_BYTES / (1024 * 1024)
        ))
    } else {
        Error::InvalidUpload(cause)
    }
}

async fn read_submission(multipart: &mut Multipart) -> Result<Submission> {
    let mut submission = Submission::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "question" => {
                submission.question = field
                    .text()
                    .await
                    .map_err(multipart_error)?;
            }
            "image" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?;

                // Browsers send an empty, nameless part when no file was picked.
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }

                let from_extension = mime::media_type_for_path(Path::new(&file_name))
                    .ok_or_else(|| {
                        Error::UnsupportedMediaType(format!(
                            "'{}' (supported formats: {})",
                            file_name,
                            mime::ALLOWED_EXTENSIONS.join(", ")
                        ))
                    })?;
                let media_type = content_type
                    .filter(|ct| ct.starts_with("image/"))
                    .unwrap_or_else(|| from_extension.to_string());

                submission.upload =
                    Some(Upload::new(bytes.to_vec(), media_type).with_file_name(file_name));
            }
            other => warn!("Ignoring unexpected form field '{}'", other),
        }
    }

    Ok(submission)
}

fn status_for(error: &Error) -> StatusCode {
    match error {
        Error::MissingInput(_) => StatusCode::BAD_REQUEST,
        Error::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        Error::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        Error::InvalidUpload(_) => StatusCode::BAD_REQUEST,
        Error::AnalysisFailure(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn analyze_handler(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let model = state.app.model();

    let submission = match read_submission(&mut multipart).await {
        Ok(submission) => submission,
        Err(e) => {
            warn!("Rejected submission: {}", e);
            let context = RenderContext::new(model, "");
            return (status_for(&e), Html(state.presenter.render_error(&e, &context)))
                .into_response();
        }
    };

    let preview = submission.upload.as_ref().and_then(PreviewImage::from_upload);
    let context = RenderContext::new(model, &submission.question).with_preview(preview.as_ref());

    info!(
        has_image = submission.upload.is_some(),
        "Received analysis submission"
    );

    match state
        .app
        .analyze(submission.upload, &submission.question)
        .await
    {
        Ok(result) => Html(state.presenter.render_result(&result, &context)).into_response(),
        Err(e) => (status_for(&e), Html(state.presenter.render_error(&e, &context))).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockAnalysisClient;
    use axum::body::Body;
    use axum::http::{header, Request};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    const BOUNDARY: &str = "X-IMAGE-ANALYST-BOUNDARY";
    const PNG_BYTES: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    fn build_router(mock: &MockAnalysisClient) -> Router {
        let app = App::with_service(Box::new(mock.clone()));
        create_router(Arc::new(app), HtmlPresenter::new())
    }

    fn multipart_body(question: &str, file: Option<(&str, &str, &[u8])>) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"question\"\r\n\r\n{}\r\n",
                BOUNDARY, question
            )
            .as_bytes(),
        );
        if let Some((file_name, content_type, bytes)) = file {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                    BOUNDARY, file_name, content_type
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    fn analyze_request(body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/analyze")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_index_renders_form() {
        let router = build_router(&MockAnalysisClient::new());
        let response = router
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains(r#"action="/analyze""#));
        assert!(html.contains("Powered by Google Gemini (mock-vision)"));
    }

    #[tokio::test]
    async fn test_health_reports_model() {
        let router = build_router(&MockAnalysisClient::new());
        let response = router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let value: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(value["status"], "ok");
        assert_eq!(value["model"], "mock-vision");
    }

    #[tokio::test]
    async fn test_analyze_renders_result() {
        let mock =
            MockAnalysisClient::new().with_response("A cat sitting on a windowsill.".to_string());
        let router = build_router(&mock);

        let body = multipart_body(
            "What is in this image?",
            Some(("cat.png", "image/png", &PNG_BYTES[..])),
        );
        let response = router.oneshot(analyze_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains("Analysis Complete!"));
        assert!(html.contains("A cat sitting on a windowsill."));
        assert!(html.contains(r#"value="What is in this image?""#));

        let call = mock.last_call().unwrap();
        assert_eq!(call.question, "What is in this image?");
        assert_eq!(call.media_type, "image/png");
        assert_eq!(call.image_len, PNG_BYTES.len());
    }

    #[tokio::test]
    async fn test_analyze_without_file_is_missing_input() {
        let mock = MockAnalysisClient::new();
        let router = build_router(&mock);

        let response = router
            .oneshot(analyze_request(multipart_body("What is this?", None)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = body_string(response).await;
        assert!(html.contains("An error occurred: Missing input: No file uploaded"));
        assert_eq!(mock.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_analyze_with_empty_file_part_is_missing_input() {
        let mock = MockAnalysisClient::new();
        let router = build_router(&mock);

        let body = multipart_body("?", Some(("", "application/octet-stream", &[0u8; 0][..])));
        let response = router.oneshot(analyze_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(mock.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_analyze_rejects_disallowed_extension_at_boundary() {
        let mock = MockAnalysisClient::new();
        let router = build_router(&mock);

        let body = multipart_body("?", Some(("anim.gif", "image/gif", &b"GIF89a"[..])));
        let response = router.oneshot(analyze_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        let html = body_string(response).await;
        assert!(html.contains("Unsupported image type"));
        assert_eq!(mock.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_analyze_falls_back_to_extension_media_type() {
        let mock = MockAnalysisClient::new();
        let router = build_router(&mock);

        let body = multipart_body(
            "?",
            Some(("photo.jpg", "application/octet-stream", &[0xFF, 0xD8, 0xFF][..])),
        );
        let response = router.oneshot(analyze_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(mock.last_call().unwrap().media_type, "image/jpeg");
    }

    #[tokio::test]
    async fn test_oversized_upload_is_payload_too_large() {
        let mock = MockAnalysisClient::new();
        let router = build_router(&mock);

        let big = vec![0u8; MAX_UPLOAD_BYTES + 1024];
        let body = multipart_body("?", Some(("big.png", "image/png", &big[..])));
        let response = router.oneshot(analyze_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let html = body_string(response).await;
        assert!(html.contains("An error occurred: Upload too large"));
        assert!(!html.contains("Missing input"));
        assert_eq!(mock.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_malformed_body_is_not_missing_input() {
        let mock = MockAnalysisClient::new();
        let router = build_router(&mock);

        let body = format!(
            "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"cat.png\"\r\n\r\nunterminated",
            BOUNDARY
        );
        let response = router
            .oneshot(analyze_request(body.into_bytes()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = body_string(response).await;
        assert!(html.contains("An error occurred: Could not read upload"));
        assert!(!html.contains("Missing input"));
        assert_eq!(mock.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_analysis_failure_renders_inline_notice() {
        let mock = MockAnalysisClient::new().with_failure("API key not valid".to_string());
        let router = build_router(&mock);

        let body = multipart_body("?", Some(("cat.png", "image/png", &PNG_BYTES[..])));
        let response = router.oneshot(analyze_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let html = body_string(response).await;
        assert!(html.contains("An error occurred: Analysis failed: API key not valid"));
        assert_eq!(mock.get_call_count(), 1);
    }
}
