//! HTTP routes
//!
//! Uploads are stored, analyzed on the blocking pool, and answered with
//! the narrative, the polylines and the path of a rendered overlay.

use crate::config::ServerConfig;
use anyhow::Context;
use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use image::ImageFormat;
use palm_pipeline::{decode_image, render::render_overlay, NamedLines, PalmError, PalmReader};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub struct AppState {
    pub config: ServerConfig,
    pub reader: PalmReader,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            reader: PalmReader::new(),
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/analyze", post(analyze))
        .route("/result/:filename", get(get_result))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("An image file is required")]
    MissingImage,

    #[error("File name is empty")]
    EmptyFileName,

    #[error("File not found")]
    NotFound,

    #[error("Could not read upload: {0}")]
    Upload(#[from] MultipartError),

    #[error(transparent)]
    Image(#[from] PalmError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::MissingImage | ApiError::EmptyFileName | ApiError::Image(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Upload(err) => err.status(),
            ApiError::Internal(err) => {
                tracing::error!("request failed: {:#}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    message: String,
    lines: NamedLines,
    result_image: String,
}

async fn health_check() -> &'static str {
    "OK"
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("image") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        upload = Some((file_name, bytes));
        break;
    }

    let (file_name, bytes) = upload.ok_or(ApiError::MissingImage)?;
    let file_name = sanitize_file_name(&file_name).ok_or(ApiError::EmptyFileName)?;
    tracing::info!(file = %file_name, bytes = bytes.len(), "analyzing upload");

    let response = tokio::task::spawn_blocking(move || process_upload(&state, &file_name, &bytes))
        .await
        .map_err(anyhow::Error::from)??;

    Ok(Json(response))
}

fn process_upload(
    state: &AppState,
    file_name: &str,
    bytes: &[u8],
) -> Result<AnalyzeResponse, ApiError> {
    let config = &state.config;

    std::fs::create_dir_all(&config.upload_dir).context("Failed to create upload directory")?;
    let upload_path = config.upload_dir.join(file_name);
    std::fs::write(&upload_path, bytes)
        .with_context(|| format!("Failed to store upload {}", upload_path.display()))?;

    let image = decode_image(bytes)?;
    let result = state.reader.analyze(&image)?;
    let overlay = render_overlay(&image, &result.visualization);

    std::fs::create_dir_all(&config.result_dir).context("Failed to create result directory")?;
    let result_name = result_file_name(bytes);
    let result_path = config.result_dir.join(&result_name);
    overlay
        .save_with_format(&result_path, ImageFormat::Png)
        .with_context(|| format!("Failed to write {}", result_path.display()))?;

    Ok(AnalyzeResponse {
        message: result.narrative,
        lines: result.lines,
        result_image: format!("/result/{result_name}"),
    })
}

async fn get_result(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if filename.contains(['/', '\\']) || filename.contains("..") {
        return Err(ApiError::NotFound);
    }
    let path = state.config.result_dir.join(&filename);
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| ApiError::NotFound)?;
    Ok(([(header::CONTENT_TYPE, "image/png")], bytes))
}

/// Final path component of an uploaded file name
fn sanitize_file_name(name: &str) -> Option<String> {
    let base = std::path::Path::new(name).file_name()?.to_str()?;
    (!base.is_empty()).then(|| base.to_string())
}

/// Overlay file name derived from the upload's SHA-256
fn result_file_name(bytes: &[u8]) -> String {
    let digest = format!("{:x}", Sha256::digest(bytes));
    format!("result_{}.png", &digest[..16])
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use image::{Rgb, RgbImage};
    use palm_pipeline::narrative::FALLBACK;
    use tower::ServiceExt;

    const BOUNDARY: &str = "palmlinesboundary";

    fn test_state(dir: &tempfile::TempDir) -> Arc<AppState> {
        Arc::new(AppState::new(ServerConfig {
            upload_dir: dir.path().join("uploads"),
            result_dir: dir.path().join("results"),
            ..ServerConfig::default()
        }))
    }

    fn multipart_request(field: &str, file_name: &str, content: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/analyze")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn png_bytes(image: &RgbImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let dir = tempfile::tempdir().unwrap();
        let response = router(test_state(&dir))
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_analyze_requires_image_field() {
        let dir = tempfile::tempdir().unwrap();
        let response = router(test_state(&dir))
            .oneshot(multipart_request("photo", "palm.png", b"abc"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"], "An image file is required");
    }

    #[tokio::test]
    async fn test_analyze_rejects_undecodable_upload() {
        let dir = tempfile::tempdir().unwrap();
        let response = router(test_state(&dir))
            .oneshot(multipart_request("image", "palm.png", b"not an image"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert!(json["error"].as_str().unwrap().contains("Failed to load image"));
    }

    #[tokio::test]
    async fn test_analyze_black_image_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(test_state(&dir));
        let upload = png_bytes(&RgbImage::from_pixel(40, 30, Rgb([0, 0, 0])));

        let response = app
            .clone()
            .oneshot(multipart_request("image", "../../palm.png", &upload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["message"], FALLBACK);
        assert_eq!(json["lines"], serde_json::json!({}));
        assert!(dir.path().join("uploads/palm.png").exists());

        let result_image = json["result_image"].as_str().unwrap().to_string();
        assert_eq!(result_image, format!("/result/{}", result_file_name(&upload)));

        let response = app
            .oneshot(Request::get(result_image.as_str()).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let overlay = image::load_from_memory(&bytes).unwrap();
        assert_eq!((overlay.width(), overlay.height()), (900, 675));
    }

    #[tokio::test]
    async fn test_result_rejects_traversal_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(test_state(&dir));

        for uri in ["/result/..%2Fsecret.png", "/result/missing.png"] {
            let response = app
                .clone()
                .oneshot(Request::get(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("a/b/palm.jpg").as_deref(), Some("palm.jpg"));
        assert_eq!(sanitize_file_name(""), None);
        assert_eq!(sanitize_file_name(".."), None);
    }
}
