use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode, response::{IntoResponse, Response}, routing::{get, post}, Json, Router,
};
use bytes::Bytes;
use serde_json::{json, Value};
use tokio::task::JoinError;
use tower::layer::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::TraceLayer;

use crate::error::{MutableError, Result};
use crate::web::config::Config;
use crate::web::gene_page::{build_gene_page, GenePageStores};
use crate::web::lollipop_page::{build_lollipop_page, UploadStores};
use crate::web::sample_page::{build_sample_page, SamplePageStores};

pub struct AppState {
    pub config: Arc<Config>,
}

struct UploadedFile {
    file_name: String,
    contents: Bytes,
}

fn error_response(status: StatusCode, reason: &str) -> Response {
    let body = json!({
        "status": "error",
        "reason": reason,
    });

    (status, Json(body)).into_response()
}

async fn ping() -> String {
    String::from("OK")
}

async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Resource was not found.")
}

// pages built from the stored cohort databases
fn stored_page_response(page: &str,
                        res: std::result::Result<Result<Value>, JoinError>)
    -> Response
{
    match res {
        Ok(Ok(payload)) => (StatusCode::OK, Json(payload)).into_response(),
        Ok(Err(err @ MutableError::NotFound { .. })) => {
            tracing::info!("{}", err);
            error_response(StatusCode::NOT_FOUND, &err.user_message())
        },
        Ok(Err(err)) => {
            tracing::error!("{} page failed: {}", page, err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        },
        Err(err) => {
            tracing::error!("{} page task failed: {}", page, err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        },
    }
}

async fn get_gene_page(Path(gene_id): Path<String>, State(app_state): State<Arc<AppState>>)
    -> Response
{
    let config = app_state.config.clone();

    let res = tokio::task::spawn_blocking(move || -> Result<Value> {
        let stores = GenePageStores::open(&config)?;
        let payload = build_gene_page(&gene_id, &stores, &config)?;
        Ok(serde_json::to_value(payload)?)
    }).await;

    stored_page_response("gene", res)
}

async fn get_sample_page(Path(sample_id): Path<String>, State(app_state): State<Arc<AppState>>)
    -> Response
{
    let config = app_state.config.clone();

    let res = tokio::task::spawn_blocking(move || -> Result<Value> {
        let stores = SamplePageStores::open(&config)?;
        let payload = build_sample_page(&sample_id, &stores, &config)?;
        Ok(serde_json::to_value(payload)?)
    }).await;

    stored_page_response("sample", res)
}

async fn read_uploaded_file(multipart: &mut Multipart)
    -> std::result::Result<Option<UploadedFile>, MultipartError>
{
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("").to_owned();
        let contents = field.bytes().await?;

        return Ok(Some(UploadedFile {
            file_name,
            contents,
        }));
    }

    Ok(None)
}

async fn post_lollipop(State(app_state): State<Arc<AppState>>, mut multipart: Multipart)
    -> Response
{
    let uploaded_file =
        match read_uploaded_file(&mut multipart).await {
            Ok(Some(uploaded_file)) => uploaded_file,
            Ok(None) => return error_response(StatusCode::BAD_REQUEST, "No file uploaded"),
            Err(err) if err.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                tracing::info!("rejected upload: {}", err.body_text());
                return error_response(StatusCode::PAYLOAD_TOO_LARGE,
                                      "Uploaded file is too large");
            },
            Err(err) => {
                tracing::error!("failed to read upload: {}", err.body_text());
                return error_response(StatusCode::BAD_REQUEST, "Uploaded file could not be read");
            }
        };

    let config = app_state.config.clone();

    let res = tokio::task::spawn_blocking(move || -> Result<Value> {
        let stores = UploadStores::open(&config)?;
        let payload = build_lollipop_page(&uploaded_file.file_name, &uploaded_file.contents,
                                          &stores, &config)?;
        Ok(serde_json::to_value(payload)?)
    }).await;

    match res {
        Ok(Ok(payload)) => (StatusCode::OK, Json(payload)).into_response(),
        Ok(Err(err @ MutableError::Validation(_))) => {
            tracing::info!("rejected upload: {}", err);
            error_response(StatusCode::BAD_REQUEST, &err.user_message())
        },
        Ok(Err(err)) => {
            tracing::error!("lollipop plot failed: {}", err);
            error_response(StatusCode::BAD_REQUEST, &err.user_message())
        },
        Err(err) => {
            tracing::error!("lollipop task failed: {}", err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        },
    }
}

pub fn make_router(app_state: AppState) -> Router {
    let upload_size_limit = app_state.config.upload_size_limit;

    Router::new()
        .route("/api/v1/gene/{gene}", get(get_gene_page))
        .route("/api/v1/sample/{sample}", get(get_sample_page))
        .route("/api/v1/lollipop",
               post(post_lollipop).layer(DefaultBodyLimit::max(upload_size_limit)))
        .route("/ping", get(ping))
        .fallback(not_found)
        .with_state(Arc::new(app_state))
        .layer(TraceLayer::new_for_http())
}

// "/ping/" and "/ping" are the same route
pub fn make_app(app_state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(make_router(app_state))
}
