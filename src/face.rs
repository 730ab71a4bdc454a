use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::{NavError, NavResult};
use crate::navigator::{NavigationRequest, Navigator, validate_goal};
use crate::screenshot::Screenshot;
use crate::types::Action;

#[derive(Clone)]
pub struct AppState {
    pub navigator: Arc<Navigator>,
}

/// JSON body for the base64 endpoint.
#[derive(Debug, Deserialize)]
pub struct NavigateBase64Payload {
    pub image_base64: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    pub goal: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
}

/// Build the service router. `max_body_bytes` caps uploads on both endpoints.
pub fn router(navigator: Arc<Navigator>, max_body_bytes: usize) -> Router {
    let state = AppState { navigator };

    Router::new()
        .route("/api/navigate", post(navigate_multipart))
        .route("/api/navigate/base64", post(navigate_base64))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CorsLayer::very_permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn navigate_multipart(
    State(state): State<AppState>,
    multipart: Multipart,
) -> NavResult<Json<Action>> {
    let request = read_multipart(multipart).await?;
    let action = state.navigator.navigate(request).await?;
    Ok(Json(action))
}

async fn navigate_base64(
    State(state): State<AppState>,
    payload: Result<Json<NavigateBase64Payload>, JsonRejection>,
) -> NavResult<Json<Action>> {
    let Json(payload) = payload.map_err(|e| NavError::rejected(e.status(), e.body_text()))?;
    tracing::debug!("POST /api/navigate/base64");

    let screenshot = Screenshot::from_base64(&payload.image_base64, payload.mime_type.as_deref())?;

    let action = state
        .navigator
        .navigate(NavigationRequest {
            goal: payload.goal,
            session_id: payload.session_id,
            context: payload.context,
            screenshot,
        })
        .await?;
    Ok(Json(action))
}

/// Collect the form fields, then validate in a fixed order: goal, file
/// presence, extension, content.
async fn read_multipart(mut multipart: Multipart) -> NavResult<NavigationRequest> {
    let mut goal = None;
    let mut session_id = None;
    let mut context = None;
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| NavError::rejected(e.status(), e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "screenshot" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| NavError::rejected(e.status(), e.body_text()))?;
                upload = Some((filename, bytes.to_vec()));
            }
            "goal" | "session_id" | "context" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| NavError::rejected(e.status(), e.body_text()))?;
                match name.as_str() {
                    "goal" => goal = Some(value),
                    "session_id" => session_id = Some(value),
                    _ => context = Some(value),
                }
            }
            other => tracing::debug!("ignoring unknown form field '{}'", other),
        }
    }

    let goal = goal.unwrap_or_default();
    validate_goal(&goal)?;

    let (filename, bytes) =
        upload.ok_or_else(|| NavError::invalid("A screenshot file is required."))?;
    tracing::debug!("POST /api/navigate: {} ({} bytes)", filename, bytes.len());
    let screenshot = Screenshot::from_upload(&filename, bytes)?;

    Ok(NavigationRequest {
        goal,
        session_id,
        context,
        screenshot,
    })
}
