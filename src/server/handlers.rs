//! HTTP handlers

use std::io::ErrorKind;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, info, warn};

use super::AppState;
use crate::ast::Document;
use crate::device;
use crate::error::Error;

/// Error returned to clients as `{"error": "<message>"}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match &err {
            Error::InvalidName(_) => ApiError::new(StatusCode::BAD_REQUEST, err.to_string()),
            Error::Io(e) if e.kind() == ErrorKind::NotFound => {
                ApiError::new(StatusCode::NOT_FOUND, "configuration not found")
            }
            Error::Json(_) | Error::InvalidJson(_) => ApiError::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("trouble loading request body: {}", err),
            ),
            e if e.is_syntax() => ApiError::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("trouble parsing configuration: {}", err),
            ),
            _ => {
                error!("{}", err);
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "trouble accessing configuration",
                )
            }
        }
    }
}

/// `GET /config/:name`, the configuration file as JSON
pub async fn get_config(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let doc = state.store.load(&name).map_err(|e| {
        warn!("Failed to load configuration {}: {}", name, e);
        ApiError::from(e)
    })?;
    Ok(Json(doc.to_json()))
}

/// `POST /config/:name`, replace the configuration file with the JSON body.
/// The file must already exist.
pub async fn update_config(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    device::validate_name(&name)?;
    let doc = Document::from_json(&body)?;
    let stored = state.store.store(&name, doc).map_err(|e| {
        warn!("Failed to update configuration {}: {}", name, e);
        ApiError::from(e)
    })?;
    info!("Updated configuration {}", name);
    Ok(Json(stored.to_json()))
}

/// `GET /devices`, the detected modem serial ports
pub async fn list_devices(State(state): State<Arc<AppState>>) -> Response {
    match state.devices.scan() {
        Ok(devices) => Json(devices).into_response(),
        Err(e) => {
            error!("Failed to scan {}: {}", state.devices.dev_dir().display(), e);
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "trouble scanning devices")
                .into_response()
        }
    }
}

/// `GET /`, the home page
pub async fn home(State(state): State<Arc<AppState>>) -> Response {
    let index_path = state.templates_dir.join("index.html");

    if index_path.exists() {
        match std::fs::read_to_string(&index_path) {
            Ok(content) => Html(content).into_response(),
            Err(e) => {
                error!("Failed to read index.html: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read index.html").into_response()
            }
        }
    } else {
        let names = state.store.list().unwrap_or_else(|e| {
            warn!("Failed to list {}: {}", state.store.dir().display(), e);
            Vec::new()
        });
        Html(generate_default_index(&names, state.dev)).into_response()
    }
}

/// Generate a page linking every configuration file
fn generate_default_index(names: &[String], dev: bool) -> String {
    let items: String = names
        .iter()
        .map(|name| format!("      <li><a href=\"/config/{0}\">{0}</a></li>\n", name))
        .collect();

    let banner = if dev {
        "    <p><strong>Development mode:</strong> editing a temporary copy of the sample files.</p>\n"
    } else {
        ""
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
    <title>fconf</title>
  </head>
  <body>
    <h1>Configuration files</h1>
{banner}    <ul>
{items}    </ul>
    <p><a href="/devices">Detected devices</a></p>
  </body>
</html>
"#
    )
}
