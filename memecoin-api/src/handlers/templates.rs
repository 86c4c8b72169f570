//! Meme Template Handler

use axum::Json;
use serde_json::{json, Value};

use memecoin_core::meme_templates;

use crate::dto::TemplateDto;

/// `GET /api/templates`
///
/// The static template table clients compose images from.
pub async fn get_templates() -> Json<Value> {
    let templates: Vec<TemplateDto> = meme_templates().iter().map(TemplateDto::from).collect();
    Json(json!({ "templates": templates }))
}
