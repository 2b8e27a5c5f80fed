//! Preset routes

use crate::error::ApiError;
use axum::{extract::Path, Json};
use feature_engine::{FieldRecord, Preset};
use serde::Serialize;

/// Preset with its field values
#[derive(Debug, Serialize)]
pub struct PresetResponse {
    pub name: &'static str,
    /// Empty for `custom`
    pub fields: FieldRecord,
}

impl From<Preset> for PresetResponse {
    fn from(preset: Preset) -> Self {
        Self {
            name: preset.as_str(),
            fields: preset.record().unwrap_or_default(),
        }
    }
}

/// Get all presets
pub async fn list_presets() -> Json<Vec<PresetResponse>> {
    Json(Preset::ALL.into_iter().map(PresetResponse::from).collect())
}

/// Get one preset by name
pub async fn get_preset(Path(name): Path<String>) -> Result<Json<PresetResponse>, ApiError> {
    Preset::from_name(&name)
        .map(|preset| Json(preset.into()))
        .ok_or(ApiError::UnknownPreset(name))
}
