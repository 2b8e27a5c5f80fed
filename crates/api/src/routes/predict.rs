//! Predict route

use crate::error::ApiError;
use crate::AppState;
use axum::{extract::State, Json};
use data_validator::{Sex, ValidationError};
use feature_engine::{fields, FieldRecord, Preset, SchemaField};
use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;
use verdict::{RiskVerdict, Verdict};

/// Predict request
///
/// Preset values are applied first; explicit `fields` and `sex` override them.
#[derive(Debug, Default, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub preset: Option<Preset>,
    #[serde(default)]
    pub fields: FieldRecord,
    /// `Male` or `Female`, encoded into the `sex` field
    #[serde(default)]
    pub sex: Option<String>,
}

impl PredictRequest {
    /// Build the record to assemble
    pub fn into_record(self) -> Result<FieldRecord, ApiError> {
        let mut record = self
            .preset
            .and_then(|preset| preset.record())
            .unwrap_or_default();
        record.merge(&self.fields);

        if let Some(sex) = self.sex {
            let sex: Sex = sex
                .parse()
                .map_err(|e: ValidationError| ApiError::Validation(vec![e.to_string()]))?;
            record.insert(fields::SEX, sex.code());
        }
        Ok(record)
    }
}

/// Predict response
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub request_id: Uuid,
    pub verdict: RiskVerdict,
    pub message: &'static str,
    /// Predicted label, 0 or 1
    pub class: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability_display: Option<String>,
    pub latency_ms: f64,
}

/// Run the clinical form through the model
pub async fn predict(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, ApiError> {
    let request_id = Uuid::new_v4();
    debug!(%request_id, preset = ?request.preset, "Predict request received");

    let result = run_prediction(&state, request);
    match &result {
        Ok(_) => counter!("predictions_total").increment(1),
        Err(e) => counter!("prediction_rejections_total", "code" => e.code()).increment(1),
    }
    let (verdict, inference) = result?;

    let latency_ms = inference.latency_ms;
    histogram!("prediction_latency_ms").record(latency_ms);
    info!(
        %request_id,
        verdict = verdict.risk.as_str(),
        latency_ms,
        "Prediction complete"
    );

    Ok(Json(PredictResponse {
        request_id,
        verdict: verdict.risk,
        message: verdict.message(),
        class: inference.class.label(),
        probability: verdict.probability,
        probability_display: verdict.probability_display(),
        latency_ms,
    }))
}

fn run_prediction(
    state: &AppState,
    request: PredictRequest,
) -> Result<(Verdict, inference_engine::InferenceResult), ApiError> {
    let record = request.into_record()?;

    let required: Vec<&str> = state
        .engine
        .schema()
        .fields()
        .iter()
        .filter_map(|field| match field {
            SchemaField::Named { name } => Some(name.as_str()),
            SchemaField::Constant { .. } => None,
        })
        .collect();
    let validation = state.validator.validate_for(&record, required.as_slice());
    if !validation.valid {
        return Err(ApiError::Validation(
            validation.errors.iter().map(ToString::to_string).collect(),
        ));
    }

    // Withheld until the model, schema, and scaler agree
    if let Err(e) = &state.compatibility {
        return Err(e.clone().into());
    }

    let inference = state.engine.predict(&record)?;
    let verdict = Verdict::from_result(&inference, &state.verdict);
    Ok((verdict, inference))
}
