//! Canonical diagnostic shapes: the validated AI payload and the
//! persisted job record built around it.
//!
//! `DiagnosticPayload::from_value` is the single validating constructor
//! for untyped model output. It checks every field and reports all
//! offending ones at once, so a malformed response never turns into a
//! half-valid record downstream.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::enums::{Trade, UrgencyLevel};
use super::SchemaError;

/// Structured assessment produced by the vision model, before any
/// persistence metadata is attached. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiagnosticPayload {
    #[serde(rename = "diagnostico_corto")]
    pub short_diagnosis: String,
    #[serde(rename = "diagnostico_detallado")]
    pub detailed_diagnosis: String,
    #[serde(rename = "nivel_urgencia")]
    pub urgency_level: UrgencyLevel,
    /// Display hint (hex token), not validated against a palette.
    #[serde(rename = "color_urgencia")]
    pub urgency_color: String,
    #[serde(rename = "solucion_tecnica_pasos")]
    pub technical_steps: Vec<String>,
    #[serde(rename = "materiales_sugeridos")]
    pub suggested_materials: Vec<String>,
    #[serde(rename = "precio_mano_obra_min_ars")]
    pub labor_price_min: i64,
    #[serde(rename = "precio_mano_obra_max_ars")]
    pub labor_price_max: i64,
    #[serde(rename = "consejo_anti_verso")]
    pub anti_fraud_advice: String,
    #[serde(rename = "mini_contrato_sugerido")]
    pub suggested_contract: String,
    #[serde(rename = "oficio_requerido")]
    pub required_trade: Trade,
}

/// Persisted job record: payload plus store-assigned identity, job
/// state and timestamp. `estado`/`garantia` are the only fields the
/// update path may touch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticRecord {
    pub firestore_id: String,
    #[serde(flatten)]
    pub payload: DiagnosticPayload,
    pub estado: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub garantia: Option<String>,
    /// RFC 3339, stamped by the store clock at creation.
    pub timestamp: String,
}

impl DiagnosticPayload {
    /// Validate an untyped structure into a typed payload.
    ///
    /// Collects every offending field (missing, wrong type, enum token
    /// outside its closed set, inverted or negative price range) and
    /// fails with `SchemaError::InvalidFields` naming all of them.
    pub fn from_value(value: &Value) -> Result<Self, SchemaError> {
        let obj = value.as_object().ok_or(SchemaError::NotAnObject)?;
        let mut invalid: Vec<String> = Vec::new();

        let mut req_str = |field: &str| -> String {
            match obj.get(field).and_then(Value::as_str) {
                Some(s) if !s.trim().is_empty() => s.to_string(),
                _ => {
                    invalid.push(field.to_string());
                    String::new()
                }
            }
        };

        let short_diagnosis = req_str("diagnostico_corto");
        let detailed_diagnosis = req_str("diagnostico_detallado");
        let urgency_color = req_str("color_urgencia");
        let anti_fraud_advice = req_str("consejo_anti_verso");
        let suggested_contract = req_str("mini_contrato_sugerido");

        let urgency_level = parse_enum::<UrgencyLevel>(obj, "nivel_urgencia", &mut invalid);
        let required_trade = parse_enum::<Trade>(obj, "oficio_requerido", &mut invalid);

        let technical_steps = string_array(obj, "solucion_tecnica_pasos", &mut invalid);
        let suggested_materials = string_array(obj, "materiales_sugeridos", &mut invalid);

        let labor_price_min = int_field(obj, "precio_mano_obra_min_ars", &mut invalid);
        let labor_price_max = int_field(obj, "precio_mano_obra_max_ars", &mut invalid);
        if let (Some(min), Some(max)) = (labor_price_min, labor_price_max) {
            if min < 0 || max < 0 || min > max {
                invalid.push("precio_mano_obra_min_ars..precio_mano_obra_max_ars".to_string());
            }
        }

        if !invalid.is_empty() {
            return Err(SchemaError::InvalidFields(invalid));
        }

        Ok(Self {
            short_diagnosis,
            detailed_diagnosis,
            urgency_level: urgency_level.expect("validated above"),
            urgency_color,
            technical_steps,
            suggested_materials,
            labor_price_min: labor_price_min.expect("validated above"),
            labor_price_max: labor_price_max.expect("validated above"),
            anti_fraud_advice,
            suggested_contract,
            required_trade: required_trade.expect("validated above"),
        })
    }
}

fn parse_enum<T: FromStr>(
    obj: &serde_json::Map<String, Value>,
    field: &str,
    invalid: &mut Vec<String>,
) -> Option<T> {
    match obj.get(field).and_then(Value::as_str).map(T::from_str) {
        Some(Ok(v)) => Some(v),
        _ => {
            invalid.push(field.to_string());
            None
        }
    }
}

fn string_array(
    obj: &serde_json::Map<String, Value>,
    field: &str,
    invalid: &mut Vec<String>,
) -> Vec<String> {
    match obj.get(field).and_then(Value::as_array) {
        Some(arr) if arr.iter().all(Value::is_string) => arr
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => {
            invalid.push(field.to_string());
            Vec::new()
        }
    }
}

fn int_field(
    obj: &serde_json::Map<String, Value>,
    field: &str,
    invalid: &mut Vec<String>,
) -> Option<i64> {
    match obj.get(field).and_then(Value::as_i64) {
        Some(n) => Some(n),
        None => {
            invalid.push(field.to_string());
            None
        }
    }
}
