//! Row-level operations on the `diagnosticos` table.
//!
//! Identity, creation timestamp and initial state are stamped here and
//! only here. Callers hand in a validated payload and get a fresh id
//! back; they can never supply their own.

use std::str::FromStr;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{DiagnosticPayload, DiagnosticRecord, Trade, UrgencyLevel};

/// Initial job state stamped at creation.
pub const ESTADO_PENDIENTE: &str = "pendiente";

/// Sparse update: `None` means do-not-touch, never clear.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticUpdate {
    pub estado: Option<String>,
    pub garantia: Option<String>,
}

impl DiagnosticUpdate {
    pub fn is_empty(&self) -> bool {
        self.estado.is_none() && self.garantia.is_none()
    }
}

/// Persist a diagnostic payload as a new pending job. Returns the
/// store-assigned identifier.
pub fn insert_diagnostic(
    conn: &Connection,
    payload: &DiagnosticPayload,
) -> Result<Uuid, DatabaseError> {
    let id = Uuid::new_v4();
    let created_at = Utc::now().to_rfc3339();

    let steps = serde_json::to_string(&payload.technical_steps)
        .map_err(|e| DatabaseError::Corrupted {
            id: id.to_string(),
            reason: e.to_string(),
        })?;
    let materials = serde_json::to_string(&payload.suggested_materials)
        .map_err(|e| DatabaseError::Corrupted {
            id: id.to_string(),
            reason: e.to_string(),
        })?;

    conn.execute(
        "INSERT INTO diagnosticos (
            id, diagnostico_corto, diagnostico_detallado, nivel_urgencia,
            color_urgencia, solucion_tecnica_pasos, materiales_sugeridos,
            precio_mano_obra_min_ars, precio_mano_obra_max_ars,
            consejo_anti_verso, mini_contrato_sugerido, oficio_requerido,
            estado, created_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            id.to_string(),
            payload.short_diagnosis,
            payload.detailed_diagnosis,
            payload.urgency_level.as_str(),
            payload.urgency_color,
            steps,
            materials,
            payload.labor_price_min,
            payload.labor_price_max,
            payload.anti_fraud_advice,
            payload.suggested_contract,
            payload.required_trade.as_str(),
            ESTADO_PENDIENTE,
            created_at,
        ],
    )?;

    Ok(id)
}

/// Apply a sparse state update to an existing job.
///
/// Only `estado` and `garantia` are updatable; diagnostic content is
/// immutable after creation. Absent fields are left untouched.
pub fn update_diagnostic(
    conn: &Connection,
    id: &Uuid,
    update: &DiagnosticUpdate,
) -> Result<(), DatabaseError> {
    if update.is_empty() {
        // Nothing to apply, but the target must still exist.
        let exists: Option<String> = conn
            .query_row(
                "SELECT id FROM diagnosticos WHERE id = ?1",
                params![id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        return match exists {
            Some(_) => Ok(()),
            None => Err(DatabaseError::NotFound(id.to_string())),
        };
    }

    let id_str = id.to_string();
    let affected = match (&update.estado, &update.garantia) {
        (Some(estado), Some(garantia)) => conn.execute(
            "UPDATE diagnosticos SET estado = ?1, garantia = ?2 WHERE id = ?3",
            params![estado, garantia, id_str],
        )?,
        (Some(estado), None) => conn.execute(
            "UPDATE diagnosticos SET estado = ?1 WHERE id = ?2",
            params![estado, id_str],
        )?,
        (None, Some(garantia)) => conn.execute(
            "UPDATE diagnosticos SET garantia = ?1 WHERE id = ?2",
            params![garantia, id_str],
        )?,
        (None, None) => unreachable!("handled by is_empty above"),
    };
    if affected == 0 {
        return Err(DatabaseError::NotFound(id.to_string()));
    }
    Ok(())
}

/// Fetch up to `limit` jobs, most recent first. Insertion order breaks
/// timestamp ties. An empty table yields an empty vec, never an error.
pub fn list_recent(conn: &Connection, limit: u32) -> Result<Vec<DiagnosticRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, diagnostico_corto, diagnostico_detallado, nivel_urgencia,
                color_urgencia, solucion_tecnica_pasos, materiales_sugeridos,
                precio_mano_obra_min_ars, precio_mano_obra_max_ars,
                consejo_anti_verso, mini_contrato_sugerido, oficio_requerido,
                estado, garantia, created_at
         FROM diagnosticos
         ORDER BY created_at DESC, rowid DESC
         LIMIT ?1",
    )?;

    let rows = stmt.query_map(params![limit], |row| {
        Ok(RawRow {
            id: row.get(0)?,
            short_diagnosis: row.get(1)?,
            detailed_diagnosis: row.get(2)?,
            urgency_level: row.get(3)?,
            urgency_color: row.get(4)?,
            technical_steps: row.get(5)?,
            suggested_materials: row.get(6)?,
            labor_price_min: row.get(7)?,
            labor_price_max: row.get(8)?,
            anti_fraud_advice: row.get(9)?,
            suggested_contract: row.get(10)?,
            required_trade: row.get(11)?,
            estado: row.get(12)?,
            garantia: row.get(13)?,
            created_at: row.get(14)?,
        })
    })?;

    let mut records = Vec::new();
    for row in rows {
        records.push(row?.into_record()?);
    }
    Ok(records)
}

struct RawRow {
    id: String,
    short_diagnosis: String,
    detailed_diagnosis: String,
    urgency_level: String,
    urgency_color: String,
    technical_steps: String,
    suggested_materials: String,
    labor_price_min: i64,
    labor_price_max: i64,
    anti_fraud_advice: String,
    suggested_contract: String,
    required_trade: String,
    estado: String,
    garantia: Option<String>,
    created_at: String,
}

impl RawRow {
    fn into_record(self) -> Result<DiagnosticRecord, DatabaseError> {
        let corrupted = |reason: String| DatabaseError::Corrupted {
            id: self.id.clone(),
            reason,
        };

        let urgency_level =
            UrgencyLevel::from_str(&self.urgency_level).map_err(|e| corrupted(e.to_string()))?;
        let required_trade =
            Trade::from_str(&self.required_trade).map_err(|e| corrupted(e.to_string()))?;
        let technical_steps: Vec<String> = serde_json::from_str(&self.technical_steps)
            .map_err(|e| corrupted(e.to_string()))?;
        let suggested_materials: Vec<String> = serde_json::from_str(&self.suggested_materials)
            .map_err(|e| corrupted(e.to_string()))?;

        Ok(DiagnosticRecord {
            firestore_id: self.id,
            payload: DiagnosticPayload {
                short_diagnosis: self.short_diagnosis,
                detailed_diagnosis: self.detailed_diagnosis,
                urgency_level,
                urgency_color: self.urgency_color,
                technical_steps,
                suggested_materials,
                labor_price_min: self.labor_price_min,
                labor_price_max: self.labor_price_max,
                anti_fraud_advice: self.anti_fraud_advice,
                suggested_contract: self.suggested_contract,
                required_trade,
            },
            estado: self.estado,
            garantia: self.garantia,
            timestamp: self.created_at,
        })
    }
}
