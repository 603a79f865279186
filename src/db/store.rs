//! Job store handle over the diagnostics database.
//!
//! Holds the database path and opens a fresh connection per operation,
//! so the handle is cheap to share across concurrent requests without
//! any in-process locking. `open` migrates eagerly: a broken database
//! path surfaces at startup, where the process degrades the feature
//! instead of crashing.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::repository::{insert_diagnostic, list_recent, update_diagnostic, DiagnosticUpdate};
use super::sqlite::open_database;
use super::DatabaseError;
use crate::models::{DiagnosticPayload, DiagnosticRecord};

pub struct JobStore {
    path: PathBuf,
}

impl JobStore {
    /// Open the store, creating and migrating the database if needed.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DatabaseError::MigrationFailed {
                version: 0,
                reason: format!("cannot create data directory: {e}"),
            })?;
        }
        // Eager open validates the path and applies migrations once.
        open_database(path)?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Persist a payload as a new pending job and return its id.
    pub fn create(&self, payload: &DiagnosticPayload) -> Result<Uuid, DatabaseError> {
        let conn = open_database(&self.path)?;
        insert_diagnostic(&conn, payload)
    }

    /// Apply a sparse state update to an existing job.
    pub fn update(&self, id: &Uuid, update: &DiagnosticUpdate) -> Result<(), DatabaseError> {
        let conn = open_database(&self.path)?;
        update_diagnostic(&conn, id, update)
    }

    /// Fetch up to `limit` jobs, most recent first.
    pub fn list_recent(&self, limit: u32) -> Result<Vec<DiagnosticRecord>, DatabaseError> {
        let conn = open_database(&self.path)?;
        list_recent(&conn, limit)
    }
}
