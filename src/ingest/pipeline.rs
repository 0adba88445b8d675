use std::{borrow::Cow, sync::Arc};

use chrono::{DateTime, SubsecRound, Utc};
use thiserror::Error;
use tracing::{debug, error, info};

use super::{
    line::{self, LineError},
    payload::{self, PayloadError},
    status, PartialReading,
};
use crate::db::{
    models::{NewReading, StoredReading},
    ReadingStore, StoreError,
};

/// `panel_id` used when the submission names neither a panel nor a device.
pub const FALLBACK_PANEL_ID: &str = "PANEL-1";

const JSON_MEDIA_TYPE: &str = "application/json";

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("empty request body")]
    EmptyInput,
    #[error("invalid JSON payload: {0}")]
    InvalidPayload(#[from] PayloadError),
    #[error("failed to persist reading: {0}")]
    Persistence(#[from] StoreError),
}

impl From<LineError> for IngestError {
    fn from(e: LineError) -> Self {
        match e {
            LineError::EmptyInput => IngestError::EmptyInput,
        }
    }
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// Submission body, classified once by content type.
///
/// Structured bodies keep their raw bytes so that invalid UTF-8 is rejected
/// at decode time; plain text is decoded lossily.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload<'a> {
    Structured(&'a [u8]),
    PlainText(Cow<'a, str>),
}

impl<'a> Payload<'a> {
    /// Bodies whose content type mentions `application/json` (any case) are
    /// structured; everything else, including a missing header, is plain text.
    pub fn classify(content_type: Option<&str>, body: &'a [u8]) -> Self {
        let is_json = content_type
            .is_some_and(|ct| ct.to_ascii_lowercase().contains(JSON_MEDIA_TYPE));

        if is_json {
            Payload::Structured(body)
        } else {
            Payload::PlainText(String::from_utf8_lossy(body))
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Payload::Structured(_) => "structured",
            Payload::PlainText(_) => "plain_text",
        }
    }

    /// Decode into a partial reading without applying defaults.
    pub fn resolve(&self) -> Result<PartialReading, IngestError> {
        match self {
            Payload::Structured(bytes) => Ok(payload::parse_bytes(bytes)?),
            Payload::PlainText(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return Err(IngestError::EmptyInput);
                }
                Ok(line::parse(text)?)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Defaulting
// ---------------------------------------------------------------------------

impl PartialReading {
    /// Fill `panel_id` (`panel_id` → `device` → fallback) and `status`
    /// (recomputed only when absent), stamping `timestamp`.
    pub fn finish(self, timestamp: DateTime<Utc>) -> NewReading {
        let status = self.status.unwrap_or_else(|| {
            status::evaluate(self.voltage, self.current, self.temperature, self.load)
        });
        let panel_id = self
            .panel_id
            .or(self.device)
            .unwrap_or_else(|| FALLBACK_PANEL_ID.to_owned());

        NewReading {
            panel_id,
            voltage: self.voltage,
            current: self.current,
            load: self.load,
            temperature: self.temperature,
            status,
            timestamp,
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Classify → decode → default → persist, once per submission.
#[derive(Clone)]
pub struct IngestionPipeline {
    store: Arc<dyn ReadingStore>,
}

impl IngestionPipeline {
    pub fn new(store: Arc<dyn ReadingStore>) -> Self {
        Self { store }
    }

    pub async fn ingest(
        &self,
        content_type: Option<&str>,
        body: &[u8],
    ) -> Result<StoredReading, IngestError> {
        let payload = Payload::classify(content_type, body);
        debug!(kind = payload.kind(), bytes = body.len(), "Classified submission");

        let partial = payload.resolve()?;

        // Stored text keeps microseconds; truncate now so the echoed reading
        // matches what a later query returns.
        let reading = partial.finish(Utc::now().trunc_subsecs(6));

        let stored = self.store.insert(&reading).await.map_err(|e| {
            error!(panel_id = %reading.panel_id, error = %e, "Failed to persist reading");
            e
        })?;

        info!(
            id = stored.id,
            panel_id = %stored.panel_id,
            status = %stored.status,
            "Reading stored"
        );
        Ok(stored)
    }
}
