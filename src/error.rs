//! Simulation error taxonomy
//!
//! Malformed level geometry is rejected when a room loads. Lookups of ids that
//! are no longer live are reported but never fatal: a body can legitimately be
//! removed earlier in the same tick.

use thiserror::Error;

use crate::sim::BodyId;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid geometry in {what}: {reason}")]
    InvalidGeometry { what: String, reason: String },

    #[error("unknown collider reference: body {0}")]
    UnknownColliderReference(BodyId),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SimError {
    pub(crate) fn geometry(what: impl Into<String>, reason: impl Into<String>) -> Self {
        SimError::InvalidGeometry {
            what: what.into(),
            reason: reason.into(),
        }
    }
}
