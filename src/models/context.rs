//! Explicit per-request context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata passed explicitly through every service call.
///
/// Carries the correlation id used in log fields, the acting user, and the
/// clock reading that stamps every record the call creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Identifier tying together the log lines of one request.
    pub correlation_id: Uuid,
    /// Who initiated the request.
    pub actor: String,
    /// The instant the request is evaluated at.
    pub now: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a context for `actor` with a fresh correlation id and the current time.
    pub fn new(actor: impl Into<String>) -> Self {
        Self::at(actor, Utc::now())
    }

    /// Creates a context pinned to a specific instant.
    pub fn at(actor: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            actor: actor.into(),
            now,
        }
    }
}
