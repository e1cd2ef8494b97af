//! Identity keys for inspectors.
//!
//! Every inspector that participates in higher-level diffing owns a
//! process-unique key, issued by the [`AnalyzerConfiguration`] at
//! construction time. Keys are never reused and carry no ordering
//! semantics. Rebuilding an inspector list issues fresh keys for every
//! element, so identity is deliberately unstable across updates.
//!
//! [`AnalyzerConfiguration`]: crate::config::AnalyzerConfiguration

use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Process-unique identity of one inspector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct UuidKey(Uuid);

impl UuidKey {
    pub(crate) fn issue() -> Self {
        UuidKey(Uuid::new_v4())
    }
}

impl fmt::Display for UuidKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
