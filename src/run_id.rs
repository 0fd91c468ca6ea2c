//! Process-level run id stamped into every `MatchResult`.
//!
//! Batch callers fan one worker out over many jobs; a shared, time-ordered
//! ULID per process lets downstream consumers group the results of one run
//! and tell reruns apart even on the same day.

use once_cell::sync::Lazy;
use ulid::Ulid;

static RUN_ID: Lazy<String> = Lazy::new(|| Ulid::new().to_string());

/// The run id of this process, generated on first use and stable after.
#[inline]
pub fn current() -> &'static str {
    &RUN_ID
}

/// A fresh ULID for sub-runs that need their own identity.
#[inline]
pub fn fresh() -> String {
    Ulid::new().to_string()
}
