pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod matching;
pub mod normalize;
pub mod result;
pub mod run_id;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::AsRefStr;

/// Engine version stamped into every result for traceability.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

// Commonly used data models for evaluation inputs.

/// A worker's instance of a catalog certificate type.
///
/// Lifecycle status is never stored on the holding; it is derived from
/// `expiry_date` and `verified` on every read (see `lifecycle`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub id: String,
    pub owner_id: String,
    pub certificate_type_id: String,
    pub certificate_number: Option<String>,
    pub issue_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub verified: bool,
    /// Tenure with this certificate in months, supplied by the caller.
    /// Used only against `Requirement::min_experience_months`.
    pub experience_months: Option<u32>,
}

/// One line item of a job's certificate needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    pub certificate_type_id: String,
    pub priority: RequirementPriority,
    pub accept_equivalents: bool,
    pub accept_higher_levels: bool,
    pub min_experience_months: Option<u32>,
    /// Deadline by which the certificate must still be valid (job start date).
    pub required_by: Option<NaiveDate>,
}

/// A job's full certificate policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequirementSet {
    pub job_id: String,
    pub requirements: Vec<Requirement>,
    pub allow_partial_match: bool,
    /// Score threshold for eligibility, only applied when partial matching is allowed.
    pub minimum_match_score: u8,
    pub disqualifying_factors: Vec<DisqualifyingFactor>,
}

/// Priority of a requirement line; the weight doubles as its share in scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum RequirementPriority {
    Mandatory,
    Preferred,
    Advantageous,
    Optional,
}

impl RequirementPriority {
    /// Scoring weight of this priority line.
    pub fn weight(self) -> u32 {
        match self {
            RequirementPriority::Mandatory => 100,
            RequirementPriority::Preferred => 75,
            RequirementPriority::Advantageous => 50,
            RequirementPriority::Optional => 25,
        }
    }
}

/// Hard-fail policy conditions a job may attach to its requirement set.
/// Any triggered factor disqualifies regardless of the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum DisqualifyingFactor {
    /// The worker lacks a usable holding for a catalog-wide baseline certificate.
    MissingMandatoryBaseline,
    /// A mandatory requirement resolved only through an expired holding.
    ExpiredMandatory,
    /// A mandatory requirement's matched holding expires before the job's `required_by` date.
    LapsesBeforeStart,
}
