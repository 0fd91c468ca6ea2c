use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::AsRefStr;

use crate::RequirementPriority;

/// Outcome of resolving one requirement against the worker's holdings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum MatchStatus {
    ExactMatch,
    EquivalentMatch,
    HigherLevelMatch,
    PartialMatch,
    Expired,
    Missing,
}

impl MatchStatus {
    /// Percentage of the requirement weight granted by this outcome.
    pub fn weight_fraction(self) -> u32 {
        match self {
            MatchStatus::ExactMatch => 100,
            MatchStatus::EquivalentMatch => 95,
            MatchStatus::HigherLevelMatch => 90,
            MatchStatus::PartialMatch => 70,
            MatchStatus::Expired => 30,
            MatchStatus::Missing => 0,
        }
    }

    /// Counts toward the mandatory/preferred "met" tallies. Expired and
    /// partial credit keep score points but do not satisfy a requirement.
    pub fn counts_as_met(self) -> bool {
        matches!(
            self,
            MatchStatus::ExactMatch | MatchStatus::EquivalentMatch | MatchStatus::HigherLevelMatch
        )
    }

    /// One step down the credit ladder, applied when tenure falls short of
    /// a non-mandatory experience floor.
    pub fn downgraded(self) -> MatchStatus {
        match self {
            MatchStatus::ExactMatch => MatchStatus::EquivalentMatch,
            MatchStatus::EquivalentMatch => MatchStatus::HigherLevelMatch,
            MatchStatus::HigherLevelMatch => MatchStatus::PartialMatch,
            MatchStatus::PartialMatch => MatchStatus::Expired,
            MatchStatus::Expired | MatchStatus::Missing => MatchStatus::Missing,
        }
    }
}

/// Qualitative bucket derived from the numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum MatchTier {
    Perfect,
    Excellent,
    Good,
    Partial,
    Insufficient,
    Unqualified,
}

impl MatchTier {
    /// Fixed thresholds; every boundary is inclusive.
    pub fn from_score(score: u8) -> MatchTier {
        match score {
            95..=u8::MAX => MatchTier::Perfect,
            85..=94 => MatchTier::Excellent,
            70..=84 => MatchTier::Good,
            50..=69 => MatchTier::Partial,
            25..=49 => MatchTier::Insufficient,
            _ => MatchTier::Unqualified,
        }
    }
}

/// One resolved requirement line, produced fresh per evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDetail {
    /// The certificate type the job asked for; keys this line back to its
    /// requirement.
    pub certificate_type_id: String,
    pub priority: RequirementPriority,
    pub matched_holding_id: Option<String>,
    pub status: MatchStatus,
    /// Integer points this line feeds into the overall score numerator.
    pub score_contribution: u32,
    /// Human-readable explanation of how the line resolved.
    pub reason: String,
    /// Days until the matched holding expires; negative once expired,
    /// absent when nothing matched.
    pub days_until_expiry: Option<i64>,
}

/// An unresolved or expired requirement, annotated with its scoring impact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateGap {
    pub certificate_type_id: String,
    pub priority: RequirementPriority,
    /// Points the applicant would regain by resolving this gap in isolation.
    pub impact_score: u8,
    pub reason: String,
    pub recommendation: Option<String>,
    pub estimated_time_to_obtain_weeks: Option<u32>,
    pub estimated_cost_eur: Option<u32>,
}

/// A suggested acquisition, ranked by urgency and score benefit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateRecommendation {
    pub certificate_type_id: String,
    /// Highest-priority requirement line this acquisition would improve.
    pub priority: RequirementPriority,
    pub potential_score_improvement: u8,
    pub urgency_score: u8,
    /// Catalog ids the worker still needs before starting this one.
    pub prerequisites: Vec<String>,
    pub estimated_time_to_obtain_weeks: Option<u32>,
    pub estimated_cost_eur: Option<u32>,
}

/// The engine's output. Immutable once produced; collaborators consume it
/// read-only and may serialize it as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub job_id: String,
    pub owner_id: String,
    pub overall_score: u8,
    pub match_tier: MatchTier,
    pub is_eligible: bool,
    pub details: Vec<MatchDetail>,
    pub gaps: Vec<CertificateGap>,
    pub recommendations: Vec<CertificateRecommendation>,
    pub mandatory_met: usize,
    pub mandatory_total: usize,
    pub preferred_met: usize,
    pub preferred_total: usize,
    /// Triggered hard-fail conditions, empty when none fired.
    pub disqualified_reasons: Vec<String>,
    pub calculated_at: DateTime<Utc>,
    /// Days this result stays meaningful before the nearest matched holding
    /// expires and a recompute is due. Absent when nothing matched.
    pub valid_for_days: Option<i64>,
    pub engine_version: String,
    /// Process-level run id that produced this result.
    pub run_id: String,
}
