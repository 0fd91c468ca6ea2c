use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::result::{CertificateGap, CertificateRecommendation, MatchDetail, MatchResult};

/// Flattened, string-typed view of a `MatchResult` for GUI and
/// cross-service consumers that do not want to track the engine's enums.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchReport {
    pub job_id: String,
    pub owner_id: String,

    // === verdict ===
    pub overall_score: u8,
    pub match_tier: String,
    pub is_eligible: bool,
    /// "met/total", e.g. "2/3".
    pub mandatory_coverage: String,
    pub preferred_coverage: String,
    pub disqualified_reasons: Vec<String>,

    // === explanation ===
    pub lines: Vec<MatchLine>,
    pub gaps: Vec<GapLine>,
    pub recommendations: Vec<RecommendationLine>,

    // === metadata ===
    pub calculated_at: DateTime<Utc>,
    pub valid_for_days: Option<i64>,
    pub engine_version: String,
    pub run_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchLine {
    pub certificate_type_id: String,
    pub priority: String,
    pub status: String,
    pub matched_holding_id: Option<String>,
    pub score_contribution: u32,
    pub reason: String,
    pub days_until_expiry: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapLine {
    pub certificate_type_id: String,
    pub priority: String,
    pub impact_score: u8,
    pub reason: String,
    pub recommendation: Option<String>,
    pub estimated_time_to_obtain_weeks: Option<u32>,
    pub estimated_cost_eur: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationLine {
    pub certificate_type_id: String,
    pub priority: String,
    pub potential_score_improvement: u8,
    pub urgency_score: u8,
    pub prerequisites: Vec<String>,
    pub estimated_time_to_obtain_weeks: Option<u32>,
    pub estimated_cost_eur: Option<u32>,
}

impl From<&MatchResult> for MatchReport {
    fn from(result: &MatchResult) -> Self {
        Self {
            job_id: result.job_id.clone(),
            owner_id: result.owner_id.clone(),
            overall_score: result.overall_score,
            match_tier: result.match_tier.as_ref().to_string(),
            is_eligible: result.is_eligible,
            mandatory_coverage: format!("{}/{}", result.mandatory_met, result.mandatory_total),
            preferred_coverage: format!("{}/{}", result.preferred_met, result.preferred_total),
            disqualified_reasons: result.disqualified_reasons.clone(),
            lines: result.details.iter().map(MatchLine::from).collect(),
            gaps: result.gaps.iter().map(GapLine::from).collect(),
            recommendations: result
                .recommendations
                .iter()
                .map(RecommendationLine::from)
                .collect(),
            calculated_at: result.calculated_at,
            valid_for_days: result.valid_for_days,
            engine_version: result.engine_version.clone(),
            run_id: result.run_id.clone(),
        }
    }
}

impl From<&MatchDetail> for MatchLine {
    fn from(detail: &MatchDetail) -> Self {
        Self {
            certificate_type_id: detail.certificate_type_id.clone(),
            priority: detail.priority.as_ref().to_string(),
            status: detail.status.as_ref().to_string(),
            matched_holding_id: detail.matched_holding_id.clone(),
            score_contribution: detail.score_contribution,
            reason: detail.reason.clone(),
            days_until_expiry: detail.days_until_expiry,
        }
    }
}

impl From<&CertificateGap> for GapLine {
    fn from(gap: &CertificateGap) -> Self {
        Self {
            certificate_type_id: gap.certificate_type_id.clone(),
            priority: gap.priority.as_ref().to_string(),
            impact_score: gap.impact_score,
            reason: gap.reason.clone(),
            recommendation: gap.recommendation.clone(),
            estimated_time_to_obtain_weeks: gap.estimated_time_to_obtain_weeks,
            estimated_cost_eur: gap.estimated_cost_eur,
        }
    }
}

impl From<&CertificateRecommendation> for RecommendationLine {
    fn from(rec: &CertificateRecommendation) -> Self {
        Self {
            certificate_type_id: rec.certificate_type_id.clone(),
            priority: rec.priority.as_ref().to_string(),
            potential_score_improvement: rec.potential_score_improvement,
            urgency_score: rec.urgency_score,
            prerequisites: rec.prerequisites.clone(),
            estimated_time_to_obtain_weeks: rec.estimated_time_to_obtain_weeks,
            estimated_cost_eur: rec.estimated_cost_eur,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::matching::pipeline::MatchEngine;
    use crate::{Holding, Requirement, RequirementPriority, RequirementSet};
    use chrono::NaiveDate;

    #[test]
    fn report_flattens_enums_and_coverage() {
        let now = NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
            .and_utc();
        let held = Holding {
            id: "h-1".into(),
            owner_id: "w-1".into(),
            certificate_type_id: "vca-basic".into(),
            certificate_number: None,
            issue_date: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            expiry_date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            verified: true,
            experience_months: None,
        };
        let set = RequirementSet {
            job_id: "job-9".into(),
            requirements: vec![
                Requirement {
                    certificate_type_id: "vca-basic".into(),
                    priority: RequirementPriority::Mandatory,
                    accept_equivalents: false,
                    accept_higher_levels: false,
                    min_experience_months: None,
                    required_by: None,
                },
                Requirement {
                    certificate_type_id: "ehbo".into(),
                    priority: RequirementPriority::Preferred,
                    accept_equivalents: false,
                    accept_higher_levels: false,
                    min_experience_months: None,
                    required_by: None,
                },
            ],
            allow_partial_match: false,
            minimum_match_score: 0,
            disqualifying_factors: vec![],
        };

        let result = MatchEngine::default()
            .evaluate(Catalog::builtin(), &[held], &set, now)
            .unwrap();
        let report = MatchReport::from(&result);

        assert_eq!(report.mandatory_coverage, "1/1");
        assert_eq!(report.preferred_coverage, "0/1");
        assert_eq!(report.lines[0].status, "exactMatch");
        assert_eq!(report.lines[0].priority, "mandatory");
        assert_eq!(report.match_tier, "partial");

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["lines"][1]["status"], "missing");
        assert_eq!(json["overall_score"], 57);
    }
}
