use tracing::debug;

use crate::{
    catalog::Catalog,
    matching::coverage::ResolvedHolding,
    result::{MatchDetail, MatchStatus, MatchTier},
    DisqualifyingFactor, RequirementPriority, RequirementSet,
};

/// Aggregated verdict over all resolved requirement lines.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreSummary {
    pub overall_score: u8,
    pub match_tier: MatchTier,
    pub is_eligible: bool,
    pub mandatory_met: usize,
    pub mandatory_total: usize,
    pub preferred_met: usize,
    pub preferred_total: usize,
    pub disqualified_reasons: Vec<String>,
}

/// Aggregate per-requirement outcomes into the overall score and verdict.
///
/// An empty requirement set is trivially eligible with a score of 100.
/// Unmet mandatory lines always disqualify; the score threshold is an
/// additional gate only when the job allows partial matches.
pub fn summarize(
    set: &RequirementSet,
    details: &[MatchDetail],
    catalog: &Catalog,
    holdings: &[ResolvedHolding<'_>],
) -> ScoreSummary {
    let weight_sum: u32 = details.iter().map(|d| d.priority.weight()).sum();
    let contribution_sum: u32 = details.iter().map(|d| d.score_contribution).sum();

    let overall_score = if weight_sum == 0 {
        100
    } else {
        ((100.0 * contribution_sum as f64 / weight_sum as f64).round() as u8).min(100)
    };

    let mandatory_total = count(details, RequirementPriority::Mandatory, false);
    let mandatory_met = count(details, RequirementPriority::Mandatory, true);
    let preferred_total = count(details, RequirementPriority::Preferred, false);
    let preferred_met = count(details, RequirementPriority::Preferred, true);

    let disqualified_reasons = check_disqualifiers(set, details, catalog, holdings);

    let mandatory_gate = mandatory_met == mandatory_total;
    let score_gate = if set.allow_partial_match {
        overall_score >= set.minimum_match_score
    } else {
        true
    };
    let is_eligible = mandatory_gate && score_gate && disqualified_reasons.is_empty();

    debug!(
        job_id = %set.job_id,
        overall_score,
        mandatory_met,
        mandatory_total,
        is_eligible,
        "requirement set scored"
    );

    ScoreSummary {
        overall_score,
        match_tier: MatchTier::from_score(overall_score),
        is_eligible,
        mandatory_met,
        mandatory_total,
        preferred_met,
        preferred_total,
        disqualified_reasons,
    }
}

fn count(details: &[MatchDetail], priority: RequirementPriority, met_only: bool) -> usize {
    details
        .iter()
        .filter(|d| d.priority == priority && (!met_only || d.status.counts_as_met()))
        .count()
}

/// Evaluate the job's hard-fail conditions. Reasons are collected rather
/// than short-circuited so the caller can show all of them at once.
fn check_disqualifiers(
    set: &RequirementSet,
    details: &[MatchDetail],
    catalog: &Catalog,
    holdings: &[ResolvedHolding<'_>],
) -> Vec<String> {
    let mut reasons = Vec::new();

    for factor in &set.disqualifying_factors {
        match factor {
            DisqualifyingFactor::MissingMandatoryBaseline => {
                for baseline in catalog.mandatory_baseline() {
                    let held = holdings
                        .iter()
                        .any(|h| h.status.is_usable() && h.cert_type.id == baseline.id);
                    if !held {
                        reasons.push(format!(
                            "missing mandatory baseline certificate {}",
                            baseline.display_name
                        ));
                    }
                }
            }
            DisqualifyingFactor::ExpiredMandatory => {
                for detail in details {
                    if detail.priority == RequirementPriority::Mandatory
                        && detail.status == MatchStatus::Expired
                    {
                        reasons.push(format!(
                            "mandatory certificate {} only held in expired form",
                            detail.certificate_type_id
                        ));
                    }
                }
            }
            DisqualifyingFactor::LapsesBeforeStart => {
                for requirement in &set.requirements {
                    let Some(required_by) = requirement.required_by else {
                        continue;
                    };
                    if requirement.priority != RequirementPriority::Mandatory {
                        continue;
                    }
                    let Some(detail) = details
                        .iter()
                        .find(|d| d.certificate_type_id == requirement.certificate_type_id)
                    else {
                        continue;
                    };
                    if !detail.status.counts_as_met() {
                        continue;
                    }
                    let Some(holding_id) = detail.matched_holding_id.as_deref() else {
                        continue;
                    };
                    let lapses = holdings
                        .iter()
                        .find(|h| h.holding.id == holding_id)
                        .is_some_and(|h| h.holding.expiry_date < required_by);
                    if lapses {
                        reasons.push(format!(
                            "certificate for {} lapses before the job start on {}",
                            detail.certificate_type_id, required_by
                        ));
                    }
                }
            }
        }
    }

    reasons
}
