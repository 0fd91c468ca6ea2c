use chrono::{DateTime, Months, Utc};

use crate::{
    catalog::{Catalog, CertificateType},
    config::EngineConfig,
    matching::coverage::{resolve_requirement, ResolvedHolding},
    result::{CertificateGap, CertificateRecommendation, MatchDetail, MatchStatus},
    Holding, Requirement, RequirementPriority,
};

/// Derive problem items from the resolved lines: wholly absent
/// certificates, expired ones, and matched holdings that run out within
/// the expiring-soon window.
pub fn derive_gaps(
    details: &[MatchDetail],
    catalog: &Catalog,
    config: &EngineConfig,
) -> Vec<CertificateGap> {
    let weight_sum: u32 = details.iter().map(|d| d.priority.weight()).sum();
    if weight_sum == 0 {
        return Vec::new();
    }

    let mut gaps = Vec::new();
    for detail in details {
        let entry = catalog.get(&detail.certificate_type_id);
        let display = entry
            .map(|e| e.display_name.as_str())
            .unwrap_or(detail.certificate_type_id.as_str());
        let impact_score = share_of_total(detail.priority.weight(), weight_sum);

        match detail.status {
            MatchStatus::Missing => gaps.push(CertificateGap {
                certificate_type_id: detail.certificate_type_id.clone(),
                priority: detail.priority,
                impact_score,
                reason: format!("{display} is not held"),
                recommendation: Some(format!("obtain {display}")),
                estimated_time_to_obtain_weeks: entry.and_then(|e| e.typical_course_weeks),
                estimated_cost_eur: entry.and_then(|e| e.typical_cost_eur),
            }),
            MatchStatus::Expired => gaps.push(CertificateGap {
                certificate_type_id: detail.certificate_type_id.clone(),
                priority: detail.priority,
                impact_score,
                reason: format!("{display} is only held in expired form"),
                recommendation: Some(format!("renew {display}")),
                estimated_time_to_obtain_weeks: entry.and_then(|e| e.typical_course_weeks),
                estimated_cost_eur: entry.and_then(|e| e.typical_cost_eur),
            }),
            _ => {
                let Some(days) = detail.days_until_expiry else {
                    continue;
                };
                if detail.status.counts_as_met() && days <= config.expiring_soon_days {
                    gaps.push(CertificateGap {
                        certificate_type_id: detail.certificate_type_id.clone(),
                        priority: detail.priority,
                        impact_score,
                        reason: format!("{display} expires in {days} days"),
                        recommendation: Some(format!("renew {display} before it lapses")),
                        estimated_time_to_obtain_weeks: entry.and_then(|e| e.typical_course_weeks),
                        estimated_cost_eur: entry.and_then(|e| e.typical_cost_eur),
                    });
                }
            }
        }
    }

    gaps.sort_by(|a, b| {
        b.impact_score
            .cmp(&a.impact_score)
            .then_with(|| a.certificate_type_id.cmp(&b.certificate_type_id))
    });
    gaps
}

/// Sweep the whole catalog for worthwhile acquisitions.
///
/// For every entry without a usable holding, simulate a fresh valid
/// holding of that type, re-run the resolver over all requirement lines
/// and keep the candidates that raise the score. Brute force on purpose:
/// the catalog is tens of entries, so one extra resolver pass per entry
/// is cheap and keeps the logic identical to the real evaluation path.
///
/// `requirements` and `base_details` must be index-aligned (the pipeline
/// produces details in requirement order).
pub fn recommend(
    base_score: u8,
    base_details: &[MatchDetail],
    requirements: &[(&Requirement, &CertificateType)],
    catalog: &Catalog,
    holdings: &[ResolvedHolding<'_>],
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> Vec<CertificateRecommendation> {
    debug_assert_eq!(requirements.len(), base_details.len());
    let weight_sum: u32 = base_details.iter().map(|d| d.priority.weight()).sum();
    if weight_sum == 0 {
        return Vec::new();
    }

    let mut recommendations = Vec::new();

    for entry in catalog.entries() {
        let held_usable = holdings
            .iter()
            .any(|h| h.status.is_usable() && h.cert_type.id == entry.id);
        if held_usable {
            continue;
        }

        let hypothetical = hypothetical_holding(entry, now);
        let mut extended: Vec<ResolvedHolding<'_>> = Vec::with_capacity(holdings.len() + 1);
        extended.extend(holdings.iter().copied());
        extended.push(ResolvedHolding {
            holding: &hypothetical,
            cert_type: entry,
            status: hypothetical.lifecycle_status(now, config.expiring_soon_days),
        });

        let mut sim_contribution = 0u32;
        let mut best_priority: Option<RequirementPriority> = None;
        for (idx, (requirement, required_type)) in requirements.iter().enumerate() {
            let sim_detail = resolve_requirement(requirement, required_type, &extended, now);
            if sim_detail.score_contribution > base_details[idx].score_contribution {
                best_priority = Some(match best_priority {
                    Some(current) if current.weight() >= requirement.priority.weight() => current,
                    _ => requirement.priority,
                });
            }
            sim_contribution += sim_detail.score_contribution;
        }

        let sim_score = share_of_total(sim_contribution, weight_sum);
        if sim_score <= base_score {
            continue;
        }
        let Some(priority) = best_priority else {
            continue;
        };
        let improvement = sim_score - base_score;

        let unmet_prerequisites: Vec<String> = entry
            .prerequisites
            .iter()
            .filter(|prerequisite| {
                !holdings
                    .iter()
                    .any(|h| h.status.is_usable() && h.cert_type.id == **prerequisite)
            })
            .cloned()
            .collect();

        recommendations.push(CertificateRecommendation {
            certificate_type_id: entry.id.clone(),
            priority,
            potential_score_improvement: improvement,
            urgency_score: urgency_score(priority, improvement, unmet_prerequisites.len()),
            prerequisites: unmet_prerequisites,
            estimated_time_to_obtain_weeks: entry.typical_course_weeks,
            estimated_cost_eur: entry.typical_cost_eur,
        });
    }

    recommendations.sort_by(|a, b| {
        b.urgency_score
            .cmp(&a.urgency_score)
            .then_with(|| {
                b.potential_score_improvement
                    .cmp(&a.potential_score_improvement)
            })
            .then_with(|| a.certificate_type_id.cmp(&b.certificate_type_id))
    });
    recommendations.truncate(config.max_recommendations);
    recommendations
}

/// `round(100 * part / total)` capped into the score range.
fn share_of_total(part: u32, total: u32) -> u8 {
    ((100.0 * part as f64 / total as f64).round() as u8).min(100)
}

/// Blend of line priority, score benefit and acquisition friction.
fn urgency_score(priority: RequirementPriority, improvement: u8, unmet_prerequisites: usize) -> u8 {
    let raw = priority.weight() as f64 * 0.6 + improvement as f64 * 0.4
        - unmet_prerequisites as f64 * 15.0;
    raw.clamp(0.0, 100.0).round() as u8
}

fn hypothetical_holding(entry: &CertificateType, now: DateTime<Utc>) -> Holding {
    let issued = now.date_naive();
    Holding {
        id: format!("hypothetical-{}", entry.id),
        owner_id: String::new(),
        certificate_type_id: entry.id.clone(),
        certificate_number: None,
        issue_date: issued,
        expiry_date: issued + Months::new(entry.validity_months),
        verified: true,
        experience_months: None,
    }
}
