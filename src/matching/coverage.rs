use chrono::{DateTime, Utc};

use crate::{
    catalog::CertificateType,
    lifecycle::LifecycleStatus,
    result::{MatchDetail, MatchStatus},
    Holding, Requirement, RequirementPriority,
};

/// Directed coverage carried over from licensing rules: the guard diploma
/// also licenses event work, although the catalog models both certificates
/// at the same level. The reverse direction does not hold.
const SIBLING_COVERAGE: &[(&str, &str)] = &[("security-guard-2", "event-security")];

/// A holding joined with its catalog entry and lifecycle at evaluation time.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedHolding<'a> {
    pub holding: &'a Holding,
    pub cert_type: &'a CertificateType,
    pub status: LifecycleStatus,
}

/// Coverage rule: can a holding of `held` stand in for a requirement of
/// `required`? Same category and a strictly higher level, or one of the
/// explicitly allowed sibling pairs.
pub fn covers_higher_level(held: &CertificateType, required: &CertificateType) -> bool {
    if held.id == required.id {
        return false;
    }
    if SIBLING_COVERAGE
        .iter()
        .any(|(top, entry)| held.id == *top && required.id == *entry)
    {
        return true;
    }
    held.category == required.category
        && held.level.hierarchy_level() > required.level.hierarchy_level()
}

/// Resolve one requirement to its single best `MatchDetail`.
///
/// Tiers are tried in order and the first hit wins: exact, equivalent name
/// (gated on `accept_equivalents`), higher-level coverage (gated on
/// `accept_higher_levels`), expired right-type credit, missing. Within one
/// tier the holding with the latest expiry wins; ties break on holding id
/// so the result is reproducible.
pub fn resolve_requirement(
    requirement: &Requirement,
    required_type: &CertificateType,
    holdings: &[ResolvedHolding<'_>],
    now: DateTime<Utc>,
) -> MatchDetail {
    let exact = best_of(
        holdings
            .iter()
            .filter(|h| h.status.is_usable() && h.cert_type.id == required_type.id),
    );
    if let Some(found) = exact {
        return finish(
            requirement,
            required_type,
            found,
            MatchStatus::ExactMatch,
            format!(
                "{} held, valid until {}",
                required_type.display_name, found.holding.expiry_date
            ),
            now,
        );
    }

    if requirement.accept_equivalents {
        let equivalent = best_of(holdings.iter().filter(|h| {
            h.status.is_usable()
                && h.cert_type.id != required_type.id
                && h.cert_type.names_equivalent(required_type)
        }));
        if let Some(found) = equivalent {
            return finish(
                requirement,
                required_type,
                found,
                MatchStatus::EquivalentMatch,
                format!(
                    "{} accepted as equivalent of {}",
                    found.cert_type.display_name, required_type.display_name
                ),
                now,
            );
        }
    }

    if requirement.accept_higher_levels {
        let covering = best_of(
            holdings
                .iter()
                .filter(|h| h.status.is_usable() && covers_higher_level(h.cert_type, required_type)),
        );
        if let Some(found) = covering {
            return finish(
                requirement,
                required_type,
                found,
                MatchStatus::HigherLevelMatch,
                format!(
                    "{} covers {}",
                    found.cert_type.display_name, required_type.display_name
                ),
                now,
            );
        }
    }

    let expired = best_of(holdings.iter().filter(|h| {
        h.status == LifecycleStatus::Expired
            && (h.cert_type.id == required_type.id
                || (requirement.accept_equivalents && h.cert_type.names_equivalent(required_type)))
    }));
    if let Some(found) = expired {
        let days_ago = -found.holding.days_until_expiry(now);
        return finish(
            requirement,
            required_type,
            found,
            MatchStatus::Expired,
            format!(
                "{} expired {} days ago; renewal required",
                found.cert_type.display_name, days_ago
            ),
            now,
        );
    }

    MatchDetail {
        certificate_type_id: required_type.id.clone(),
        priority: requirement.priority,
        matched_holding_id: None,
        status: MatchStatus::Missing,
        score_contribution: 0,
        reason: format!("{} not held in any form", required_type.display_name),
        days_until_expiry: None,
    }
}

/// Latest expiry wins; equal expiries fall back to the smaller holding id.
fn best_of<'a, 'b, I>(candidates: I) -> Option<&'b ResolvedHolding<'a>>
where
    I: Iterator<Item = &'b ResolvedHolding<'a>>,
{
    candidates.max_by(|a, b| {
        a.holding
            .expiry_date
            .cmp(&b.holding.expiry_date)
            .then_with(|| b.holding.id.cmp(&a.holding.id))
    })
}

fn finish(
    requirement: &Requirement,
    required_type: &CertificateType,
    matched: &ResolvedHolding<'_>,
    status: MatchStatus,
    reason: String,
    now: DateTime<Utc>,
) -> MatchDetail {
    let mut status = status;
    let mut reason = reason;
    let mut matched_id = Some(matched.holding.id.clone());
    let mut days = Some(matched.holding.days_until_expiry(now));

    // Experience floor: a policy knob, not a hard reject, except on a
    // mandatory line where falling short means the requirement is not met.
    if let Some(min_months) = requirement.min_experience_months {
        let tenure = matched.holding.experience_months.unwrap_or(0);
        if tenure < min_months {
            if requirement.priority == RequirementPriority::Mandatory {
                status = MatchStatus::Missing;
                matched_id = None;
                days = None;
                reason = format!(
                    "{} held but tenure {}mo is below the mandatory minimum of {}mo",
                    required_type.display_name, tenure, min_months
                );
            } else {
                status = status.downgraded();
                reason = format!(
                    "{reason}; tenure {tenure}mo below {min_months}mo, credited one tier down"
                );
            }
        }
    }

    MatchDetail {
        certificate_type_id: required_type.id.clone(),
        priority: requirement.priority,
        matched_holding_id: matched_id,
        status,
        score_contribution: contribution(requirement.priority, status),
        reason,
        days_until_expiry: days,
    }
}

/// `round(priority_weight * status_fraction / 100)` in integer arithmetic.
fn contribution(priority: RequirementPriority, status: MatchStatus) -> u32 {
    (priority.weight() * status.weight_fraction() + 50) / 100
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            .and_utc()
    }

    fn holding(id: &str, cert: &str, expiry: NaiveDate) -> Holding {
        Holding {
            id: id.into(),
            owner_id: "w-1".into(),
            certificate_type_id: cert.into(),
            certificate_number: None,
            issue_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            expiry_date: expiry,
            verified: true,
            experience_months: Some(24),
        }
    }

    fn resolved<'a>(holding: &'a Holding, now: DateTime<Utc>) -> ResolvedHolding<'a> {
        let cert_type = Catalog::builtin()
            .get(&holding.certificate_type_id)
            .expect("test holdings use builtin ids");
        ResolvedHolding {
            holding,
            cert_type,
            status: holding.lifecycle_status(now, 180),
        }
    }

    fn requirement(cert: &str, priority: RequirementPriority) -> Requirement {
        Requirement {
            certificate_type_id: cert.into(),
            priority,
            accept_equivalents: false,
            accept_higher_levels: false,
            min_experience_months: None,
            required_by: None,
        }
    }

    #[test]
    fn exact_match_takes_full_weight() {
        let now = at(2025, 6, 1);
        let held = holding("h-1", "vca-basic", NaiveDate::from_ymd_opt(2030, 1, 1).unwrap());
        let holdings = [resolved(&held, now)];
        let req = requirement("vca-basic", RequirementPriority::Mandatory);
        let required_type = Catalog::builtin().get("vca-basic").unwrap();

        let detail = resolve_requirement(&req, required_type, &holdings, now);
        assert_eq!(detail.status, MatchStatus::ExactMatch);
        assert_eq!(detail.score_contribution, 100);
        assert_eq!(detail.matched_holding_id.as_deref(), Some("h-1"));
        assert!(detail.days_until_expiry.unwrap() > 0);
    }

    #[test]
    fn valid_holding_beats_expired_duplicate() {
        let now = at(2025, 6, 1);
        let expired = holding("h-old", "vca-basic", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let valid = holding("h-new", "vca-basic", NaiveDate::from_ymd_opt(2030, 1, 1).unwrap());
        let holdings = [resolved(&expired, now), resolved(&valid, now)];
        let req = requirement("vca-basic", RequirementPriority::Mandatory);
        let required_type = Catalog::builtin().get("vca-basic").unwrap();

        let detail = resolve_requirement(&req, required_type, &holdings, now);
        assert_eq!(detail.status, MatchStatus::ExactMatch);
        assert_eq!(detail.matched_holding_id.as_deref(), Some("h-new"));
    }

    #[test]
    fn equivalent_match_requires_opt_in() {
        let now = at(2025, 6, 1);
        // vca-vol shares the "vca" alias family with vca-basic.
        let held = holding("h-1", "vca-vol", NaiveDate::from_ymd_opt(2030, 1, 1).unwrap());
        let holdings = [resolved(&held, now)];
        let required_type = Catalog::builtin().get("vca-basic").unwrap();

        let strict = requirement("vca-basic", RequirementPriority::Preferred);
        let detail = resolve_requirement(&strict, required_type, &holdings, now);
        assert_eq!(detail.status, MatchStatus::Missing);

        let mut open = strict.clone();
        open.accept_equivalents = true;
        let detail = resolve_requirement(&open, required_type, &holdings, now);
        assert_eq!(detail.status, MatchStatus::EquivalentMatch);
        // round(75 * 95 / 100) = 71
        assert_eq!(detail.score_contribution, 71);
    }

    #[test]
    fn higher_level_covers_lower_in_same_category() {
        let now = at(2025, 6, 1);
        let held = holding("h-1", "vca-vol", NaiveDate::from_ymd_opt(2030, 1, 1).unwrap());
        let holdings = [resolved(&held, now)];
        let required_type = Catalog::builtin().get("vca-basic").unwrap();

        let mut req = requirement("vca-basic", RequirementPriority::Mandatory);
        req.accept_higher_levels = true;
        let detail = resolve_requirement(&req, required_type, &holdings, now);
        assert_eq!(detail.status, MatchStatus::HigherLevelMatch);
        assert_eq!(detail.score_contribution, 90);
    }

    #[test]
    fn sibling_exception_is_directed() {
        let catalog = Catalog::builtin();
        let guard = catalog.get("security-guard-2").unwrap();
        let event = catalog.get("event-security").unwrap();

        // Both modeled at the same level; only the diploma covers the pass.
        assert_eq!(guard.level, event.level);
        assert!(covers_higher_level(guard, event));
        assert!(!covers_higher_level(event, guard));
    }

    #[test]
    fn same_level_siblings_do_not_cover_without_exception() {
        let catalog = Catalog::builtin();
        let forklift = catalog.get("forklift").unwrap();
        let vca = catalog.get("vca-basic").unwrap();
        assert_eq!(forklift.level, vca.level);
        assert!(!covers_higher_level(forklift, vca));
        assert!(!covers_higher_level(vca, forklift));
    }

    #[test]
    fn expired_right_type_keeps_partial_credit() {
        let now = at(2025, 6, 1);
        let held = holding("h-1", "bhv", NaiveDate::from_ymd_opt(2025, 5, 2).unwrap());
        let holdings = [resolved(&held, now)];
        let req = requirement("bhv", RequirementPriority::Mandatory);
        let required_type = Catalog::builtin().get("bhv").unwrap();

        let detail = resolve_requirement(&req, required_type, &holdings, now);
        assert_eq!(detail.status, MatchStatus::Expired);
        assert_eq!(detail.score_contribution, 30);
        assert_eq!(detail.days_until_expiry, Some(-30));
        assert!(detail.reason.contains("expired 30 days ago"));
    }

    #[test]
    fn pending_holdings_never_match() {
        let now = at(2025, 6, 1);
        let mut held = holding("h-1", "bhv", NaiveDate::from_ymd_opt(2030, 1, 1).unwrap());
        held.verified = false;
        let holdings = [resolved(&held, now)];
        let req = requirement("bhv", RequirementPriority::Mandatory);
        let required_type = Catalog::builtin().get("bhv").unwrap();

        let detail = resolve_requirement(&req, required_type, &holdings, now);
        assert_eq!(detail.status, MatchStatus::Missing);
    }

    #[test]
    fn insufficient_tenure_downgrades_non_mandatory() {
        let now = at(2025, 6, 1);
        let mut held = holding("h-1", "forklift", NaiveDate::from_ymd_opt(2030, 1, 1).unwrap());
        held.experience_months = Some(6);
        let holdings = [resolved(&held, now)];

        let mut req = requirement("forklift", RequirementPriority::Preferred);
        req.min_experience_months = Some(12);
        let required_type = Catalog::builtin().get("forklift").unwrap();

        let detail = resolve_requirement(&req, required_type, &holdings, now);
        assert_eq!(detail.status, MatchStatus::EquivalentMatch);
        assert!(detail.reason.contains("one tier down"));
        assert!(detail.matched_holding_id.is_some());
    }

    #[test]
    fn insufficient_tenure_fails_mandatory_outright() {
        let now = at(2025, 6, 1);
        let mut held = holding("h-1", "forklift", NaiveDate::from_ymd_opt(2030, 1, 1).unwrap());
        held.experience_months = None;
        let holdings = [resolved(&held, now)];

        let mut req = requirement("forklift", RequirementPriority::Mandatory);
        req.min_experience_months = Some(12);
        let required_type = Catalog::builtin().get("forklift").unwrap();

        let detail = resolve_requirement(&req, required_type, &holdings, now);
        assert_eq!(detail.status, MatchStatus::Missing);
        assert_eq!(detail.score_contribution, 0);
        assert!(detail.matched_holding_id.is_none());
    }

    #[test]
    fn equal_expiry_ties_break_on_holding_id() {
        let now = at(2025, 6, 1);
        let expiry = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        let a = holding("h-a", "vca-basic", expiry);
        let b = holding("h-b", "vca-basic", expiry);
        let holdings = [resolved(&b, now), resolved(&a, now)];
        let req = requirement("vca-basic", RequirementPriority::Mandatory);
        let required_type = Catalog::builtin().get("vca-basic").unwrap();

        let detail = resolve_requirement(&req, required_type, &holdings, now);
        assert_eq!(detail.matched_holding_id.as_deref(), Some("h-a"));
    }
}
