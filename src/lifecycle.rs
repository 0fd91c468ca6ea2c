use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::AsRefStr;
use tracing::warn;

use crate::Holding;

/// Lifecycle state of a holding.
///
/// Only `Pending -> Valid` is an externally triggered transition (a
/// verification event owned by the profile collaborator). The rest is a
/// pure function of the expiry date and the evaluation time, re-derived on
/// every read; there is no stored state to drift out of sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum LifecycleStatus {
    Pending,
    Valid,
    ExpiringSoon,
    Expired,
}

impl LifecycleStatus {
    /// Usable toward new eligibility. Expired holdings stay inspectable for
    /// partial credit but never satisfy a requirement outright.
    pub fn is_usable(self) -> bool {
        matches!(self, LifecycleStatus::Valid | LifecycleStatus::ExpiringSoon)
    }
}

impl Holding {
    /// Derive the lifecycle status at `now`.
    pub fn lifecycle_status(&self, now: DateTime<Utc>, expiring_soon_days: i64) -> LifecycleStatus {
        if !self.verified {
            return LifecycleStatus::Pending;
        }
        let today = now.date_naive();
        if today >= self.expiry_date {
            return LifecycleStatus::Expired;
        }
        if (self.expiry_date - today).num_days() <= expiring_soon_days {
            LifecycleStatus::ExpiringSoon
        } else {
            LifecycleStatus::Valid
        }
    }

    /// Signed day count until expiry; negative once expired.
    pub fn days_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        (self.expiry_date - now.date_naive()).num_days()
    }

    /// Date sanity required by the data-quality filter.
    pub fn has_well_formed_dates(&self) -> bool {
        self.expiry_date > self.issue_date
    }
}

/// Drop holdings with malformed dates, logging each exclusion. Evaluation
/// continues with whatever survives.
pub fn filter_well_formed(holdings: &[Holding]) -> Vec<&Holding> {
    holdings
        .iter()
        .filter(|holding| {
            if holding.has_well_formed_dates() {
                true
            } else {
                warn!(
                    holding_id = %holding.id,
                    issue_date = %holding.issue_date,
                    expiry_date = %holding.expiry_date,
                    "holding has expiry on or before issue; excluded from matching"
                );
                false
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn base_holding() -> Holding {
        Holding {
            id: "h-1".into(),
            owner_id: "w-1".into(),
            certificate_type_id: "vca-basic".into(),
            certificate_number: Some("VCA-001".into()),
            issue_date: NaiveDate::from_ymd_opt(2023, 1, 10).unwrap(),
            expiry_date: NaiveDate::from_ymd_opt(2027, 1, 10).unwrap(),
            verified: true,
            experience_months: None,
        }
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
            .and_utc()
    }

    #[test]
    fn unverified_holdings_stay_pending() {
        let mut holding = base_holding();
        holding.verified = false;
        assert_eq!(
            holding.lifecycle_status(at(2025, 6, 1), 180),
            LifecycleStatus::Pending
        );
    }

    #[test]
    fn status_follows_time_against_expiry() {
        let holding = base_holding();
        assert_eq!(holding.lifecycle_status(at(2025, 6, 1), 180), LifecycleStatus::Valid);
        assert_eq!(
            holding.lifecycle_status(at(2026, 9, 1), 180),
            LifecycleStatus::ExpiringSoon
        );
        assert_eq!(holding.lifecycle_status(at(2027, 1, 10), 180), LifecycleStatus::Expired);
        assert_eq!(holding.lifecycle_status(at(2028, 1, 1), 180), LifecycleStatus::Expired);
    }

    #[test]
    fn expiring_soon_window_is_configurable() {
        let holding = base_holding();
        let now = at(2026, 9, 1);
        assert_eq!(holding.lifecycle_status(now, 30), LifecycleStatus::Valid);
        assert_eq!(holding.lifecycle_status(now, 365), LifecycleStatus::ExpiringSoon);
    }

    #[test]
    fn usability_excludes_pending_and_expired() {
        assert!(LifecycleStatus::Valid.is_usable());
        assert!(LifecycleStatus::ExpiringSoon.is_usable());
        assert!(!LifecycleStatus::Pending.is_usable());
        assert!(!LifecycleStatus::Expired.is_usable());
    }

    #[test]
    fn days_until_expiry_goes_negative_after_expiry() {
        let holding = base_holding();
        assert_eq!(holding.days_until_expiry(at(2027, 1, 9)), 1);
        assert_eq!(holding.days_until_expiry(at(2027, 1, 20)), -10);
    }

    #[test]
    fn malformed_dates_are_filtered_out() {
        let good = base_holding();
        let mut bad = base_holding();
        bad.id = "h-2".into();
        bad.expiry_date = bad.issue_date;

        let binding = [good.clone(), bad];
        let kept = filter_well_formed(&binding);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, good.id);
    }
}
