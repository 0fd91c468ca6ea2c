use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::{
    catalog::{Catalog, CertificateType},
    config::EngineConfig,
    error::EvaluationError,
    lifecycle,
    matching::{
        coverage::{resolve_requirement, ResolvedHolding},
        gaps::{derive_gaps, recommend},
        scoring::summarize,
    },
    result::{MatchDetail, MatchResult},
    run_id, Holding, Requirement, RequirementSet, ENGINE_VERSION,
};

/// Stateless evaluation facade. Construction is cheap; callers running
/// batches across a worker pool can share one engine or build one per
/// task, the result is the same.
pub struct MatchEngine {
    config: EngineConfig,
}

impl MatchEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn default() -> Self {
        Self::new(EngineConfig::default())
    }

    pub fn from_env() -> Self {
        Self::new(EngineConfig::from_env())
    }

    /// Evaluate one worker against one job at an explicit point in time.
    ///
    /// `now` is an input on purpose: identical inputs produce identical
    /// results, which makes batch runs reproducible and testable. Use
    /// [`MatchEngine::evaluate_now`] when wall-clock time is fine.
    pub fn evaluate(
        &self,
        catalog: &Catalog,
        owner_holdings: &[Holding],
        set: &RequirementSet,
        now: DateTime<Utc>,
    ) -> Result<MatchResult, EvaluationError> {
        let well_formed = lifecycle::filter_well_formed(owner_holdings);

        // Strict reference validation by default: a bad catalog reference
        // must never silently read as "missing".
        let mut holdings: Vec<ResolvedHolding> = Vec::with_capacity(well_formed.len());
        for holding in well_formed {
            match catalog.get(&holding.certificate_type_id) {
                Some(cert_type) => holdings.push(ResolvedHolding {
                    holding,
                    cert_type,
                    status: holding.lifecycle_status(now, self.config.expiring_soon_days),
                }),
                None if self.config.lenient_references => {
                    warn!(
                        holding_id = %holding.id,
                        certificate_type_id = %holding.certificate_type_id,
                        "holding references unknown certificate type; dropped (lenient mode)"
                    );
                }
                None => {
                    return Err(EvaluationError::UnknownCertificateType {
                        certificate_type_id: holding.certificate_type_id.clone(),
                        referenced_by: format!("holding {}", holding.id),
                    });
                }
            }
        }

        let mut requirements: Vec<(&Requirement, &CertificateType)> =
            Vec::with_capacity(set.requirements.len());
        for requirement in &set.requirements {
            match catalog.get(&requirement.certificate_type_id) {
                Some(required_type) => requirements.push((requirement, required_type)),
                None if self.config.lenient_references => {
                    warn!(
                        job_id = %set.job_id,
                        certificate_type_id = %requirement.certificate_type_id,
                        "requirement references unknown certificate type; excluded from scoring (lenient mode)"
                    );
                }
                None => {
                    return Err(EvaluationError::UnknownCertificateType {
                        certificate_type_id: requirement.certificate_type_id.clone(),
                        referenced_by: format!("requirement set of job {}", set.job_id),
                    });
                }
            }
        }

        let details: Vec<MatchDetail> = requirements
            .iter()
            .map(|(requirement, required_type)| {
                resolve_requirement(requirement, required_type, &holdings, now)
            })
            .collect();

        let summary = summarize(set, &details, catalog, &holdings);
        let gaps = derive_gaps(&details, catalog, &self.config);
        let recommendations = recommend(
            summary.overall_score,
            &details,
            &requirements,
            catalog,
            &holdings,
            now,
            &self.config,
        );

        // The result stays meaningful until the nearest matched holding
        // expires; after that the caller must recompute.
        let valid_for_days = details
            .iter()
            .filter(|d| d.status.counts_as_met())
            .filter_map(|d| d.days_until_expiry)
            .filter(|days| *days >= 0)
            .min();

        let owner_id = owner_holdings
            .first()
            .map(|h| h.owner_id.clone())
            .unwrap_or_default();

        debug!(
            job_id = %set.job_id,
            owner_id = %owner_id,
            overall_score = summary.overall_score,
            is_eligible = summary.is_eligible,
            gaps = gaps.len(),
            "evaluation complete"
        );

        Ok(MatchResult {
            job_id: set.job_id.clone(),
            owner_id,
            overall_score: summary.overall_score,
            match_tier: summary.match_tier,
            is_eligible: summary.is_eligible,
            details,
            gaps,
            recommendations,
            mandatory_met: summary.mandatory_met,
            mandatory_total: summary.mandatory_total,
            preferred_met: summary.preferred_met,
            preferred_total: summary.preferred_total,
            disqualified_reasons: summary.disqualified_reasons,
            calculated_at: now,
            valid_for_days,
            engine_version: ENGINE_VERSION.to_string(),
            run_id: run_id::current().to_string(),
        })
    }

    /// Wall-clock convenience wrapper around [`MatchEngine::evaluate`].
    pub fn evaluate_now(
        &self,
        catalog: &Catalog,
        owner_holdings: &[Holding],
        set: &RequirementSet,
    ) -> Result<MatchResult, EvaluationError> {
        self.evaluate(catalog, owner_holdings, set, Utc::now())
    }

    /// Evaluate one worker against many jobs, failing fast on the first
    /// configuration error so it cannot be papered over.
    pub fn evaluate_batch(
        &self,
        catalog: &Catalog,
        owner_holdings: &[Holding],
        sets: &[RequirementSet],
        now: DateTime<Utc>,
    ) -> Result<Vec<MatchResult>, EvaluationError> {
        sets.iter()
            .map(|set| self.evaluate(catalog, owner_holdings, set, now))
            .collect()
    }
}

/// One-shot evaluation with the default configuration.
pub fn evaluate(
    catalog: &Catalog,
    owner_holdings: &[Holding],
    set: &RequirementSet,
    now: DateTime<Utc>,
) -> Result<MatchResult, EvaluationError> {
    MatchEngine::default().evaluate(catalog, owner_holdings, set, now)
}
