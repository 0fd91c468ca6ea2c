/// Tunables for a single engine instance.
///
/// All knobs have fixed defaults so that two engines built the same way
/// produce identical results; `from_env` exists for operators who need to
/// override a knob without a redeploy.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Days before expiry at which a holding counts as expiring soon.
    pub expiring_soon_days: i64,
    /// Drop unknown catalog references with a warning instead of failing
    /// the whole evaluation.
    pub lenient_references: bool,
    /// Cap on the recommendations list of a single result.
    pub max_recommendations: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            expiring_soon_days: 180,
            lenient_references: false,
            max_recommendations: 10,
        }
    }
}

impl EngineConfig {
    /// Read overrides from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            expiring_soon_days: std::env::var("CM_EXPIRING_SOON_DAYS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.expiring_soon_days),
            lenient_references: std::env::var("CM_LENIENT_REFERENCES")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(defaults.lenient_references),
            max_recommendations: std::env::var("CM_MAX_RECOMMENDATIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_recommendations),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_policy() {
        let config = EngineConfig::default();
        assert_eq!(config.expiring_soon_days, 180);
        assert!(!config.lenient_references);
        assert_eq!(config.max_recommendations, 10);
    }
}
