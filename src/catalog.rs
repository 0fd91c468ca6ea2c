use std::collections::HashSet;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use strum::AsRefStr;

use crate::error::CatalogError;
use crate::normalize::{names_overlap, normalize_name};

/// Ordered qualification level of a certificate type.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum CertificateLevel {
    Entry,
    Basic,
    Advanced,
    Expert,
}

impl CertificateLevel {
    /// Numeric position in the level hierarchy, used by the coverage rule.
    pub fn hierarchy_level(self) -> u8 {
        match self {
            CertificateLevel::Entry => 0,
            CertificateLevel::Basic => 1,
            CertificateLevel::Advanced => 2,
            CertificateLevel::Expert => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum CertificateCategory {
    Security,
    Safety,
    Driving,
    FirstAid,
}

/// Static definition of a recognized qualification.
///
/// Catalog entries are immutable registry data; changing them means shipping
/// a new catalog, not a runtime write path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateType {
    pub id: String,
    pub display_name: String,
    pub level: CertificateLevel,
    pub category: CertificateCategory,
    /// How long a fresh certificate stays valid.
    pub validity_months: u32,
    /// Alternate names accepted by the equivalence rule.
    pub equivalent_names: Vec<String>,
    /// Importance in scoring, 0-100.
    pub match_weight: u8,
    /// Required across the board, independent of any single job posting.
    pub is_mandatory_baseline: bool,
    /// Catalog ids that must be held before this one can be obtained.
    pub prerequisites: Vec<String>,
    pub typical_course_weeks: Option<u32>,
    pub typical_cost_eur: Option<u32>,
}

impl CertificateType {
    /// True when `text` matches the display name or one of the equivalents.
    pub fn name_matches(&self, text: &str) -> bool {
        let needle = normalize_name(text);
        if needle.is_empty() {
            return false;
        }
        names_overlap(&normalize_name(&self.display_name), &needle)
            || self
                .equivalent_names
                .iter()
                .any(|name| names_overlap(&normalize_name(name), &needle))
    }

    /// True when the two entries share a name or alias (either direction).
    pub fn names_equivalent(&self, other: &CertificateType) -> bool {
        let mine = self.all_normalized_names();
        let theirs = other.all_normalized_names();
        mine.iter()
            .any(|a| theirs.iter().any(|b| names_overlap(a, b)))
    }

    fn all_normalized_names(&self) -> Vec<String> {
        std::iter::once(self.display_name.as_str())
            .chain(self.equivalent_names.iter().map(String::as_str))
            .map(normalize_name)
            .filter(|n| !n.is_empty())
            .collect()
    }
}

/// Read-only certificate registry. Constructed once and injected into every
/// evaluation; there is no mutation API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    entries: Vec<CertificateType>,
}

impl Catalog {
    /// Validates invariants: unique ids, weights within 0-100, and
    /// prerequisites that resolve inside the catalog.
    pub fn new(entries: Vec<CertificateType>) -> Result<Self, CatalogError> {
        let mut seen: HashSet<&str> = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.id.as_str()) {
                return Err(CatalogError::DuplicateId(entry.id.clone()));
            }
            if entry.match_weight > 100 {
                return Err(CatalogError::WeightOutOfRange {
                    certificate_type_id: entry.id.clone(),
                    weight: entry.match_weight,
                });
            }
        }
        for entry in &entries {
            for prerequisite in &entry.prerequisites {
                if !seen.contains(prerequisite.as_str()) {
                    return Err(CatalogError::UnknownPrerequisite {
                        certificate_type_id: entry.id.clone(),
                        prerequisite: prerequisite.clone(),
                    });
                }
            }
        }
        Ok(Self { entries })
    }

    /// The catalog shipped with the crate, built once per process.
    pub fn builtin() -> &'static Catalog {
        &BUILTIN
    }

    pub fn get(&self, id: &str) -> Option<&CertificateType> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Case-insensitive fuzzy lookup; first match in catalog order wins.
    pub fn find_by_name(&self, text: &str) -> Option<&CertificateType> {
        self.entries.iter().find(|entry| entry.name_matches(text))
    }

    pub fn by_category(&self, category: CertificateCategory) -> Vec<&CertificateType> {
        self.entries
            .iter()
            .filter(|entry| entry.category == category)
            .collect()
    }

    /// Entries required across the board, independent of any job posting.
    pub fn mandatory_baseline(&self) -> Vec<&CertificateType> {
        self.entries
            .iter()
            .filter(|entry| entry.is_mandatory_baseline)
            .collect()
    }

    pub fn entries(&self) -> &[CertificateType] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builtin registry table.
///
/// NOTE: keep ids stable; holdings and requirement sets reference them.
static BUILTIN: LazyLock<Catalog> = LazyLock::new(|| {
    struct Row {
        id: &'static str,
        name: &'static str,
        level: CertificateLevel,
        category: CertificateCategory,
        validity_months: u32,
        aliases: &'static [&'static str],
        weight: u8,
        baseline: bool,
        prerequisites: &'static [&'static str],
        course_weeks: Option<u32>,
        cost_eur: Option<u32>,
    }

    let rows: &[Row] = &[
        // Security. The guard diploma and the event pass are modeled at the
        // same level; the directed coverage between them lives in the
        // resolver, not here.
        Row {
            id: "security-guard-2",
            name: "Security Guard Diploma 2",
            level: CertificateLevel::Basic,
            category: CertificateCategory::Security,
            validity_months: 36,
            aliases: &["beveiliger 2", "security guard", "grijze pas"],
            weight: 90,
            baseline: false,
            prerequisites: &[],
            course_weeks: Some(16),
            cost_eur: Some(1800),
        },
        Row {
            id: "event-security",
            name: "Event Security Pass",
            level: CertificateLevel::Basic,
            category: CertificateCategory::Security,
            validity_months: 36,
            aliases: &["evenementenbeveiliger", "event steward"],
            weight: 70,
            baseline: false,
            prerequisites: &[],
            course_weeks: Some(6),
            cost_eur: Some(650),
        },
        Row {
            id: "personal-protection",
            name: "Personal Protection Officer Licence",
            level: CertificateLevel::Expert,
            category: CertificateCategory::Security,
            validity_months: 36,
            aliases: &["persoonsbeveiliger", "close protection"],
            weight: 85,
            baseline: false,
            prerequisites: &["security-guard-2"],
            course_weeks: Some(24),
            cost_eur: Some(3400),
        },
        // Safety.
        Row {
            id: "vca-basic",
            name: "VCA Basic Safety",
            level: CertificateLevel::Basic,
            category: CertificateCategory::Safety,
            validity_months: 120,
            aliases: &["vca", "b-vca", "basisveiligheid"],
            weight: 70,
            baseline: false,
            prerequisites: &[],
            course_weeks: Some(1),
            cost_eur: Some(250),
        },
        Row {
            id: "vca-vol",
            name: "VCA Supervisor Safety",
            level: CertificateLevel::Advanced,
            category: CertificateCategory::Safety,
            validity_months: 120,
            aliases: &["vol-vca", "vca vol"],
            weight: 75,
            baseline: false,
            prerequisites: &["vca-basic"],
            course_weeks: Some(2),
            cost_eur: Some(330),
        },
        Row {
            id: "forklift",
            name: "Forklift Operator Certificate",
            level: CertificateLevel::Basic,
            category: CertificateCategory::Safety,
            validity_months: 60,
            aliases: &["heftruckcertificaat", "forklift licence"],
            weight: 60,
            baseline: false,
            prerequisites: &[],
            course_weeks: Some(1),
            cost_eur: Some(420),
        },
        // Driving.
        Row {
            id: "driving-b",
            name: "Driving Licence B",
            level: CertificateLevel::Basic,
            category: CertificateCategory::Driving,
            validity_months: 120,
            aliases: &["rijbewijs b", "drivers license b"],
            weight: 50,
            baseline: false,
            prerequisites: &[],
            course_weeks: Some(12),
            cost_eur: Some(2600),
        },
        Row {
            id: "driving-c",
            name: "Driving Licence C",
            level: CertificateLevel::Advanced,
            category: CertificateCategory::Driving,
            validity_months: 60,
            aliases: &["rijbewijs c", "truck licence"],
            weight: 65,
            baseline: false,
            prerequisites: &["driving-b"],
            course_weeks: Some(10),
            cost_eur: Some(3800),
        },
        // First aid. BHV is the catalog-wide baseline.
        Row {
            id: "bhv",
            name: "Emergency Response Officer (BHV)",
            level: CertificateLevel::Basic,
            category: CertificateCategory::FirstAid,
            validity_months: 12,
            aliases: &["bedrijfshulpverlening", "emergency response"],
            weight: 80,
            baseline: true,
            prerequisites: &[],
            course_weeks: Some(1),
            cost_eur: Some(190),
        },
        Row {
            id: "ehbo",
            name: "First Aid Diploma (EHBO)",
            level: CertificateLevel::Advanced,
            category: CertificateCategory::FirstAid,
            validity_months: 24,
            aliases: &["first aid", "ehbo diploma"],
            weight: 70,
            baseline: false,
            prerequisites: &[],
            course_weeks: Some(4),
            cost_eur: Some(310),
        },
    ];

    let entries = rows
        .iter()
        .map(|row| CertificateType {
            id: row.id.to_string(),
            display_name: row.name.to_string(),
            level: row.level,
            category: row.category,
            validity_months: row.validity_months,
            equivalent_names: row.aliases.iter().map(|s| s.to_string()).collect(),
            match_weight: row.weight,
            is_mandatory_baseline: row.baseline,
            prerequisites: row.prerequisites.iter().map(|s| s.to_string()).collect(),
            typical_course_weeks: row.course_weeks,
            typical_cost_eur: row.cost_eur,
        })
        .collect();

    Catalog::new(entries).expect("builtin catalog violates its own invariants")
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_is_valid_and_nonempty() {
        let catalog = Catalog::builtin();
        assert!(catalog.len() >= 8);
        assert!(catalog.get("vca-basic").is_some());
        assert!(catalog.get("nonexistent").is_none());
    }

    #[test]
    fn find_by_name_matches_aliases_case_insensitively() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.find_by_name("B-VCA").unwrap().id, "vca-basic");
        assert_eq!(catalog.find_by_name("EHBO").unwrap().id, "ehbo");
        assert_eq!(catalog.find_by_name("grijze pas").unwrap().id, "security-guard-2");
        assert!(catalog.find_by_name("scuba diving").is_none());
    }

    #[test]
    fn find_by_name_first_match_wins_in_catalog_order() {
        // "vca" is an alias of vca-basic and a substring of vca-vol's names;
        // the earlier entry must win.
        let catalog = Catalog::builtin();
        assert_eq!(catalog.find_by_name("vca").unwrap().id, "vca-basic");
    }

    #[test]
    fn by_category_and_baseline_filters() {
        let catalog = Catalog::builtin();
        let security = catalog.by_category(CertificateCategory::Security);
        assert_eq!(security.len(), 3);
        assert!(security.iter().all(|e| e.category == CertificateCategory::Security));

        let baseline = catalog.mandatory_baseline();
        assert_eq!(baseline.len(), 1);
        assert_eq!(baseline[0].id, "bhv");
    }

    #[test]
    fn new_rejects_duplicate_ids() {
        let mut entries = Catalog::builtin().entries().to_vec();
        entries.push(entries[0].clone());
        assert!(matches!(
            Catalog::new(entries),
            Err(CatalogError::DuplicateId(_))
        ));
    }

    #[test]
    fn new_rejects_out_of_range_weight() {
        let mut entries = Catalog::builtin().entries().to_vec();
        entries[0].match_weight = 101;
        assert!(matches!(
            Catalog::new(entries),
            Err(CatalogError::WeightOutOfRange { weight: 101, .. })
        ));
    }

    #[test]
    fn new_rejects_dangling_prerequisite() {
        let mut entries = Catalog::builtin().entries().to_vec();
        entries[0].prerequisites = vec!["no-such-cert".into()];
        assert!(matches!(
            Catalog::new(entries),
            Err(CatalogError::UnknownPrerequisite { .. })
        ));
    }

    #[test]
    fn hierarchy_levels_follow_enum_order() {
        assert!(CertificateLevel::Expert.hierarchy_level() > CertificateLevel::Advanced.hierarchy_level());
        assert!(CertificateLevel::Advanced.hierarchy_level() > CertificateLevel::Basic.hierarchy_level());
        assert!(CertificateLevel::Basic.hierarchy_level() > CertificateLevel::Entry.hierarchy_level());
    }

    #[test]
    fn names_equivalent_is_symmetric() {
        let catalog = Catalog::builtin();
        let basic = catalog.get("vca-basic").unwrap();
        let vol = catalog.get("vca-vol").unwrap();
        let forklift = catalog.get("forklift").unwrap();

        // "vca" alias sits inside "vca vol".
        assert!(basic.names_equivalent(vol));
        assert!(vol.names_equivalent(basic));
        assert!(!basic.names_equivalent(forklift));
    }
}
