pub mod loader;

use crate::auth::OfficialRecord;
use crate::department::Department;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Priority scores always fall in `1..=PRIORITY_CEILING`.
pub const PRIORITY_CEILING: u8 = 10;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub classification: ClassificationConfig,
    #[serde(default)]
    pub routing: RoutingConfig,
    #[serde(default = "default_officials")]
    pub officials: Vec<OfficialRecord>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TrackingConfig {
    pub prefix: String,
    #[serde(default)]
    pub scheme: TrackingScheme,
}

/// How tracking ids are suffixed.
///
/// `Clock` is the legacy `<prefix>-<millis % 1_000_000>` format and can
/// collide when two submissions land on the same millisecond bucket.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TrackingScheme {
    #[default]
    Clock,
    Uuid,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ClassificationConfig {
    pub base_score: u8,
    pub max_jitter: u8,
    pub keyword_weight: u8,
    pub category_bonus: u8,
    pub max_score: u8,
    pub critical_keywords: Vec<String>,
    pub critical_marker: String,
    pub safety_marker: String,
    /// Evaluated in order; first rule with a matching keyword wins.
    pub refinements: Vec<RefinementRule>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RefinementRule {
    pub category: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RoutingConfig {
    pub escalation_threshold: u8,
    pub fallback_department: Department,
    pub manager_suffix: String,
    pub departments: BTreeMap<String, Department>,
    /// Seed open-case counts, keyed by officer id.
    pub officers: BTreeMap<String, u32>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tracking: TrackingConfig::default(),
            classification: ClassificationConfig::default(),
            routing: RoutingConfig::default(),
            officials: default_officials(),
            logging: Some(LoggingConfig {
                level: "info".to_string(),
            }),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            prefix: "GRV".to_string(),
            scheme: TrackingScheme::Clock,
        }
    }
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            base_score: 3,
            max_jitter: 2,
            keyword_weight: 2,
            category_bonus: 2,
            max_score: 10,
            critical_keywords: vec![
                "dangerous".to_string(),
                "urgent".to_string(),
                "fatal".to_string(),
                "flooding".to_string(),
            ],
            critical_marker: "critical".to_string(),
            safety_marker: "safety".to_string(),
            refinements: vec![
                RefinementRule {
                    category: "Pothole_Major".to_string(),
                    keywords: vec!["pothole".to_string(), "cracked road".to_string()],
                },
                RefinementRule {
                    category: "Water_Leakage_Critical".to_string(),
                    keywords: vec!["leakage".to_string(), "no water".to_string()],
                },
            ],
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        let departments = [
            ("Road Maintenance", Department::PublicWorks),
            ("Water Supply", Department::WaterSupply),
            ("Sanitation", Department::Sanitation),
            ("Public Safety", Department::LawEnforcement),
            ("Illegal Construction", Department::TownPlanning),
            ("Public Transport", Department::Transport),
            ("Health Services", Department::Health),
            ("Education Facilities", Department::Education),
            ("Noise Pollution", Department::Environment),
            ("Electricity", Department::Power),
            ("Drainage", Department::WaterSupply),
            ("Parks", Department::UrbanDevelopment),
            ("Document Delays", Department::GeneralAdmin),
            ("Official Misconduct", Department::Vigilance),
            ("Animal Control", Department::AnimalControl),
            ("Tree Felling", Department::Environment),
            ("Traffic Signals", Department::TrafficPolice),
            ("Taxes", Department::Revenue),
            ("Social Welfare", Department::SocialWelfare),
            ("Cyber", Department::It),
            ("Other", Department::GeneralAdmin),
        ]
        .into_iter()
        .map(|(category, dept)| (category.to_string(), dept))
        .collect();

        let officers = [
            ("Officer_A_Water", 12),
            ("Officer_B_Water", 5),
            ("Officer_C_Roads", 9),
            ("Officer_D_Roads", 15),
        ]
        .into_iter()
        .map(|(id, load)| (id.to_string(), load))
        .collect();

        Self {
            escalation_threshold: 8,
            fallback_department: Department::GeneralAdmin,
            manager_suffix: "_Manager".to_string(),
            departments,
            officers,
        }
    }
}

fn default_officials() -> Vec<OfficialRecord> {
    vec![
        OfficialRecord {
            username: "john.doe@gov.in".to_string(),
            password_credential: "hashed_password_doe".to_string(),
            govt_id: "GOV1001A".to_string(),
            department: Department::WaterSupply,
            display_name: "John Doe".to_string(),
        },
        OfficialRecord {
            username: "sara.smith@gov.in".to_string(),
            password_credential: "hashed_password_smith".to_string(),
            govt_id: "GOV2002B".to_string(),
            department: Department::PublicWorks,
            display_name: "Sara Smith".to_string(),
        },
    ]
}

impl Config {
    /// Reject configurations that would break routing or scoring invariants.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.tracking.prefix.trim().is_empty() {
            anyhow::bail!("tracking.prefix must not be empty");
        }

        let cls = &self.classification;
        if cls.max_score == 0 || cls.max_score > PRIORITY_CEILING {
            anyhow::bail!(
                "classification.max_score ({}) must be within 1..={}",
                cls.max_score,
                PRIORITY_CEILING
            );
        }
        if cls.base_score == 0 || cls.base_score > cls.max_score {
            anyhow::bail!(
                "classification.base_score ({}) must be within 1..={}",
                cls.base_score,
                cls.max_score
            );
        }
        if let Some(rule) = cls.refinements.iter().find(|r| r.keywords.is_empty()) {
            anyhow::bail!("refinement rule '{}' has no keywords", rule.category);
        }

        let threshold = self.routing.escalation_threshold;
        if threshold == 0 || threshold > cls.max_score {
            anyhow::bail!(
                "routing.escalation_threshold ({}) must be within 1..={}",
                threshold,
                cls.max_score
            );
        }
        if self.routing.manager_suffix.is_empty() {
            anyhow::bail!("routing.manager_suffix must not be empty");
        }

        let mut seen = HashSet::new();
        for official in &self.officials {
            if !seen.insert(official.username.as_str()) {
                anyhow::bail!("duplicate official username: {}", official.username);
            }
        }

        Ok(())
    }

    pub fn log_level(&self) -> log::LevelFilter {
        self.logging
            .as_ref()
            .and_then(|l| l.level.parse().ok())
            .unwrap_or(log::LevelFilter::Info)
    }
}
