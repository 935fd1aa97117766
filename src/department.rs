use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Departments a grievance can be routed to.
///
/// Serialized by canonical name (`Water_Supply_Dept`), which is also the
/// string used to build manager identities and session tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Department {
    #[serde(rename = "Public_Works_Dept")]
    PublicWorks,
    #[serde(rename = "Water_Supply_Dept")]
    WaterSupply,
    #[serde(rename = "Sanitation_Dept")]
    Sanitation,
    #[serde(rename = "Law_Enforcement_Dept")]
    LawEnforcement,
    #[serde(rename = "Town_Planning_Dept")]
    TownPlanning,
    #[serde(rename = "Transport_Dept")]
    Transport,
    #[serde(rename = "Health_Dept")]
    Health,
    #[serde(rename = "Education_Dept")]
    Education,
    #[serde(rename = "Environment_Dept")]
    Environment,
    #[serde(rename = "Power_Dept")]
    Power,
    #[serde(rename = "Urban_Development_Dept")]
    UrbanDevelopment,
    #[serde(rename = "General_Admin_Dept")]
    GeneralAdmin,
    #[serde(rename = "Vigilance_Dept")]
    Vigilance,
    #[serde(rename = "Animal_Control_Dept")]
    AnimalControl,
    #[serde(rename = "Traffic_Police_Dept")]
    TrafficPolice,
    #[serde(rename = "Revenue_Dept")]
    Revenue,
    #[serde(rename = "Social_Welfare_Dept")]
    SocialWelfare,
    #[serde(rename = "IT_Dept")]
    It,
}

impl Department {
    pub const ALL: [Department; 18] = [
        Department::PublicWorks,
        Department::WaterSupply,
        Department::Sanitation,
        Department::LawEnforcement,
        Department::TownPlanning,
        Department::Transport,
        Department::Health,
        Department::Education,
        Department::Environment,
        Department::Power,
        Department::UrbanDevelopment,
        Department::GeneralAdmin,
        Department::Vigilance,
        Department::AnimalControl,
        Department::TrafficPolice,
        Department::Revenue,
        Department::SocialWelfare,
        Department::It,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Department::PublicWorks => "Public_Works_Dept",
            Department::WaterSupply => "Water_Supply_Dept",
            Department::Sanitation => "Sanitation_Dept",
            Department::LawEnforcement => "Law_Enforcement_Dept",
            Department::TownPlanning => "Town_Planning_Dept",
            Department::Transport => "Transport_Dept",
            Department::Health => "Health_Dept",
            Department::Education => "Education_Dept",
            Department::Environment => "Environment_Dept",
            Department::Power => "Power_Dept",
            Department::UrbanDevelopment => "Urban_Development_Dept",
            Department::GeneralAdmin => "General_Admin_Dept",
            Department::Vigilance => "Vigilance_Dept",
            Department::AnimalControl => "Animal_Control_Dept",
            Department::TrafficPolice => "Traffic_Police_Dept",
            Department::Revenue => "Revenue_Dept",
            Department::SocialWelfare => "Social_Welfare_Dept",
            Department::It => "IT_Dept",
        }
    }

    /// Leading token of the canonical name ("Water" for `Water_Supply_Dept`).
    /// Officer ids ending in this token are treated as belonging here.
    pub fn leading_token(&self) -> &'static str {
        let name = self.as_str();
        name.split('_').next().unwrap_or(name)
    }

    /// Synthetic supervisor identity used for escalations.
    pub fn manager_id(&self, suffix: &str) -> String {
        format!("{}{}", self.as_str(), suffix)
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Department {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Department::ALL
            .iter()
            .find(|d| d.as_str() == s)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("Unknown department: {s}"))
    }
}
