use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier wrapper for filed reports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReportId(pub String);

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    Incident,
    NearMiss,
    Accident,
}

impl ReportType {
    pub const fn ordered() -> [Self; 3] {
        [Self::Incident, Self::NearMiss, Self::Accident]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Incident => "Incident",
            Self::NearMiss => "Near Miss",
            Self::Accident => "Accident",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportCategory {
    Medication,
    Fall,
    Equipment,
    Infection,
    Surgical,
    Diagnostic,
    Behavioral,
    Security,
    Documentation,
    Other,
}

impl ReportCategory {
    pub const fn ordered() -> [Self; 10] {
        [
            Self::Medication,
            Self::Fall,
            Self::Equipment,
            Self::Infection,
            Self::Surgical,
            Self::Diagnostic,
            Self::Behavioral,
            Self::Security,
            Self::Documentation,
            Self::Other,
        ]
    }

    /// Stable token used in JSON payloads and CSV exports.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Medication => "medication",
            Self::Fall => "fall",
            Self::Equipment => "equipment",
            Self::Infection => "infection",
            Self::Surgical => "surgical",
            Self::Diagnostic => "diagnostic",
            Self::Behavioral => "behavioral",
            Self::Security => "security",
            Self::Documentation => "documentation",
            Self::Other => "other",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Medication => "Medication",
            Self::Fall => "Fall",
            Self::Equipment => "Equipment",
            Self::Infection => "Infection Control",
            Self::Surgical => "Surgical / Procedural",
            Self::Diagnostic => "Diagnostic",
            Self::Behavioral => "Behavioral",
            Self::Security => "Security",
            Self::Documentation => "Documentation",
            Self::Other => "Other",
        }
    }
}

/// Ordinal impact scale; declaration order is the severity order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactLevel {
    None,
    Minor,
    Moderate,
    Major,
    Catastrophic,
}

impl ImpactLevel {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::None,
            Self::Minor,
            Self::Moderate,
            Self::Major,
            Self::Catastrophic,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Minor => "minor",
            Self::Moderate => "moderate",
            Self::Major => "major",
            Self::Catastrophic => "catastrophic",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "No Harm",
            Self::Minor => "Minor",
            Self::Moderate => "Moderate",
            Self::Major => "Major",
            Self::Catastrophic => "Catastrophic",
        }
    }

    /// Membership in the high-severity subset counted by the severe trend.
    pub const fn is_severe(self) -> bool {
        matches!(self, Self::Major | Self::Catastrophic)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

fn normalize_token(raw: &str) -> String {
    raw.trim()
        .to_ascii_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

impl FromStr for ReportType {
    type Err = UnknownVariant;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match normalize_token(raw).as_str() {
            "incident" => Ok(Self::Incident),
            "nearmiss" => Ok(Self::NearMiss),
            "accident" => Ok(Self::Accident),
            _ => Err(UnknownVariant {
                kind: "report type",
                value: raw.to_string(),
            }),
        }
    }
}

impl FromStr for ReportCategory {
    type Err = UnknownVariant;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let token = normalize_token(raw);
        Self::ordered()
            .into_iter()
            .find(|category| category.key() == token)
            .or(match token.as_str() {
                "medicationerror" | "medications" => Some(Self::Medication),
                "falls" | "patientfall" => Some(Self::Fall),
                "equipmentfailure" | "device" => Some(Self::Equipment),
                "infectioncontrol" => Some(Self::Infection),
                "procedural" | "surgicalprocedural" => Some(Self::Surgical),
                _ => None,
            })
            .ok_or_else(|| UnknownVariant {
                kind: "category",
                value: raw.to_string(),
            })
    }
}

impl FromStr for ImpactLevel {
    type Err = UnknownVariant;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match normalize_token(raw).as_str() {
            "none" | "noharm" | "0" => Ok(Self::None),
            "minor" | "low" | "1" => Ok(Self::Minor),
            "moderate" | "medium" | "2" => Ok(Self::Moderate),
            "major" | "high" | "3" => Ok(Self::Major),
            "catastrophic" | "severe" | "critical" | "4" => Ok(Self::Catastrophic),
            _ => Err(UnknownVariant {
                kind: "impact level",
                value: raw.to_string(),
            }),
        }
    }
}

/// One incident, near-miss, or accident record as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    pub report_type: ReportType,
    pub category: ReportCategory,
    pub impact: ImpactLevel,
    pub occurred_at: DateTime<Utc>,
    pub department: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub description: String,
    /// Logical deletion flag; deleted reports stay stored but never aggregate.
    #[serde(default)]
    pub deleted: bool,
}
