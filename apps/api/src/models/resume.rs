//! The resume document model — the value the optimization pipeline operates on.
//!
//! Wire format is camelCase JSON to match the web client. Every field carries
//! a serde default so a partial document deserializes instead of erroring;
//! the input normalizer is responsible for filling the gaps with usable values.

use serde::{Deserialize, Serialize};

/// A full resume document. Owned by the caller for the duration of one
/// optimization call; the pipeline never retains references beyond it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeDocument {
    pub personal: PersonalInfo,
    pub education: Vec<EducationEntry>,
    pub experience: Vec<ExperienceEntry>,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    /// The only personal field targeted by generation.
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationEntry {
    pub id: String,
    pub school: String,
    pub degree: String,
    pub field: String,
    pub location: String,
    /// ISO month or year, e.g. "2021-09" or "2021".
    pub start_date: String,
    /// Absent means "present".
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExperienceEntry {
    pub id: String,
    pub company: String,
    pub position: String,
    pub location: String,
    pub start_date: String,
    /// Absent means "present".
    pub end_date: Option<String>,
    /// Generation target. Bullet-formatted, one "• " line per point.
    pub description: String,
    pub highlights: Vec<String>,
}

impl ExperienceEntry {
    /// Human-readable duration, e.g. "2021-03 - Present".
    pub fn duration(&self) -> String {
        format!(
            "{} - {}",
            self.start_date,
            self.end_date.as_deref().unwrap_or("Present")
        )
    }
}
