//! Input normalizer — whole-document repair.
//!
//! Runs before optimization begins and again after the merge, so every
//! downstream stage (and the caller) always receives a structurally sound
//! document. Entry fields that face end users get human-readable defaults
//! rather than empty strings. Idempotent: a second pass is a no-op.

use std::sync::OnceLock;

use regex::Regex;
use uuid::Uuid;

use crate::models::resume::{EducationEntry, ExperienceEntry, ResumeDocument};

/// Substituted when a summary is absent or unusably short.
pub const DEFAULT_SUMMARY: &str = "Professional with experience in the industry.";
/// Substituted when an experience description yields zero bullet lines.
pub const PLACEHOLDER_BULLET: &str = "• Contributed to company projects and initiatives.";
/// Substituted when the skill list is absent or empty.
pub const PLACEHOLDER_SKILL: &str = "Professional Skills";

/// Repairs `document` field-by-field. Total: accepts any document, never fails.
pub fn normalize(document: ResumeDocument) -> ResumeDocument {
    let mut doc = document;

    if doc.personal.summary.trim().is_empty() {
        doc.personal.summary = DEFAULT_SUMMARY.to_string();
    }

    doc.education = doc
        .education
        .into_iter()
        .map(normalize_education)
        .collect();
    doc.experience = doc
        .experience
        .into_iter()
        .map(normalize_experience)
        .collect();

    doc.skills.retain(|skill| !skill.trim().is_empty());
    if doc.skills.is_empty() {
        doc.skills = vec![PLACEHOLDER_SKILL.to_string()];
    }

    doc
}

fn normalize_education(mut entry: EducationEntry) -> EducationEntry {
    default_if_empty(&mut entry.id, || Uuid::new_v4().to_string());
    default_if_empty(&mut entry.school, || "School Name".to_string());
    default_if_empty(&mut entry.degree, || "Degree".to_string());
    default_if_empty(&mut entry.field, || "Field of Study".to_string());
    default_if_empty(&mut entry.start_date, || "2024".to_string());
    entry.end_date = entry.end_date.filter(|date| !date.trim().is_empty());
    entry
}

fn normalize_experience(mut entry: ExperienceEntry) -> ExperienceEntry {
    default_if_empty(&mut entry.id, || Uuid::new_v4().to_string());
    default_if_empty(&mut entry.company, || "Company Name".to_string());
    default_if_empty(&mut entry.position, || "Position".to_string());
    default_if_empty(&mut entry.start_date, || "2024".to_string());
    entry.end_date = entry.end_date.filter(|date| !date.trim().is_empty());
    if entry.description.trim().is_empty() {
        entry.description = PLACEHOLDER_BULLET.to_string();
    }
    entry
}

fn default_if_empty(field: &mut String, default: impl FnOnce() -> String) {
    if field.trim().is_empty() {
        *field = default();
    }
}

/// Cleans fallback prose: strips markdown markers, collapses whitespace,
/// removes "Response:"-style prefixes and wrapping quotes.
pub fn clean_text(text: &str) -> String {
    static MARKDOWN: OnceLock<Regex> = OnceLock::new();
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    static PREFIX: OnceLock<Regex> = OnceLock::new();

    let markdown = MARKDOWN.get_or_init(|| Regex::new(r"[*_~`]").expect("static regex"));
    let whitespace = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("static regex"));
    let prefix = PREFIX
        .get_or_init(|| Regex::new(r"(?i)^(Response|Answer|Summary|Output):\s*").expect("static regex"));

    let text = text.trim();
    let text = markdown.replace_all(text, "");
    let text = whitespace.replace_all(&text, " ");
    let text = prefix.replace(&text, "");
    text.trim_matches(|c| c == '"' || c == '\'').to_string()
}

/// Fallback summary: cleaned original, or the default sentence if too short.
pub fn ensure_valid_summary(summary: &str) -> String {
    let cleaned = clean_text(summary);
    if cleaned.chars().count() < 10 {
        DEFAULT_SUMMARY.to_string()
    } else {
        cleaned
    }
}

/// Normalizes a description so every line is bullet-prefixed; substitutes the
/// placeholder bullet when no lines survive.
pub fn ensure_valid_description(description: &str) -> String {
    let lines: Vec<String> = description
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            if line.starts_with('•') {
                line.to_string()
            } else {
                format!("• {line}")
            }
        })
        .collect();

    if lines.is_empty() {
        PLACEHOLDER_BULLET.to_string()
    } else {
        lines.join("\n")
    }
}

/// Fallback skill list: trimmed, deduplicated preserving first occurrence,
/// truncated to `min(12, max(8, original_len))`.
pub fn ensure_valid_skills(skills: &[String]) -> Vec<String> {
    let cap = 12.min(8.max(skills.len()));
    let mut seen: Vec<String> = Vec::new();
    for skill in skills {
        let trimmed = skill.trim();
        if trimmed.is_empty() || seen.iter().any(|s| s == trimmed) {
            continue;
        }
        seen.push(trimmed.to_string());
    }
    seen.truncate(cap);
    if seen.is_empty() {
        return vec![PLACEHOLDER_SKILL.to_string()];
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::PersonalInfo;

    fn sample() -> ResumeDocument {
        ResumeDocument {
            personal: PersonalInfo {
                first_name: "Ada".to_string(),
                summary: String::new(),
                ..Default::default()
            },
            education: vec![EducationEntry::default()],
            experience: vec![ExperienceEntry {
                company: "  ".to_string(),
                end_date: Some(String::new()),
                ..Default::default()
            }],
            skills: vec![],
        }
    }

    #[test]
    fn test_normalize_fills_user_facing_defaults() {
        let doc = normalize(sample());
        assert_eq!(doc.personal.summary, DEFAULT_SUMMARY);
        assert_eq!(doc.education[0].school, "School Name");
        assert_eq!(doc.education[0].degree, "Degree");
        assert_eq!(doc.education[0].field, "Field of Study");
        assert_eq!(doc.education[0].start_date, "2024");
        assert_eq!(doc.experience[0].company, "Company Name");
        assert_eq!(doc.experience[0].position, "Position");
        assert_eq!(doc.experience[0].description, PLACEHOLDER_BULLET);
        assert_eq!(doc.experience[0].end_date, None);
        assert_eq!(doc.skills, vec![PLACEHOLDER_SKILL]);
    }

    #[test]
    fn test_normalize_generates_ids_once() {
        let doc = normalize(sample());
        assert!(!doc.experience[0].id.is_empty());
        let id = doc.experience[0].id.clone();
        let again = normalize(doc);
        assert_eq!(again.experience[0].id, id);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize(sample());
        let twice = normalize(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_normalize_preserves_populated_fields() {
        let mut doc = sample();
        doc.personal.summary = "Hand-written summary.".to_string();
        doc.experience[0].company = "Initech".to_string();
        doc.skills = vec!["Rust".to_string()];
        let normalized = normalize(doc);
        assert_eq!(normalized.personal.summary, "Hand-written summary.");
        assert_eq!(normalized.experience[0].company, "Initech");
        assert_eq!(normalized.skills, vec!["Rust"]);
    }

    #[test]
    fn test_clean_text_strips_markdown_and_prefixes() {
        assert_eq!(
            clean_text("Response:  **Built**   _great_  systems. "),
            "Built great systems."
        );
        assert_eq!(clean_text("\"Quoted summary.\""), "Quoted summary.");
    }

    #[test]
    fn test_ensure_valid_summary_substitutes_when_too_short() {
        assert_eq!(ensure_valid_summary("ok."), DEFAULT_SUMMARY);
        assert_eq!(ensure_valid_summary(""), DEFAULT_SUMMARY);
        assert_eq!(
            ensure_valid_summary("Delivered resilient platforms."),
            "Delivered resilient platforms."
        );
    }

    #[test]
    fn test_ensure_valid_description_prefixes_every_line() {
        assert_eq!(
            ensure_valid_description("Led migration\nImproved latency"),
            "• Led migration\n• Improved latency"
        );
    }

    #[test]
    fn test_ensure_valid_description_placeholder_on_empty() {
        assert_eq!(ensure_valid_description(""), PLACEHOLDER_BULLET);
        assert_eq!(ensure_valid_description("  \n \n"), PLACEHOLDER_BULLET);
    }

    #[test]
    fn test_ensure_valid_description_keeps_existing_bullets() {
        assert_eq!(
            ensure_valid_description("• Led migration\nImproved latency"),
            "• Led migration\n• Improved latency"
        );
    }

    #[test]
    fn test_ensure_valid_skills_dedupes_and_bounds() {
        let skills: Vec<String> = ["Python", "Python", "Go"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(ensure_valid_skills(&skills), vec!["Python", "Go"]);

        let many: Vec<String> = (1..=15).map(|i| format!("Skill {i}")).collect();
        let bounded = ensure_valid_skills(&many);
        assert_eq!(bounded.len(), 12);
        assert_eq!(bounded[0], "Skill 1");
    }

    #[test]
    fn test_ensure_valid_skills_placeholder_on_blank_input() {
        let blank: Vec<String> = vec!["  ".to_string(), String::new()];
        assert_eq!(ensure_valid_skills(&blank), vec![PLACEHOLDER_SKILL]);
    }
}
