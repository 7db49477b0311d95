//! Prompt construction for the three optimizable field categories.
//!
//! Each builder returns the prompt text together with the fixed category
//! schema; callers pass the schema through unchanged to the generation client
//! and the validator. Optional context clauses are omitted entirely when the
//! caller did not supply them — never rendered as empty placeholders.

use serde::Deserialize;

use crate::models::resume::{ExperienceEntry, ResumeDocument};
use crate::optimizer::schema::{FieldCategory, SchemaNode};

/// Caller-supplied optimization context. All fields optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptimizeOptions {
    pub job_description: Option<String>,
    pub target_role: Option<String>,
    pub industry: Option<String>,
    pub experience_level: Option<String>,
}

/// Context derived from the document itself, shared by all prompts of one
/// optimization call.
#[derive(Debug, Clone)]
pub struct DocumentContext {
    pub skills: String,
    pub latest_role: String,
    pub latest_company: String,
    pub total_experience: String,
    pub education: String,
}

impl DocumentContext {
    pub fn derive(doc: &ResumeDocument) -> Self {
        let latest = doc.experience.first();
        Self {
            skills: doc.skills.join(", "),
            latest_role: latest.map(|e| e.position.clone()).unwrap_or_default(),
            latest_company: latest.map(|e| e.company.clone()).unwrap_or_default(),
            total_experience: if doc.experience.is_empty() {
                "Entry level".to_string()
            } else {
                format!("{} positions", doc.experience.len())
            },
            education: doc
                .education
                .iter()
                .map(|e| format!("{} in {} from {}", e.degree, e.field, e.school))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

const SUMMARY_PROMPT_TEMPLATE: &str = "\
Optimize this professional summary{role_clause}.{jd_clause}
{profile}
Current summary:
{summary}

Generate a concise, professional summary (3-4 sentences) that highlights \
achievements, uses strong action verbs, and aligns with the target role.";

const EXPERIENCE_PROMPT_TEMPLATE: &str = "\
Optimize this job experience description{role_clause}.{jd_clause}
Current role: {position} at {company} ({duration})
Current description:
{description}

Generate 3-5 bullet points that start with strong action verbs and quantify \
achievements.";

const SKILLS_PROMPT_TEMPLATE: &str = "\
Optimize these skills{role_clause}.{jd_clause}
Current skills:
{skills}

Generate a list of 8-12 relevant technical and soft skills, prioritized by \
importance.";

/// Prompt for the summary category.
pub fn summary_prompt(
    doc: &ResumeDocument,
    context: &DocumentContext,
    options: &OptimizeOptions,
) -> (String, &'static SchemaNode) {
    let prompt = SUMMARY_PROMPT_TEMPLATE
        .replace("{role_clause}", &role_clause(options))
        .replace("{jd_clause}", &jd_clause(options))
        .replace("{profile}", &profile_block(context))
        .replace("{summary}", &doc.personal.summary);
    (prompt, FieldCategory::Summary.schema())
}

/// Prompt for one experience entry.
pub fn experience_prompt(
    entry: &ExperienceEntry,
    options: &OptimizeOptions,
) -> (String, &'static SchemaNode) {
    let prompt = EXPERIENCE_PROMPT_TEMPLATE
        .replace("{role_clause}", &role_clause(options))
        .replace("{jd_clause}", &jd_clause(options))
        .replace("{position}", &entry.position)
        .replace("{company}", &entry.company)
        .replace("{duration}", &entry.duration())
        .replace("{description}", &entry.description);
    (prompt, FieldCategory::Experience.schema())
}

/// Prompt for the skills category.
pub fn skills_prompt(
    doc: &ResumeDocument,
    options: &OptimizeOptions,
) -> (String, &'static SchemaNode) {
    let prompt = SKILLS_PROMPT_TEMPLATE
        .replace("{role_clause}", &role_clause(options))
        .replace("{jd_clause}", &jd_clause(options))
        .replace("{skills}", &doc.skills.join(", "));
    (prompt, FieldCategory::Skills.schema())
}

fn role_clause(options: &OptimizeOptions) -> String {
    let mut clause = String::new();
    if let Some(level) = &options.experience_level {
        clause.push_str(&format!(" for a {level} role"));
    }
    if let Some(role) = &options.target_role {
        clause.push_str(&format!(" as {role}"));
    }
    if let Some(industry) = &options.industry {
        clause.push_str(&format!(" in the {industry} industry"));
    }
    clause
}

fn jd_clause(options: &OptimizeOptions) -> String {
    match &options.job_description {
        Some(jd) => format!("\nJob description: {jd}\n"),
        None => "\n".to_string(),
    }
}

fn profile_block(context: &DocumentContext) -> String {
    let mut lines = Vec::new();
    if !context.skills.is_empty() {
        lines.push(format!("- Skills: {}", context.skills));
    }
    if !context.latest_role.is_empty() {
        lines.push(format!(
            "- Latest role: {} at {}",
            context.latest_role, context.latest_company
        ));
    }
    lines.push(format!("- Total experience: {}", context.total_experience));
    if !context.education.is_empty() {
        lines.push(format!("- Education: {}", context.education));
    }
    format!("\nCandidate profile:\n{}\n", lines.join("\n"))
}
