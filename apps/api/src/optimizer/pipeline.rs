//! Optimization orchestrator.
//!
//! `optimize` never fails and always returns a structurally valid document.
//! Each field category runs a small pipeline — build prompt → generate →
//! parse → validate → repair — with one designated terminal fallback: any
//! failure at any stage substitutes the last-known-good value for that field
//! and nothing else. Experience entries run concurrently and independently;
//! a failure in one entry cannot affect any other.

use std::sync::{Arc, Mutex};

use futures::future::join_all;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::Value;
use tracing::{info, warn};

use crate::llm_client::{GenerationError, GenerationParams, GenerationService};
use crate::models::resume::{ExperienceEntry, ResumeDocument};
use crate::optimizer::normalize::{
    ensure_valid_description, ensure_valid_skills, ensure_valid_summary, normalize,
};
use crate::optimizer::parse::parse;
use crate::optimizer::prompts::{
    experience_prompt, skills_prompt, summary_prompt, DocumentContext, OptimizeOptions,
};
use crate::optimizer::repair::repair;
use crate::optimizer::schema::FieldCategory;
use crate::optimizer::validate::validate;
use crate::optimizer::verbs::suggest_replacement;

/// Minimum generated skill count; below this the original list is used instead.
const MIN_GENERATED_SKILLS: usize = 8;

pub struct Optimizer {
    llm: Arc<dyn GenerationService>,
    rng: Mutex<StdRng>,
}

impl Optimizer {
    pub fn new(llm: Arc<dyn GenerationService>) -> Self {
        Self::with_rng(llm, StdRng::from_entropy())
    }

    /// Injectable randomness source so tests can pin verb selection.
    pub fn with_rng(llm: Arc<dyn GenerationService>, rng: StdRng) -> Self {
        Self {
            llm,
            rng: Mutex::new(rng),
        }
    }

    /// Optimizes a whole document. Total: same-shaped document out, no matter
    /// what the generation service does.
    pub async fn optimize(
        &self,
        document: ResumeDocument,
        options: &OptimizeOptions,
    ) -> ResumeDocument {
        let valid_doc = normalize(document);
        let context = DocumentContext::derive(&valid_doc);

        let summary = self.optimize_summary(&valid_doc, &context, options).await;
        let experience = self
            .optimize_experience(&valid_doc.experience, options)
            .await;
        let skills = self.optimize_skills(&valid_doc, options).await;

        let mut merged = valid_doc;
        merged.personal.summary = summary;
        merged.experience = experience;
        merged.skills = skills;

        self.strengthen_bullets(&mut merged.experience);
        normalize(merged)
    }

    async fn optimize_summary(
        &self,
        doc: &ResumeDocument,
        context: &DocumentContext,
        options: &OptimizeOptions,
    ) -> String {
        let (prompt, _) = summary_prompt(doc, context, options);
        match self.generate_field(FieldCategory::Summary, &prompt).await {
            Ok(value) => value
                .get("summary")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            Err(error) => {
                warn!(%error, "summary optimization failed; keeping original");
                ensure_valid_summary(&doc.personal.summary)
            }
        }
    }

    /// Optimizes every experience entry concurrently. The result list matches
    /// the input order, not completion order.
    async fn optimize_experience(
        &self,
        entries: &[ExperienceEntry],
        options: &OptimizeOptions,
    ) -> Vec<ExperienceEntry> {
        join_all(
            entries
                .iter()
                .map(|entry| self.optimize_entry(entry, options)),
        )
        .await
    }

    async fn optimize_entry(
        &self,
        entry: &ExperienceEntry,
        options: &OptimizeOptions,
    ) -> ExperienceEntry {
        let (prompt, _) = experience_prompt(entry, options);
        let mut optimized = entry.clone();
        optimized.description = match self.generate_field(FieldCategory::Experience, &prompt).await
        {
            Ok(value) => {
                let bullets: Vec<&str> = value
                    .get("bulletPoints")
                    .and_then(Value::as_array)
                    .map(|points| points.iter().filter_map(Value::as_str).collect())
                    .unwrap_or_default();
                ensure_valid_description(&bullets.join("\n"))
            }
            Err(error) => {
                warn!(company = %entry.company, %error, "experience optimization failed; keeping original");
                ensure_valid_description(&entry.description)
            }
        };
        optimized
    }

    async fn optimize_skills(
        &self,
        doc: &ResumeDocument,
        options: &OptimizeOptions,
    ) -> Vec<String> {
        let (prompt, _) = skills_prompt(doc, options);
        match self.generate_field(FieldCategory::Skills, &prompt).await {
            Ok(value) => {
                let skills: Vec<String> = value
                    .get("skills")
                    .and_then(Value::as_array)
                    .map(|items| {
                        items
                            .iter()
                            .filter_map(Value::as_str)
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default();
                if skills.len() < MIN_GENERATED_SKILLS {
                    info!(
                        generated = skills.len(),
                        "generated skill list too small; keeping original"
                    );
                    ensure_valid_skills(&doc.skills)
                } else {
                    skills
                }
            }
            Err(error) => {
                warn!(%error, "skills optimization failed; keeping original");
                ensure_valid_skills(&doc.skills)
            }
        }
    }

    /// One field-category pipeline: generate → parse → validate → repair.
    /// Validation failures are a warning signal only; repair makes the value
    /// safe to merge regardless.
    async fn generate_field(
        &self,
        category: FieldCategory,
        prompt: &str,
    ) -> Result<Value, GenerationError> {
        let schema = category.schema();
        let params = GenerationParams::for_category(category);
        let raw = self.llm.generate(prompt, schema, &params).await?;
        let candidate = parse(&raw, schema);
        let verdict = validate(&candidate, schema);
        if !verdict.is_valid {
            let warning = GenerationError::Validation(verdict.violations.join("; "));
            warn!(?category, %warning, "generated content violates schema; repairing");
        }
        Ok(repair(&candidate, schema))
    }

    /// Rewrites bullet lines that do not open with a strong action verb.
    /// The fixed placeholder bullet is left untouched.
    fn strengthen_bullets(&self, entries: &mut [ExperienceEntry]) {
        let mut rng = self.rng.lock().expect("rng mutex poisoned");
        for entry in entries {
            entry.description = entry
                .description
                .lines()
                .map(|line| {
                    if line == crate::optimizer::normalize::PLACEHOLDER_BULLET {
                        return line.to_string();
                    }
                    match line.strip_prefix("• ") {
                        Some(text) => format!("• {}", suggest_replacement(text, &mut *rng)),
                        None => line.to_string(),
                    }
                })
                .collect::<Vec<_>>()
                .join("\n");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::PersonalInfo;
    use crate::optimizer::normalize::{PLACEHOLDER_BULLET, PLACEHOLDER_SKILL};
    use crate::optimizer::schema::SchemaNode;
    use crate::optimizer::verbs::is_strong_verb;
    use async_trait::async_trait;

    /// Scripted generation service: responses keyed by category, with
    /// experience responses selected by a marker substring of the prompt.
    struct StubService {
        summary: Result<String, GenerationError>,
        experience: Vec<(&'static str, Result<String, GenerationError>)>,
        skills: Result<String, GenerationError>,
    }

    impl StubService {
        fn all_ok() -> Self {
            Self {
                summary: Ok(summary_json()),
                experience: vec![
                    ("Initech", Ok(experience_json())),
                    ("Globex", Ok(experience_json_alt())),
                    ("Hooli", Ok(experience_json())),
                ],
                skills: Ok(skills_json()),
            }
        }

        fn all_failing(error: GenerationError) -> Self {
            Self {
                summary: Err(error.clone()),
                experience: vec![
                    ("Initech", Err(error.clone())),
                    ("Globex", Err(error.clone())),
                    ("Hooli", Err(error.clone())),
                ],
                skills: Err(error),
            }
        }
    }

    #[async_trait]
    impl GenerationService for StubService {
        async fn generate(
            &self,
            prompt: &str,
            schema: &SchemaNode,
            _params: &GenerationParams,
        ) -> Result<String, GenerationError> {
            if std::ptr::eq(schema, FieldCategory::Summary.schema()) {
                return self.summary.clone();
            }
            if std::ptr::eq(schema, FieldCategory::Skills.schema()) {
                return self.skills.clone();
            }
            for (marker, response) in &self.experience {
                if prompt.contains(marker) {
                    return response.clone();
                }
            }
            Err(GenerationError::Network("no scripted response".to_string()))
        }
    }

    fn summary_json() -> String {
        r#"{"summary": "Accomplished engineer delivering measurable impact across large distributed platforms."}"#
            .to_string()
    }

    fn experience_json() -> String {
        r#"{"bulletPoints": [
            "Led migration of twelve services to Kubernetes",
            "Reduced deployment time by 80% through pipeline automation",
            "Delivered a billing platform serving 2M users"
        ], "metrics": ["80%", "2M users"]}"#
            .to_string()
    }

    fn experience_json_alt() -> String {
        r#"{"bulletPoints": [
            "Designed a streaming ingestion layer handling 50k events/s",
            "Improved query latency by 60% with targeted indexing",
            "Launched three customer-facing analytics dashboards"
        ], "metrics": ["50k events/s", "60%"]}"#
            .to_string()
    }

    fn skills_json() -> String {
        r#"{"skills": ["Rust", "Go", "Python", "SQL", "Kubernetes", "Terraform", "Kafka", "Redis"],
            "categories": {"technical": ["Rust", "Go", "SQL"], "soft": ["Mentoring", "Communication"]}}"#
            .to_string()
    }

    fn document() -> ResumeDocument {
        ResumeDocument {
            personal: PersonalInfo {
                first_name: "Ada".to_string(),
                summary: "Engineer with a decade of experience building platforms.".to_string(),
                ..Default::default()
            },
            education: vec![],
            experience: vec![
                entry("Initech", "helped the team ship features"),
                entry("Globex", "worked on the billing system"),
                entry("Hooli", "did maintenance and support"),
            ],
            skills: vec!["Python".to_string(), "Go".to_string(), "Rust".to_string()],
        }
    }

    fn entry(company: &str, description: &str) -> ExperienceEntry {
        ExperienceEntry {
            id: format!("{company}-1"),
            company: company.to_string(),
            position: "Engineer".to_string(),
            start_date: "2020".to_string(),
            description: description.to_string(),
            ..Default::default()
        }
    }

    fn optimizer(service: StubService) -> Optimizer {
        Optimizer::with_rng(Arc::new(service), StdRng::seed_from_u64(42))
    }

    #[tokio::test]
    async fn test_happy_path_replaces_all_three_categories() {
        let optimized = optimizer(StubService::all_ok())
            .optimize(document(), &OptimizeOptions::default())
            .await;

        assert_eq!(
            optimized.personal.summary,
            "Accomplished engineer delivering measurable impact across large distributed platforms."
        );
        assert_eq!(
            optimized.experience[0].description,
            "• Led migration of twelve services to Kubernetes\n\
             • Reduced deployment time by 80% through pipeline automation\n\
             • Delivered a billing platform serving 2M users"
        );
        assert_eq!(optimized.skills.len(), 8);
        assert_eq!(optimized.skills[0], "Rust");
    }

    #[tokio::test]
    async fn test_fallback_safety_when_everything_fails() {
        let service = StubService::all_failing(GenerationError::Network("unreachable".to_string()));
        let input = document();
        let experience_len = input.experience.len();

        let optimized = optimizer(service)
            .optimize(input, &OptimizeOptions::default())
            .await;

        assert_eq!(optimized.experience.len(), experience_len);
        assert!(!optimized.skills.is_empty());
        assert_eq!(
            optimized.personal.summary,
            "Engineer with a decade of experience building platforms."
        );
        // Fallback descriptions are bullet-normalized originals.
        assert!(optimized.experience[0].description.starts_with("• "));
    }

    #[tokio::test]
    async fn test_fallback_is_identical_across_error_kinds() {
        let kinds = [
            GenerationError::Parse("bad".to_string()),
            GenerationError::Api {
                status: 500,
                message: "boom".to_string(),
            },
            GenerationError::Network("down".to_string()),
        ];
        let mut outputs = Vec::new();
        for kind in kinds {
            let optimized = optimizer(StubService::all_failing(kind))
                .optimize(document(), &OptimizeOptions::default())
                .await;
            outputs.push((
                optimized.personal.summary,
                optimized.skills,
                optimized.experience.len(),
            ));
        }
        assert_eq!(outputs[0], outputs[1]);
        assert_eq!(outputs[1], outputs[2]);
    }

    #[tokio::test]
    async fn test_single_entry_failure_is_isolated() {
        let all_ok = optimizer(StubService::all_ok())
            .optimize(document(), &OptimizeOptions::default())
            .await;

        let mut service = StubService::all_ok();
        service.experience[1] = (
            "Globex",
            Err(GenerationError::Api {
                status: 500,
                message: "internal".to_string(),
            }),
        );
        let one_failed = optimizer(service)
            .optimize(document(), &OptimizeOptions::default())
            .await;

        // The failing entry falls back to its normalized original description.
        assert_ne!(
            one_failed.experience[1].description,
            all_ok.experience[1].description
        );
        // The other entries are exactly what they would have been.
        assert_eq!(
            one_failed.experience[0].description,
            all_ok.experience[0].description
        );
        assert_eq!(
            one_failed.experience[2].description,
            all_ok.experience[2].description
        );
        assert_eq!(one_failed.experience.len(), 3);
    }

    #[tokio::test]
    async fn test_result_order_matches_input_order() {
        let optimized = optimizer(StubService::all_ok())
            .optimize(document(), &OptimizeOptions::default())
            .await;
        let companies: Vec<&str> = optimized
            .experience
            .iter()
            .map(|e| e.company.as_str())
            .collect();
        assert_eq!(companies, vec!["Initech", "Globex", "Hooli"]);
    }

    #[tokio::test]
    async fn test_small_generated_skill_list_is_discarded() {
        let mut service = StubService::all_ok();
        service.skills = Ok(r#"{"skills": ["Rust", "Go", "SQL"],
            "categories": {"technical": ["Rust"], "soft": ["Grit"]}}"#
            .to_string());

        let optimized = optimizer(service)
            .optimize(document(), &OptimizeOptions::default())
            .await;

        // Fewer than 8 generated → deduplicated original list instead.
        assert_eq!(optimized.skills, vec!["Python", "Go", "Rust"]);
    }

    #[tokio::test]
    async fn test_oversized_generated_skill_list_is_kept_as_is() {
        // The 8-minimum check and the schema's 12-maximum are two different
        // repair strategies; an oversized generated list passes the first and
        // is deliberately kept.
        let skills: Vec<String> = (1..=13).map(|i| format!("Skill {i}")).collect();
        let mut service = StubService::all_ok();
        service.skills = Ok(serde_json::json!({
            "skills": skills,
            "categories": {"technical": ["A", "B", "C"], "soft": ["D", "E"]}
        })
        .to_string());

        let optimized = optimizer(service)
            .optimize(document(), &OptimizeOptions::default())
            .await;
        assert_eq!(optimized.skills.len(), 13);
    }

    #[tokio::test]
    async fn test_deduplicated_original_skills_on_network_error() {
        let mut input = document();
        input.skills = vec![
            "Python".to_string(),
            "Python".to_string(),
            "Go".to_string(),
        ];
        let mut service = StubService::all_ok();
        service.skills = Err(GenerationError::Network("unreachable".to_string()));

        let optimized = optimizer(service)
            .optimize(input, &OptimizeOptions::default())
            .await;

        assert_eq!(optimized.skills, vec!["Python", "Go"]);
    }

    #[tokio::test]
    async fn test_empty_bullet_output_gets_placeholder() {
        let mut service = StubService::all_ok();
        service.experience = vec![
            ("Initech", Ok(r#"{"bulletPoints": [], "metrics": []}"#.to_string())),
            ("Globex", Ok(experience_json())),
            ("Hooli", Ok(experience_json())),
        ];

        let optimized = optimizer(service)
            .optimize(document(), &OptimizeOptions::default())
            .await;
        assert_eq!(optimized.experience[0].description, PLACEHOLDER_BULLET);
    }

    #[tokio::test]
    async fn test_fallback_bullets_are_verb_strengthened() {
        let service = StubService::all_failing(GenerationError::Network("down".to_string()));
        let optimized = optimizer(service)
            .optimize(document(), &OptimizeOptions::default())
            .await;

        // "helped the team ship features" → strong leadership verb, rest kept.
        let first = &optimized.experience[0].description;
        let opening = first
            .trim_start_matches("• ")
            .split_whitespace()
            .next()
            .unwrap();
        assert!(is_strong_verb(opening), "got {first}");
        assert!(first.ends_with("the team ship features"));
    }

    #[tokio::test]
    async fn test_garbage_responses_still_produce_a_valid_document() {
        let service = StubService {
            summary: Ok("I'm sorry, I can't do that.".to_string()),
            experience: vec![
                ("Initech", Ok("no json at all".to_string())),
                ("Globex", Ok("{broken".to_string())),
                ("Hooli", Ok("```json\n{also broken\n```".to_string())),
            ],
            skills: Ok("here are some thoughts about skills".to_string()),
        };

        let optimized = optimizer(service)
            .optimize(document(), &OptimizeOptions::default())
            .await;

        // Summary degraded to empty → normalizer default kicks in.
        assert!(!optimized.personal.summary.is_empty());
        assert_eq!(optimized.experience.len(), 3);
        assert!(!optimized.skills.is_empty());
        assert_ne!(optimized.skills, vec![PLACEHOLDER_SKILL]);
    }
}
