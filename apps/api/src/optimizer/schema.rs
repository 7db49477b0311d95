//! Schema model for generated content.
//!
//! Each optimizable field category (summary, experience, skills) has one fixed
//! schema describing the shape the generation service is asked to return.
//! Schemas are built once at first use and immutable afterwards — validation,
//! repair, and prompt construction all borrow the same static node.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{json, Map, Value};

/// Structural constraints for a string value.
#[derive(Debug)]
pub struct StringNode {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Regex>,
}

/// Structural constraints for a list value.
#[derive(Debug)]
pub struct ArrayNode {
    pub items: Box<SchemaNode>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
    pub unique_items: bool,
}

/// Structural constraints for a record value.
///
/// Property order is meaningful: the heuristic extractor and the schema JSON
/// sent to the generation service both walk properties in declaration order.
#[derive(Debug)]
pub struct ObjectNode {
    pub properties: Vec<(&'static str, SchemaNode)>,
    pub required: Vec<&'static str>,
}

/// A schema node. Closed sum type — the validator matches exhaustively.
#[derive(Debug)]
pub enum SchemaNode {
    String(StringNode),
    Array(ArrayNode),
    Object(ObjectNode),
}

impl SchemaNode {
    /// JSON Schema-equivalent shape, embedded in the generation system prompt
    /// to bias the service toward compliant output.
    pub fn to_json(&self) -> Value {
        match self {
            SchemaNode::String(s) => {
                let mut out = Map::new();
                out.insert("type".into(), json!("string"));
                if let Some(min) = s.min_length {
                    out.insert("minLength".into(), json!(min));
                }
                if let Some(max) = s.max_length {
                    out.insert("maxLength".into(), json!(max));
                }
                if let Some(re) = &s.pattern {
                    out.insert("pattern".into(), json!(re.as_str()));
                }
                Value::Object(out)
            }
            SchemaNode::Array(a) => {
                let mut out = Map::new();
                out.insert("type".into(), json!("array"));
                out.insert("items".into(), a.items.to_json());
                if let Some(min) = a.min_items {
                    out.insert("minItems".into(), json!(min));
                }
                if let Some(max) = a.max_items {
                    out.insert("maxItems".into(), json!(max));
                }
                if a.unique_items {
                    out.insert("uniqueItems".into(), json!(true));
                }
                Value::Object(out)
            }
            SchemaNode::Object(o) => {
                let mut properties = Map::new();
                for (key, node) in &o.properties {
                    properties.insert((*key).into(), node.to_json());
                }
                json!({
                    "type": "object",
                    "properties": properties,
                    "required": o.required,
                    "additionalProperties": false,
                })
            }
        }
    }
}

/// One of the three independently optimized slices of a resume document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldCategory {
    Summary,
    Experience,
    Skills,
}

impl FieldCategory {
    /// The fixed schema for this category. Built on first access, then shared.
    pub fn schema(&self) -> &'static SchemaNode {
        static SUMMARY: OnceLock<SchemaNode> = OnceLock::new();
        static EXPERIENCE: OnceLock<SchemaNode> = OnceLock::new();
        static SKILLS: OnceLock<SchemaNode> = OnceLock::new();

        match self {
            FieldCategory::Summary => SUMMARY.get_or_init(summary_schema),
            FieldCategory::Experience => EXPERIENCE.get_or_init(experience_schema),
            FieldCategory::Skills => SKILLS.get_or_init(skills_schema),
        }
    }
}

fn string(min: usize, max: usize, pattern: &str) -> SchemaNode {
    SchemaNode::String(StringNode {
        min_length: Some(min),
        max_length: Some(max),
        pattern: compile(pattern),
    })
}

fn compile(pattern: &str) -> Option<Regex> {
    // The patterns below are fixed at compile time; a typo shows up in tests.
    Regex::new(pattern).ok()
}

fn summary_schema() -> SchemaNode {
    SchemaNode::Object(ObjectNode {
        properties: vec![(
            "summary",
            // Must start with a capital letter and end with a period.
            string(50, 500, "^[A-Z].*[.]$"),
        )],
        required: vec!["summary"],
    })
}

fn experience_schema() -> SchemaNode {
    SchemaNode::Object(ObjectNode {
        properties: vec![
            (
                "bulletPoints",
                SchemaNode::Array(ArrayNode {
                    // Each bullet must open with a strong action verb.
                    items: Box::new(string(
                        20,
                        200,
                        "^(Led|Managed|Developed|Created|Implemented|Achieved|Increased|Reduced|Improved|Designed|Built|Launched|Coordinated|Established|Generated|Delivered|Spearheaded|Orchestrated|Transformed|Streamlined).*",
                    )),
                    min_items: Some(3),
                    max_items: Some(5),
                    unique_items: true,
                }),
            ),
            (
                "metrics",
                SchemaNode::Array(ArrayNode {
                    // Quantified achievements: every entry must contain a number.
                    items: Box::new(SchemaNode::String(StringNode {
                        min_length: None,
                        max_length: None,
                        pattern: compile(r".*\d+.*"),
                    })),
                    min_items: Some(1),
                    max_items: None,
                    unique_items: false,
                }),
            ),
        ],
        required: vec!["bulletPoints", "metrics"],
    })
}

fn skills_schema() -> SchemaNode {
    SchemaNode::Object(ObjectNode {
        properties: vec![
            (
                "skills",
                SchemaNode::Array(ArrayNode {
                    // Capitalized, allowing common tech symbols (C++, CI/CD, F#).
                    items: Box::new(string(2, 50, r"^[A-Z][A-Za-z0-9\s/+#]+")),
                    min_items: Some(8),
                    max_items: Some(12),
                    unique_items: true,
                }),
            ),
            (
                "categories",
                SchemaNode::Object(ObjectNode {
                    properties: vec![
                        (
                            "technical",
                            SchemaNode::Array(ArrayNode {
                                items: Box::new(SchemaNode::String(StringNode {
                                    min_length: None,
                                    max_length: None,
                                    pattern: None,
                                })),
                                min_items: Some(3),
                                max_items: None,
                                unique_items: false,
                            }),
                        ),
                        (
                            "soft",
                            SchemaNode::Array(ArrayNode {
                                items: Box::new(SchemaNode::String(StringNode {
                                    min_length: None,
                                    max_length: None,
                                    pattern: None,
                                })),
                                min_items: Some(2),
                                max_items: None,
                                unique_items: false,
                            }),
                        ),
                    ],
                    required: vec!["technical", "soft"],
                }),
            ),
        ],
        required: vec!["skills", "categories"],
    })
}
