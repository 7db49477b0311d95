// Content optimization pipeline.
// Flow: normalize → {build prompt → generate → parse → validate → repair} per
// field category (experience entries run concurrently) → merge → normalize.
// All LLM calls go through llm_client — no direct HTTP calls here.

pub mod handlers;
pub mod normalize;
pub mod parse;
pub mod pipeline;
pub mod prompts;
pub mod repair;
pub mod schema;
pub mod validate;
pub mod verbs;
