//! Axum route handlers for the resume API.
//!
//! Handlers are thin: fetch the owner-checked document, run the pipeline,
//! persist, respond. All optimization semantics live in `pipeline`.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::ResumeDocument;
use crate::optimizer::normalize::normalize;
use crate::optimizer::prompts::OptimizeOptions;
use crate::state::AppState;
use crate::store::ResumeRecord;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResumeRequest {
    pub owner_id: Uuid,
    pub document: ResumeDocument,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerQuery {
    pub owner_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeRequest {
    pub owner_id: Uuid,
    #[serde(default)]
    pub context: OptimizeOptions,
}

/// POST /api/v1/resumes
///
/// Stores a new resume document, normalized on write so nothing structurally
/// unsound ever lands in the store.
pub async fn handle_create_resume(
    State(state): State<AppState>,
    Json(request): Json<CreateResumeRequest>,
) -> Result<Json<ResumeRecord>, AppError> {
    let document = normalize(request.document);
    let record = state.store.create(request.owner_id, document).await?;
    info!(resume_id = %record.id, owner_id = %record.owner_id, "resume created");
    Ok(Json(record))
}

/// GET /api/v1/resumes/:id?ownerId=...
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<ResumeRecord>, AppError> {
    let record = state.store.get(resume_id, query.owner_id).await?;
    Ok(Json(record))
}

/// POST /api/v1/resumes/:id/optimize
///
/// Runs the full optimization pipeline over the stored document and persists
/// the result. Always succeeds once the resume is found and owned by the
/// caller — generation failures degrade to per-field fallbacks internally.
pub async fn handle_optimize_resume(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
    Json(request): Json<OptimizeRequest>,
) -> Result<Json<ResumeRecord>, AppError> {
    let record = state.store.get(resume_id, request.owner_id).await?;

    info!(resume_id = %resume_id, "optimizing resume");
    let optimized = state
        .optimizer
        .optimize(record.document, &request.context)
        .await;

    let updated = state
        .store
        .update_document(resume_id, request.owner_id, optimized)
        .await?;
    info!(resume_id = %resume_id, "resume optimized and saved");
    Ok(Json(updated))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optimize_request_context_is_optional() {
        let json = serde_json::json!({"ownerId": Uuid::new_v4()});
        let request: OptimizeRequest = serde_json::from_value(json).unwrap();
        assert!(request.context.job_description.is_none());
        assert!(request.context.target_role.is_none());
    }

    #[test]
    fn test_optimize_request_with_full_context() {
        let json = serde_json::json!({
            "ownerId": Uuid::new_v4(),
            "context": {
                "jobDescription": "We need a platform engineer.",
                "targetRole": "Platform Engineer",
                "industry": "fintech",
                "experienceLevel": "senior"
            }
        });
        let request: OptimizeRequest = serde_json::from_value(json).unwrap();
        assert_eq!(
            request.context.target_role.as_deref(),
            Some("Platform Engineer")
        );
        assert_eq!(request.context.industry.as_deref(), Some("fintech"));
    }

    #[test]
    fn test_create_request_accepts_partial_document() {
        let json = serde_json::json!({
            "ownerId": Uuid::new_v4(),
            "document": {"skills": ["Rust"]}
        });
        let request: CreateResumeRequest = serde_json::from_value(json).unwrap();
        assert_eq!(request.document.skills, vec!["Rust"]);
    }
}
