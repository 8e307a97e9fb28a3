//! Skill API handlers: list, create, delete.

use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use skillboard_types::{SkillCreateRequest, SkillCreateResponse, SkillId, SkillsResponse};
use tracing::info;

use crate::api::ApiError;
use crate::state::AppState;

/// `GET /api/skill`
pub async fn list_skills(State(state): State<AppState>) -> Result<Json<SkillsResponse>, ApiError> {
    let skills = state.skills.list().await?;
    Ok(Json(skills.into()))
}

/// `POST /api/skill`
pub async fn create_skill(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SkillCreateResponse>, ApiError> {
    let request: SkillCreateRequest = serde_json::from_slice(&body).map_err(|e| {
        ApiError::bad_request(format!("Failed to unmarshal request body: {}", e))
    })?;

    let new_skill = request
        .skill
        .ok_or_else(|| ApiError::bad_request("Missing skill in request body"))?;

    let skill = state.skills.create(&new_skill).await?;
    info!(skill_id = skill.skill_id, "Created skill");

    Ok(Json(SkillCreateResponse { skill }))
}

/// `DELETE /api/skill/{skill_id}`; responds with the remaining skills
pub async fn delete_skill(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<SkillsResponse>, ApiError> {
    let skill_id = parse_skill_id(&raw_id)?;
    let skills = state.skills.delete(skill_id).await?;
    Ok(Json(skills.into()))
}

fn parse_skill_id(raw: &str) -> Result<SkillId, ApiError> {
    raw.parse::<SkillId>()
        .map_err(|e| ApiError::bad_request(format!("Failed to parse skill ID: {}", e)))
}
