use crate::{NewSkill, Skill};
use serde::{Deserialize, Serialize};

/// Body returned by both the list and delete endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillsResponse {
    pub skills: Vec<Skill>,
}

impl From<Vec<Skill>> for SkillsResponse {
    fn from(skills: Vec<Skill>) -> Self {
        Self { skills }
    }
}

/// Body accepted by `POST /api/skill`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillCreateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill: Option<NewSkill>,
}

/// Body returned by `POST /api/skill`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillCreateResponse {
    pub skill: Skill,
}
