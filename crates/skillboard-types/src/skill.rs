use serde::{Deserialize, Serialize};

/// Store-assigned skill identifier
pub type SkillId = i64;

/// A persisted skill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub skill_id: SkillId,
    pub name: String,
    pub description: String,
}

impl Skill {
    pub fn new(skill_id: SkillId, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            skill_id,
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Fields supplied by a client when creating a skill.
///
/// Both fields are optional on the wire and default to empty strings; any
/// `skill_id` the client sends is ignored since the store assigns ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSkill {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl NewSkill {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}
