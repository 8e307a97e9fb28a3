//! Skillboard Types - Core types for the Skillboard service
//!
//! This module defines the skill entity and the JSON shapes exchanged over HTTP.

mod api;
mod skill;

pub use api::{SkillCreateRequest, SkillCreateResponse, SkillsResponse};
pub use skill::{NewSkill, Skill, SkillId};
