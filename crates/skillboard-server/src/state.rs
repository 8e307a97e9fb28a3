use std::sync::Arc;

use skillboard_persistence::SkillRepository;

use crate::frontend::FrontendDelivery;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub skills: SkillRepository,
    pub frontend: Arc<dyn FrontendDelivery>,
}

impl AppState {
    pub fn new(skills: SkillRepository, frontend: Arc<dyn FrontendDelivery>) -> Self {
        Self { skills, frontend }
    }
}
