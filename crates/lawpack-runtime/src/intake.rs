//! Case intake: raw complaint text to a structured [`Case`].

use std::sync::Arc;

use lawpack_core::Case;

use crate::generation::GenerationService;
use crate::prompts::{intake_prompt, intake_schema};

/// Builds cases through generation, falling back to [`Case::fallback`].
#[derive(Debug, Clone)]
pub struct CaseExtractor {
    generation: Arc<GenerationService>,
}

impl CaseExtractor {
    pub fn new(generation: Arc<GenerationService>) -> Self {
        Self { generation }
    }

    pub async fn extract(&self, raw_input: &str) -> Case {
        let generated = if self.generation.is_enabled() {
            self.generation
                .generate_structured(&intake_prompt(raw_input), &intake_schema())
                .await
        } else {
            None
        };

        match generated {
            Some(value) => {
                let case = Case::from_generated(&value, raw_input);
                tracing::debug!(task = %case.task, keywords = ?case.keywords, "case extracted");
                case
            }
            None => {
                tracing::warn!("case generation unavailable, using fallback case");
                Case::fallback(raw_input)
            }
        }
    }
}
