//! Template backend for local development and tests.
//!
//! Reads the form fields back out of the prompt and answers with
//! placeholder materials as a structured JSON payload.

use std::time::Duration;

use async_trait::async_trait;
use coursecraft_core::course::{FormData, GenerationType};
use coursecraft_core::materials::placeholder_materials;

use crate::backend::{GenerationBackend, GenerationRequest, GenerationResponse};
use crate::error::GenerationError;

/// Backend that never leaves the process.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    /// Simulated latency per call.
    pub latency: Duration,
}

impl MockBackend {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

/// Recover the form from the line-per-field prompt built by
/// [`crate::prompt::build_request`].
fn form_from_prompt(prompt: &str) -> FormData {
    let mut form = FormData::default();
    for line in prompt.lines() {
        let Some((label, value)) = line.split_once(": ") else {
            continue;
        };
        let value = value.trim().to_string();
        match label {
            "Subject" => form.subject = value,
            "Level" => form.level = value,
            "Audience" => form.audience = value,
            "Duration" => form.duration = value,
            "Tone" => form.tone = value,
            "Language" => form.language = value,
            "Context" => form.context = value,
            "Sections" if value == "lesson-plan" => {
                form.generation_type = Some(GenerationType::Preview)
            }
            _ => {}
        }
    }
    form
}

#[async_trait]
impl GenerationBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn has_credential(&self) -> bool {
        true
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let materials = placeholder_materials(&form_from_prompt(&request.user_prompt));
        let text = serde_json::to_string(&materials)
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;
        Ok(GenerationResponse {
            text,
            model: "mock".to_string(),
            total_tokens: None,
        })
    }

    async fn check_credential(&self) -> Result<(), GenerationError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use coursecraft_core::materials::{Materials, SectionType};

    use super::*;
    use crate::prompt::build_request;

    #[tokio::test]
    async fn mock_answers_with_structured_sections() {
        let form = FormData {
            subject: "Leadership basics".into(),
            ..Default::default()
        };
        let backend = MockBackend::default();
        let response = backend.generate(&build_request(&form, 100)).await.unwrap();

        let materials: Materials = serde_json::from_str(&response.text).unwrap();
        let types: Vec<_> = materials.sections.iter().map(|s| s.section_type).collect();
        assert_eq!(types, SectionType::ALL.to_vec());
        assert!(materials.sections[0].content.contains("Leadership basics"));
    }

    #[test]
    fn prompt_round_trips_preview_flag() {
        let form = FormData {
            subject: "Excel".into(),
            generation_type: Some(GenerationType::Preview),
            ..Default::default()
        };
        let recovered = form_from_prompt(&build_request(&form, 100).user_prompt);
        assert_eq!(recovered.subject, "Excel");
        assert_eq!(recovered.generation_type(), GenerationType::Preview);
    }
}
