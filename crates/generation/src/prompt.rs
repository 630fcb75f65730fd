//! Builds the backend request for a generation form.

use coursecraft_core::course::{FormData, GenerationType};
use coursecraft_core::materials::SectionType;

use crate::backend::GenerationRequest;

/// Default completion allowance.
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 4000;

const SYSTEM_PROMPT: &str = "You are an experienced instructional designer. \
Write practical, ready-to-use training materials. \
Answer with a single JSON object of the form \
{\"sections\": [{\"type\": \"...\", \"title\": \"...\", \"content\": \"...\"}]} \
and nothing else. Use only the section types you are asked for.";

/// Section types requested for a form.
pub fn requested_sections(form: &FormData) -> &'static [SectionType] {
    match form.generation_type() {
        GenerationType::Complete => &SectionType::ALL,
        GenerationType::Preview => &[SectionType::LessonPlan],
    }
}

/// Build the request. Blank optional fields fall back to neutral defaults.
pub fn build_request(form: &FormData, max_output_tokens: u32) -> GenerationRequest {
    let sections = requested_sections(form)
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let mut user_prompt = String::new();
    push_field(&mut user_prompt, "Subject", &form.subject, "");
    push_field(&mut user_prompt, "Level", &form.level, "Beginner");
    push_field(&mut user_prompt, "Audience", &form.audience, "General audience");
    push_field(&mut user_prompt, "Duration", &form.duration, "Half a day");
    push_field(&mut user_prompt, "Tone", &form.tone, "Professional");
    push_field(&mut user_prompt, "Language", &form.language, "english");
    push_field(&mut user_prompt, "Context", &form.context, "None");
    user_prompt.push_str(&format!("Sections: {sections}\n"));

    GenerationRequest {
        system_prompt: SYSTEM_PROMPT.to_string(),
        user_prompt,
        max_output_tokens,
        temperature: 0.7,
    }
}

fn push_field(out: &mut String, label: &str, value: &str, fallback: &str) {
    let value = value.trim();
    let value = if value.is_empty() { fallback } else { value };
    // Keep one field per line so the prompt stays line-addressable.
    let value = value.replace('\n', " ");
    out.push_str(&format!("{label}: {value}\n"));
}
