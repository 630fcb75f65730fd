//! Generated course materials: typed sections and their rendering.

use serde::{Deserialize, Serialize};

use crate::course::{FormData, GenerationType};

/// The closed set of material kinds a generation produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionType {
    LessonPlan,
    Slides,
    TrainerNotes,
    Exercises,
}

impl SectionType {
    /// All section types in presentation order.
    pub const ALL: [SectionType; 4] = [
        SectionType::LessonPlan,
        SectionType::Slides,
        SectionType::TrainerNotes,
        SectionType::Exercises,
    ];

    /// Wire tag, e.g. `"trainer-notes"`.
    pub fn as_str(self) -> &'static str {
        match self {
            SectionType::LessonPlan => "lesson-plan",
            SectionType::Slides => "slides",
            SectionType::TrainerNotes => "trainer-notes",
            SectionType::Exercises => "exercises",
        }
    }

    /// Title used when the backend did not supply one.
    pub fn default_title(self) -> &'static str {
        match self {
            SectionType::LessonPlan => "Lesson plan",
            SectionType::Slides => "Slides",
            SectionType::TrainerNotes => "Trainer notes",
            SectionType::Exercises => "Exercises",
        }
    }

    /// Leniently map a free-form label (`"lesson_plan"`, `"Lesson Plan"`,
    /// `"trainerNotes"`, `"slide notes"`, `"activities"`) to a section type.
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized: String = label
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "lessonplan" | "lessonplans" | "plan" | "courseplan" => Some(SectionType::LessonPlan),
            "slides" | "slide" | "slidenotes" | "slidedeck" | "presentation" => {
                Some(SectionType::Slides)
            }
            "trainernotes" | "trainersnotes" | "facilitatornotes" | "notes" => {
                Some(SectionType::TrainerNotes)
            }
            "exercises" | "exercise" | "activities" | "practice" => Some(SectionType::Exercises),
            _ => None,
        }
    }
}

/// One generated material unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    #[serde(rename = "type")]
    pub section_type: SectionType,
    pub title: String,
    pub content: String,
}

impl Section {
    pub fn new(section_type: SectionType, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            section_type,
            title: title.into(),
            content: content.into(),
        }
    }
}

/// The `data` payload of a completed job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Materials {
    pub sections: Vec<Section>,
}

impl Materials {
    pub fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    /// True when there is no section carrying any non-whitespace content.
    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(|s| s.content.trim().is_empty())
    }

    /// Render as a single Markdown document, one `##` heading per section.
    pub fn to_markdown(&self, title: &str) -> String {
        let mut out = format!("# {title}\n");
        for section in &self.sections {
            out.push_str(&format!("\n## {}\n\n{}\n", section.title, section.content.trim()));
        }
        out
    }
}

/// Placeholder materials built from templates.
///
/// Used by the mock generation backend and by the `fabricate` recovery
/// policy. The text is a template, not generated content.
pub fn placeholder_materials(form: &FormData) -> Materials {
    let subject = form.title();
    let audience = non_blank(&form.audience, "participants");
    let duration = non_blank(&form.duration, "one session");
    let level = non_blank(&form.level, "all levels");

    let types: &[SectionType] = match form.generation_type() {
        GenerationType::Complete => &SectionType::ALL,
        GenerationType::Preview => &[SectionType::LessonPlan],
    };

    let sections = types
        .iter()
        .map(|&t| {
            let content = match t {
                SectionType::LessonPlan => format!(
                    "Course: {subject}\nLevel: {level}\nAudience: {audience}\nDuration: {duration}\n\n\
                     1. Introduction and objectives\n2. Core concepts of {subject}\n\
                     3. Guided practice\n4. Review and next steps"
                ),
                SectionType::Slides => format!(
                    "Slide 1: {subject}\nSlide 2: Learning objectives\n\
                     Slide 3: Key concepts\nSlide 4: Case study\nSlide 5: Summary"
                ),
                SectionType::TrainerNotes => format!(
                    "Open by asking {audience} what they already know about {subject}. \
                     Keep each block short and check understanding before moving on."
                ),
                SectionType::Exercises => format!(
                    "Exercise 1: In pairs, list three situations where {subject} applies.\n\
                     Exercise 2: Work through a short case study and present findings."
                ),
            };
            Section::new(t, t.default_title(), content)
        })
        .collect();

    Materials::new(sections)
}

fn non_blank<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback
    } else {
        trimmed
    }
}
