// src/response_parser.rs
//! Splits a raw model answer into the three narrative fields

use crate::config::NarrativeKeys;
use crate::error::ParseError;

pub const SECTION_DELIMITER: &str = "\n\n";
pub const NARRATIVE_FIELDS: usize = 3;

/// How a response is cut into sections, chosen from its shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitStrategy {
    /// Blank-line separated `<label>: <content>` sections
    Sectioned,
    /// The whole response is one `<label>: <content>` section
    SingleSplit,
}

impl SplitStrategy {
    pub fn for_response(normalized: &str) -> Self {
        if normalized.contains(SECTION_DELIMITER) {
            SplitStrategy::Sectioned
        } else {
            SplitStrategy::SingleSplit
        }
    }
}

/// Objective, personal characteristics and qualifications summary.
///
/// Only built by [`parse_narrative`], so all three fields are non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedNarrative {
    pub objective: String,
    pub characteristics: String,
    pub qualifications: String,
}

impl GeneratedNarrative {
    pub fn fields(&self) -> [(&'static str, &str); NARRATIVE_FIELDS] {
        [
            ("objective", self.objective.as_str()),
            ("characteristics", self.characteristics.as_str()),
            ("qualifications", self.qualifications.as_str()),
        ]
    }

    /// Pair each field with the template key it fills
    pub fn keyed(&self, keys: &NarrativeKeys) -> [(String, String); NARRATIVE_FIELDS] {
        [
            (keys.objective.clone(), self.objective.clone()),
            (keys.characteristics.clone(), self.characteristics.clone()),
            (keys.qualifications.clone(), self.qualifications.clone()),
        ]
    }
}

pub fn parse_narrative(raw: &str) -> Result<GeneratedNarrative, ParseError> {
    let text = raw.replace("\r\n", "\n");
    let text = text.trim();

    let sections: Vec<&str> = match SplitStrategy::for_response(text) {
        SplitStrategy::Sectioned => text
            .split(SECTION_DELIMITER)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect(),
        SplitStrategy::SingleSplit if text.is_empty() => Vec::new(),
        SplitStrategy::SingleSplit => vec![text],
    };

    if sections.len() != NARRATIVE_FIELDS {
        return Err(ParseError::SectionCount {
            expected: NARRATIVE_FIELDS,
            found: sections.len(),
        });
    }

    let mut fields = sections
        .iter()
        .enumerate()
        .map(|(index, section)| content_after_label(section, index))
        .collect::<Result<Vec<_>, _>>()?
        .into_iter();

    // Exactly three entries were checked above
    match (fields.next(), fields.next(), fields.next()) {
        (Some(objective), Some(characteristics), Some(qualifications)) => Ok(GeneratedNarrative {
            objective,
            characteristics,
            qualifications,
        }),
        _ => Err(ParseError::SectionCount {
            expected: NARRATIVE_FIELDS,
            found: sections.len(),
        }),
    }
}

/// Content after the first colon of a section, trimmed
fn content_after_label(section: &str, index: usize) -> Result<String, ParseError> {
    let (_, content) = section
        .split_once(':')
        .ok_or(ParseError::MissingLabel { index })?;
    let content = content.trim();
    if content.is_empty() {
        return Err(ParseError::EmptyField { index });
    }
    Ok(content.to_string())
}

/// A translation answer is used whole; prose may contain colons of its own
pub fn parse_translation(raw: &str) -> Option<String> {
    let text = raw.replace("\r\n", "\n");
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
