//! Maps a [`VerificationResult`] to display sections.
//!
//! Rendering is pure: the same result always yields the same sections. The
//! CLI prints them through the `Display` impl; other front ends can walk
//! [`Report::sections`] directly.

use serde::Serialize;
use std::fmt;

use labelcheck_core::{StructuredSource, VerificationResult};

/// Shown in place of a replacement when the backend had nothing to offer.
pub const NOT_ENOUGH_INFORMATION: &str = "Not enough information is provided in the document.";

/// Shown when the backend returned no structured sources.
pub const NO_STRUCTURED_SOURCES: &str = "No detailed structured sources available.";

const DIVIDER_WIDTH: usize = 60;

/// Visual weight of a callout box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CalloutStyle {
    /// Neutral/informational (blue in the dashboard).
    Info,
    /// Problem the reader must notice (red in the dashboard).
    Alert,
}

/// One structured source, numbered from 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceCard {
    pub index: usize,
    pub page: String,
    pub file: String,
    pub heading: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Section {
    Heading { text: String },
    Field { label: String, value: String },
    Metric { label: String, value: String },
    Text { text: String },
    Callout { style: CalloutStyle, text: String },
    Bullet { text: String },
    Divider,
    Source(SourceCard),
}

impl Section {
    fn heading(text: &str) -> Self {
        Self::Heading {
            text: text.to_string(),
        }
    }

    fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    fn metric(label: &str, value: impl Into<String>) -> Self {
        Self::Metric {
            label: label.to_string(),
            value: value.into(),
        }
    }
}

/// Rendered verification result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub sections: Vec<Section>,
}

impl Report {
    /// Value of the "Valid Claim" field.
    pub fn badge(&self) -> Option<&str> {
        self.sections.iter().find_map(|s| match s {
            Section::Field { label, value } if label == "Valid Claim" => Some(value.as_str()),
            _ => None,
        })
    }

    /// Formatted confidence score, if displayed.
    pub fn score(&self) -> Option<&str> {
        self.metric("Confidence Score")
    }

    pub fn metric(&self, wanted: &str) -> Option<&str> {
        self.sections.iter().find_map(|s| match s {
            Section::Metric { label, value } if label == wanted => Some(value.as_str()),
            _ => None,
        })
    }

    /// The callout under "Suggested Replacement", if that section is shown.
    pub fn replacement(&self) -> Option<(CalloutStyle, &str)> {
        let start = self.sections.iter().position(
            |s| matches!(s, Section::Heading { text } if text == "Suggested Replacement"),
        )?;
        match self.sections.get(start + 1) {
            Some(Section::Callout { style, text }) => Some((*style, text.as_str())),
            _ => None,
        }
    }

    pub fn sources(&self) -> impl Iterator<Item = &SourceCard> {
        self.sections.iter().filter_map(|s| match s {
            Section::Source(card) => Some(card),
            _ => None,
        })
    }
}

/// Render a verification result into ordered sections.
pub fn render(result: &VerificationResult) -> Report {
    let mut sections = vec![
        Section::heading("Verification Result"),
        Section::Field {
            label: "Valid Claim".to_string(),
            value: result.validity.to_string(),
        },
        Section::metric("Superscripts", superscripts(&result.superscripts)),
        Section::Divider,
        Section::heading("Original Sentence"),
        Section::text(result.sentence.as_deref().unwrap_or("—")),
    ];

    if result.shows_replacement_section() {
        sections.push(Section::heading("Suggested Replacement"));
        sections.push(match &result.replacement {
            Some(text) => Section::Callout {
                style: CalloutStyle::Info,
                text: text.clone(),
            },
            None => Section::Callout {
                style: CalloutStyle::Alert,
                text: NOT_ENOUGH_INFORMATION.to_string(),
            },
        });
        if let Some(score) = result.displayed_score() {
            sections.push(Section::metric("Confidence Score", format!("{:.2}", score)));
        }
    }

    sections.push(Section::heading("Explanation"));
    sections.push(Section::text(result.explanation.as_deref().unwrap_or(" ")));
    sections.push(Section::heading("Reasoning"));
    sections.push(Section::text(result.reasoning.as_deref().unwrap_or(" ")));

    sections.push(Section::heading("Sources Summary"));
    sections.extend(
        result
            .sources
            .iter()
            .map(|s| Section::Bullet { text: s.clone() }),
    );

    sections.push(Section::Divider);
    if result.structured_sources.is_empty() {
        sections.push(Section::Callout {
            style: CalloutStyle::Info,
            text: NO_STRUCTURED_SOURCES.to_string(),
        });
    } else {
        sections.push(Section::heading("All Sources"));
        sections.extend(
            result
                .structured_sources
                .iter()
                .enumerate()
                .map(|(i, source)| Section::Source(card(i + 1, source))),
        );
    }

    Report { sections }
}

fn superscripts(values: &[String]) -> String {
    if values.is_empty() {
        " ".to_string()
    } else {
        values.join(", ")
    }
}

fn card(index: usize, source: &StructuredSource) -> SourceCard {
    SourceCard {
        index,
        page: source.page.clone(),
        file: source.file.clone(),
        heading: source.heading.clone(),
        text: source.text.clone(),
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Heading { text } => write!(f, "\n## {}", text),
            Self::Field { label, value } | Self::Metric { label, value } => {
                write!(f, "{}: {}", label, value)
            }
            Self::Text { text } => write!(f, "{}", text),
            Self::Callout {
                style: CalloutStyle::Info,
                text,
            } => write!(f, "[i] {}", text),
            Self::Callout {
                style: CalloutStyle::Alert,
                text,
            } => write!(f, "[!] {}", text),
            Self::Bullet { text } => write!(f, "- {}", text),
            Self::Divider => write!(f, "{}", "-".repeat(DIVIDER_WIDTH)),
            Self::Source(card) => {
                write!(f, "\n#### Source {}\n", card.index)?;
                write!(f, "Page No: {} | File: {}", card.page, card.file)?;
                if let Some(heading) = &card.heading {
                    write!(f, "\n{}", heading)?;
                }
                write!(f, "\n{}\n", card.text)
            }
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for section in &self.sections {
            writeln!(f, "{}", section)?;
        }
        Ok(())
    }
}
