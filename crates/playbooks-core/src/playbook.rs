//! Playbook source validation.
//!
//! A playbook is a markdown program: one `# Title` heading naming the agent,
//! followed by `## Section` headings for its playbooks. The gateway only
//! needs enough structure to reject unusable input and to label sessions
//! and traces; interpreting the program is the agent runtime's job.

use crate::error::PlaybookError;
use once_cell::sync::Lazy;
use regex::Regex;

static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^#[ \t]+(.+?)[ \t]*$").expect("valid title regex"));

static SECTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^##[ \t]+(.+?)[ \t]*$").expect("valid section regex"));

/// A validated playbook source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playbook {
    title: String,
    sections: Vec<String>,
    source: String,
}

impl Playbook {
    /// Validate a playbook source and extract its headings.
    pub fn parse(source: &str) -> Result<Self, PlaybookError> {
        if source.trim().is_empty() {
            return Err(PlaybookError::Empty);
        }

        let title = extract_title(source).ok_or(PlaybookError::MissingTitle)?;

        let sections = SECTION_RE
            .captures_iter(source)
            .map(|c| c[1].to_string())
            .collect();

        Ok(Self {
            title,
            sections,
            source: source.to_string(),
        })
    }

    /// The agent title from the `# Title` heading.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Names of the `## Section` headings, in order.
    pub fn sections(&self) -> &[String] {
        &self.sections
    }

    /// The original source text.
    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Name shown for a stored source that has no title heading.
pub const UNTITLED: &str = "Playbook";

/// Extract the first `# Title` heading from a markdown source.
pub fn extract_title(source: &str) -> Option<String> {
    TITLE_RE
        .captures(source)
        .map(|c| c[1].trim().to_string())
        .filter(|t| !t.is_empty())
}
