//! Recommendation formatter.
//!
//! Turns the raw recommendation text returned by the backend into a
//! [`RecommendationDocument`]: an ordered list of priority sections, each
//! holding numbered items with optional description and impact fields.
//!
//! Parsing is tolerant by construction. Text outside any priority section
//! and unnumbered text inside a section are dropped; input with no
//! recognizable section yields the single empty section reported by
//! [`RecommendationDocument::is_empty`]. Nothing here returns an error.

pub mod render;
pub mod scanner;

use std::fmt;

use serde::Serialize;

use crate::config::schema::{PrioritiesConfig, UnrecognizedLabels};

use scanner::{Field, Token, TokenKind};

// ---------------------------------------------------------------------------
// Document model
// ---------------------------------------------------------------------------

/// Priority level of a recommendation section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
    Unknown,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// One numbered recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendationItem {
    pub recommendation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,
}

/// A labeled group of recommendations, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrioritySection {
    /// Label text as written by the backend, e.g. `"High Priority"`.
    pub label: String,
    pub priority: Priority,
    pub items: Vec<RecommendationItem>,
}

/// Parsed recommendation text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendationDocument {
    pub sections: Vec<PrioritySection>,
}

impl RecommendationDocument {
    /// The document produced when no priority section was recognized: a
    /// single unlabeled section without items.
    fn unparsed() -> Self {
        Self {
            sections: vec![PrioritySection {
                label: String::new(),
                priority: Priority::Unknown,
                items: Vec::new(),
            }],
        }
    }

    /// True when the document holds no recommendation items at all.
    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(|s| s.items.is_empty())
    }

    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse backend recommendation text.
pub fn parse(text: &str, priorities: &PrioritiesConfig) -> RecommendationDocument {
    let tokens = scanner::scan(text, priorities);

    let markers: Vec<&Token<'_>> = tokens
        .iter()
        .filter(|t| matches!(t.kind, TokenKind::Priority { .. }))
        .collect();

    let mut sections = Vec::new();
    for (i, marker) in markers.iter().enumerate() {
        let TokenKind::Priority { label, level } = marker.kind else {
            continue;
        };
        if level == Priority::Unknown && priorities.unrecognized == UnrecognizedLabels::Drop {
            continue;
        }

        let body_end = markers.get(i + 1).map_or(text.len(), |next| next.start);
        let body: Vec<&Token<'_>> = tokens
            .iter()
            .filter(|t| t.start >= marker.end && t.start < body_end)
            .collect();

        sections.push(PrioritySection {
            label: label.to_string(),
            priority: level,
            items: parse_items(text, &body, body_end),
        });
    }

    if sections.is_empty() {
        return RecommendationDocument::unparsed();
    }
    RecommendationDocument { sections }
}

/// Split a section body into items.
///
/// An item marker at the start of a line always opens a new item. An inline
/// marker (`... 1. foo 2. bar`) only does so when it continues the section's
/// numbering, so prose like "retry up to 3. Then" stays inside the current
/// item.
fn parse_items(text: &str, body: &[&Token<'_>], body_end: usize) -> Vec<RecommendationItem> {
    let mut starts: Vec<&Token<'_>> = Vec::new();
    let mut last_number: Option<u32> = None;

    for token in body {
        let TokenKind::Item { number, line_start } = token.kind else {
            continue;
        };
        let continues = match last_number {
            Some(prev) => number == prev + 1,
            None => true,
        };
        if line_start || continues {
            starts.push(token);
            last_number = Some(number);
        }
    }

    let mut items = Vec::new();
    for (i, start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).map_or(body_end, |next| next.start);
        let fields: Vec<&Token<'_>> = body
            .iter()
            .copied()
            .filter(|t| t.start >= start.end && t.start < end)
            .filter(|t| matches!(t.kind, TokenKind::Field(_)))
            .collect();

        if let Some(item) = build_item(text, start.end, end, &fields) {
            items.push(item);
        }
    }
    items
}

/// Cut one item's text at its first `Description:` and first `Impact:`.
fn build_item(
    text: &str,
    start: usize,
    end: usize,
    fields: &[&Token<'_>],
) -> Option<RecommendationItem> {
    let first = |wanted: Field| {
        fields
            .iter()
            .copied()
            .find(|t| t.kind == TokenKind::Field(wanted))
    };
    let description = first(Field::Description);
    let impact = first(Field::Impact);

    let cuts: Vec<usize> = [description, impact]
        .iter()
        .flatten()
        .map(|t| t.start)
        .collect();
    let next_cut_after = |pos: usize| {
        cuts.iter()
            .copied()
            .filter(|&c| c > pos)
            .min()
            .unwrap_or(end)
    };

    let recommendation_end = cuts.iter().copied().min().unwrap_or(end);
    let recommendation = clean_part(&text[start..recommendation_end]);
    if recommendation.is_empty() {
        return None;
    }

    let field_text = |token: Option<&Token<'_>>| {
        token
            .map(|t| clean_part(&text[t.end..next_cut_after(t.start)]))
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    Some(RecommendationItem {
        recommendation: recommendation.to_string(),
        description: field_text(description),
        impact: field_text(impact),
    })
}

/// Trim a sub-part, including the list bullet that introduced the next field.
fn clean_part(part: &str) -> &str {
    let trimmed = part.trim();
    for bullet in ['-', '*'] {
        if let Some(rest) = trimmed.strip_suffix(bullet)
            && (rest.is_empty() || rest.ends_with(char::is_whitespace))
        {
            return rest.trim_end();
        }
    }
    trimmed
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
