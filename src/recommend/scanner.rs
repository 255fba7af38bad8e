//! Token scanner for backend recommendation text.
//!
//! The backend answers `/api/generate-recommendations` with loosely formatted
//! LLM output. Three token kinds are recognized:
//!
//! - **priority marker**: `## High Priority:` style headings (any label, colon
//!   optional at end of line), bare line-start labels such as
//!   `Medium Priority:` whose text carries a configured keyword, or an inline
//!   `<keyword> Priority:` anywhere in the text.
//! - **item marker**: `1.` .. `999.` preceded by start of text, whitespace or
//!   `:` and followed by whitespace or end of text. At line start or after a
//!   colon a letter may follow directly (`1.Fix`).
//! - **field marker**: `Description:` / `Impact:` (optionally in `**bold**`).
//!
//! Everything else is plain text and is located by the byte ranges between
//! tokens. The scanner never fails; unrecognized input yields fewer tokens.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::schema::PrioritiesConfig;

use super::Priority;

// ---------------------------------------------------------------------------
// Compiled regexes
// ---------------------------------------------------------------------------

/// Heading: `#`.. at the start of a line, or `##`.. anywhere. The label runs
/// to the first `:` or end of line.
static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)(?:^[ \t]*#+|##+)[ \t]*(?:\*\*)?(?P<label>[^:\n#*]*?)(?:\*\*)?[ \t]*(?::(?:\*\*)?|$)",
    )
    .expect("heading regex must compile")
});

/// Bare label at the start of a line, terminated by a colon.
static BARE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(?:[-*][ \t]+)?(?:\*\*)?(?P<label>[A-Za-z][^:\n#*]{0,60}?)(?:\*\*)?[ \t]*:(?:\*\*)?",
    )
    .expect("bare label regex must compile")
});

/// `<word> Priority:` at any word boundary.
static INLINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:\*\*)?\b(?P<label>[a-z]+[ \t]+priority)(?:\*\*)?[ \t]*:(?:\*\*)?")
        .expect("inline label regex must compile")
});

/// Candidate item numbers; boundaries are checked by hand since the regex
/// crate has no look-behind.
static ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,3}\.").expect("item regex must compile"));

static FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\*\*)?(?P<name>Description|Impact)(?:\*\*)?[ \t]*:(?:\*\*)?")
        .expect("field regex must compile")
});

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

/// Which optional item field a field marker introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Description,
    Impact,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind<'a> {
    Priority { label: &'a str, level: Priority },
    Item { number: u32, line_start: bool },
    Field(Field),
}

/// A recognized marker and the byte range it occupies in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub start: usize,
    pub end: usize,
}

// ---------------------------------------------------------------------------
// Scanning
// ---------------------------------------------------------------------------

/// Scan `text` into a start-ordered, non-overlapping token stream.
pub fn scan<'a>(text: &'a str, priorities: &PrioritiesConfig) -> Vec<Token<'a>> {
    let mut tokens = priority_markers(text, priorities);

    let inside_marker = |pos: usize, tokens: &[Token<'_>]| {
        tokens.iter().any(|t| pos >= t.start && pos < t.end)
    };

    let mut others: Vec<Token<'a>> = Vec::new();
    for m in ITEM_RE.find_iter(text) {
        if inside_marker(m.start(), &tokens) || !is_item_boundary(text, m.start(), m.end()) {
            continue;
        }
        let Ok(number) = text[m.start()..m.end() - 1].parse::<u32>() else {
            continue;
        };
        others.push(Token {
            kind: TokenKind::Item {
                number,
                line_start: at_line_start(text, m.start()),
            },
            start: m.start(),
            end: m.end(),
        });
    }

    for caps in FIELD_RE.captures_iter(text) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.name("name")) else {
            continue;
        };
        if inside_marker(whole.start(), &tokens) {
            continue;
        }
        let field = if name.as_str() == "Description" {
            Field::Description
        } else {
            Field::Impact
        };
        others.push(Token {
            kind: TokenKind::Field(field),
            start: whole.start(),
            end: whole.end(),
        });
    }

    tokens.extend(others);
    tokens.sort_by_key(|t| t.start);
    tokens
}

/// Collect heading and bare-label priority markers.
fn priority_markers<'a>(text: &'a str, priorities: &PrioritiesConfig) -> Vec<Token<'a>> {
    let mut markers = Vec::new();

    for caps in HEADING_RE.captures_iter(text) {
        let (Some(whole), Some(label)) = (caps.get(0), caps.name("label")) else {
            continue;
        };
        let label = label.as_str().trim();
        markers.push(Token {
            kind: TokenKind::Priority {
                label,
                level: classify(label, priorities),
            },
            start: whole.start(),
            end: whole.end(),
        });
    }

    for re in [&*BARE_RE, &*INLINE_RE] {
        for caps in re.captures_iter(text) {
            let (Some(whole), Some(label)) = (caps.get(0), caps.name("label")) else {
                continue;
            };
            let label = label.as_str().trim();
            let overlaps = markers
                .iter()
                .any(|t: &Token<'_>| whole.start() < t.end && t.start < whole.end());
            if overlaps || !is_bare_priority_label(label, priorities) {
                continue;
            }
            markers.push(Token {
                kind: TokenKind::Priority {
                    label,
                    level: classify(label, priorities),
                },
                start: whole.start(),
                end: whole.end(),
            });
        }
    }

    markers.sort_by_key(|t| t.start);
    markers
}

/// Map a label to a priority level by case-insensitive substring match,
/// checking the high, medium and low keyword sets in that order.
pub fn classify(label: &str, priorities: &PrioritiesConfig) -> Priority {
    let lower = label.to_lowercase();
    let hit = |keywords: &[String]| {
        keywords
            .iter()
            .any(|k| !k.is_empty() && lower.contains(&k.to_lowercase()))
    };

    if hit(&priorities.high) {
        Priority::High
    } else if hit(&priorities.medium) {
        Priority::Medium
    } else if hit(&priorities.low) {
        Priority::Low
    } else {
        Priority::Unknown
    }
}

/// A bare (non-heading) label only opens a section when it is exactly a
/// keyword, or contains a keyword together with the word "priority".
fn is_bare_priority_label(label: &str, priorities: &PrioritiesConfig) -> bool {
    let lower = label.to_lowercase();
    let keywords = priorities
        .high
        .iter()
        .chain(&priorities.medium)
        .chain(&priorities.low)
        .filter(|k| !k.is_empty())
        .map(|k| k.to_lowercase());

    for keyword in keywords {
        if lower == keyword || (lower.contains(&keyword) && lower.contains("priority")) {
            return true;
        }
    }
    false
}

fn is_item_boundary(text: &str, start: usize, end: usize) -> bool {
    let before_ok = text[..start]
        .chars()
        .next_back()
        .is_none_or(|c| c.is_whitespace() || c == ':');
    let after_ok = match text[end..].chars().next() {
        None => true,
        Some(c) if c.is_whitespace() => true,
        Some(c) if c.is_alphabetic() => at_line_start(text, start) || after_colon(text, start),
        Some(_) => false,
    };
    before_ok && after_ok
}

/// True when the last non-blank character before `pos` is a colon.
fn after_colon(text: &str, pos: usize) -> bool {
    text[..pos].trim_end_matches([' ', '\t']).ends_with(':')
}

/// True when only spaces or tabs separate `pos` from the previous newline.
fn at_line_start(text: &str, pos: usize) -> bool {
    text[..pos]
        .chars()
        .rev()
        .take_while(|&c| c != '\n')
        .all(|c| c == ' ' || c == '\t')
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
