//! Rendering of parsed recommendation documents.
//!
//! Two targets: HTML markup for the alert report sent to the backend, and
//! colored text for the terminal.

use colored::Colorize;

use crate::config::schema::PrioritiesConfig;
use crate::utils::html::escape;

use super::{Priority, RecommendationDocument, RecommendationItem};

/// Shown in place of a document that holds no items.
pub const EMPTY_MESSAGE: &str = "No recommendations parsed";

// ---------------------------------------------------------------------------
// Priority colors
// ---------------------------------------------------------------------------

/// CSS color class for a priority level.
pub fn color_class(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "text-red-600",
        Priority::Medium => "text-yellow-600",
        Priority::Low => "text-green-600",
        Priority::Unknown => "text-gray-600",
    }
}

/// CSS color class for a raw section label.
pub fn label_color_class(label: &str, priorities: &PrioritiesConfig) -> &'static str {
    color_class(super::scanner::classify(label, priorities))
}

fn colorize_label(label: &str, priority: Priority) -> colored::ColoredString {
    match priority {
        Priority::High => label.red().bold(),
        Priority::Medium => label.yellow().bold(),
        Priority::Low => label.green().bold(),
        Priority::Unknown => label.bold(),
    }
}

// ---------------------------------------------------------------------------
// HTML
// ---------------------------------------------------------------------------

/// Render the document as the report's recommendation markup.
pub fn to_html(doc: &RecommendationDocument) -> String {
    if doc.is_empty() {
        return format!(
            "<p class=\"text-sm text-gray-600\">{}</p>",
            escape(EMPTY_MESSAGE)
        );
    }

    doc.sections
        .iter()
        .map(|section| {
            let items: String = section.items.iter().map(item_html).collect();
            format!(
                "<div class=\"recommendation-section\">\
                 <h5 class=\"text-lg font-semibold mb-3 {}\">{}</h5>\
                 <ul class=\"space-y-4\">{}</ul></div>",
                color_class(section.priority),
                escape(&section.label),
                items
            )
        })
        .collect::<Vec<_>>()
        .join("<div class=\"border-t my-4\"></div>")
}

fn item_html(item: &RecommendationItem) -> String {
    let mut html = format!(
        "<li class=\"ml-4\"><div class=\"recommendation-content\"><p class=\"mb-2\">{}</p>",
        escape(&item.recommendation)
    );
    for (name, value) in [("Description", &item.description), ("Impact", &item.impact)] {
        if let Some(value) = value {
            html.push_str(&format!(
                "<p class=\"text-sm text-gray-600 mt-1\"><span class=\"font-medium\">{name}:</span> {}</p>",
                escape(value)
            ));
        }
    }
    html.push_str("</div></li>");
    html
}

// ---------------------------------------------------------------------------
// Terminal
// ---------------------------------------------------------------------------

/// Render the document as colored terminal text.
pub fn to_terminal(doc: &RecommendationDocument) -> String {
    if doc.is_empty() {
        return format!("  {}\n", EMPTY_MESSAGE.dimmed());
    }

    let mut out = String::new();
    for (i, section) in doc.sections.iter().enumerate() {
        if i > 0 {
            out.push_str(&format!("  {}\n", "-".repeat(40).dimmed()));
        }
        let label = if section.label.is_empty() {
            "Recommendations"
        } else {
            section.label.as_str()
        };
        out.push_str(&format!("  {}\n", colorize_label(label, section.priority)));

        for (n, item) in section.items.iter().enumerate() {
            out.push_str(&format!("    {}. {}\n", n + 1, item.recommendation));
            if let Some(ref description) = item.description {
                out.push_str(&format!("       {} {}\n", "Description:".dimmed(), description));
            }
            if let Some(ref impact) = item.impact {
                out.push_str(&format!("       {} {}\n", "Impact:".dimmed(), impact));
            }
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
