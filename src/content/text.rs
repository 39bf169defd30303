//! Inline text formatting
//!
//! Renders a text run as one `<span>` per span, with a utility class for
//! each active annotation and a hyperlink around the content when the span
//! links somewhere.

use super::markup::Markup;
use super::types::{Annotations, RichText};

/// Render a text run; an absent run renders nothing
pub fn render_text(runs: Option<&[RichText]>) -> Markup {
    let mut out = Markup::new();
    if let Some(runs) = runs {
        for run in runs {
            out.push(render_span(run));
        }
    }
    out
}

/// CSS classes for the active annotations, space separated
pub fn annotation_classes(annotations: &Annotations) -> String {
    [
        (annotations.bold, "font-bold"),
        (annotations.italic, "italic"),
        (annotations.strikethrough, "line-through"),
        (annotations.underline, "underline"),
        (annotations.code, "font-mono"),
    ]
    .iter()
    .filter(|(active, _)| *active)
    .map(|(_, class)| *class)
    .collect::<Vec<_>>()
    .join(" ")
}

fn render_span(run: &RichText) -> Markup {
    let content = match run.link() {
        Some(url) => {
            let mut link = Markup::new();
            link.push_element("a", &[("href", url)], Markup::text(run.content()));
            link
        }
        None => Markup::text(run.content()),
    };

    let classes = annotation_classes(&run.annotations);
    let mut span = Markup::new();
    if classes.is_empty() {
        span.push_element("span", &[], content);
    } else {
        span.push_element("span", &[("class", classes.as_str())], content);
    }
    span
}
