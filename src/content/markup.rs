//! HTML markup buffer
//!
//! Rendering builds HTML as a string. Literal content always goes through
//! [`Markup::push_text`], which escapes it; tags are pushed raw.

use std::fmt;

/// Rendered HTML fragment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markup(String);

impl Markup {
    pub fn new() -> Self {
        Self(String::new())
    }

    /// Wrap already-safe HTML
    pub fn raw(html: impl Into<String>) -> Self {
        Self(html.into())
    }

    /// Escaped text
    pub fn text(text: &str) -> Self {
        Self(escape(text))
    }

    pub fn push_raw(&mut self, html: &str) {
        self.0.push_str(html);
    }

    pub fn push_text(&mut self, text: &str) {
        self.0.push_str(&escape(text));
    }

    pub fn push(&mut self, other: Markup) {
        self.0.push_str(&other.0);
    }

    /// Push `<tag attrs>inner</tag>`
    pub fn push_element(&mut self, tag: &str, attrs: &[(&str, &str)], inner: Markup) {
        self.0.push('<');
        self.0.push_str(tag);
        for (name, value) in attrs {
            self.0.push(' ');
            self.0.push_str(name);
            self.0.push_str("=\"");
            self.0.push_str(&escape(value));
            self.0.push('"');
        }
        self.0.push('>');
        self.0.push_str(&inner.0);
        self.0.push_str("</");
        self.0.push_str(tag);
        self.0.push('>');
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.0.contains(needle)
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Markup> for String {
    fn from(markup: Markup) -> Self {
        markup.0
    }
}

/// Escape text for use in element content and quoted attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("a < b && c > \"d\""), "a &lt; b &amp;&amp; c &gt; &quot;d&quot;");
        assert_eq!(escape("it's"), "it&#39;s");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_push_element() {
        let mut markup = Markup::new();
        markup.push_element("a", &[("href", "/x?a=1&b=2")], Markup::text("<go>"));
        assert_eq!(markup.as_str(), "<a href=\"/x?a=1&amp;b=2\">&lt;go&gt;</a>");
    }
}
