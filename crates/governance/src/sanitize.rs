//! Plain-text field sanitization for user-submitted form values.

use regex::{Captures, Regex};

/// Strips markup, control whitespace and percent-encoded octets from a
/// single-line text field.
///
/// A `<` that never closes into a tag is kept as `&lt;` rather than dropped,
/// so `a<b` sanitizes to `a&lt;b`.
pub struct TextSanitizer {
    script_blocks: Regex,
    less_than: Regex,
    tags: Regex,
    whitespace: Regex,
    octets: Regex,
    spaces: Regex,
}

impl TextSanitizer {
    /// Create a sanitizer with the default patterns.
    pub fn new() -> Self {
        Self {
            script_blocks: Regex::new(r"(?is)<(?:script|style)[^>]*>.*?</(?:script|style)\s*>").unwrap(),
            less_than: Regex::new(r"<[^<>]*>?").unwrap(),
            tags: Regex::new(r"<[^>]*>").unwrap(),
            whitespace: Regex::new(r"[\r\n\t ]+").unwrap(),
            octets: Regex::new(r"(?i)%[a-f0-9]{2}").unwrap(),
            spaces: Regex::new(r" +").unwrap(),
        }
    }

    /// Sanitize a text field. An empty result means the input carried no text.
    pub fn sanitize(&self, input: &str) -> String {
        let escaped = self.less_than.replace_all(input, |caps: &Captures<'_>| {
            let span = &caps[0];
            if span.ends_with('>') {
                span.to_string()
            } else {
                escape_html(span)
            }
        });
        let without_scripts = self.script_blocks.replace_all(&escaped, "");
        let without_tags = self.tags.replace_all(&without_scripts, "");
        let collapsed = self.whitespace.replace_all(&without_tags, " ");

        let mut filtered = collapsed.trim().to_string();

        // Removing one octet can expose another, e.g. "%%4141".
        let mut found = false;
        while self.octets.is_match(&filtered) {
            filtered = self.octets.replace_all(&filtered, "").into_owned();
            found = true;
        }
        if found {
            filtered = self.spaces.replace_all(filtered.trim(), " ").into_owned();
        }

        filtered
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

impl Default for TextSanitizer {
    fn default() -> Self {
        Self::new()
    }
}
