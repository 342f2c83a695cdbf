//! In-band control directives embedded in assistant text.
//!
//! The assistant ends a reply with `[RENAME_PROJECT: "New Name"]` to ask for
//! a rename, and older backends left `[PHASE_COMPLETE]` in the text instead
//! of sending a `phase_complete` chunk. Detection runs over finished text
//! only; the stream decoder never looks at it.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Literal phase-completion marker.
pub const PHASE_COMPLETE_MARKER: &str = "[PHASE_COMPLETE]";

static RENAME_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\[RENAME_PROJECT: "(.+?)"\]"#).expect("rename directive pattern is valid")
});

/// Whether directives stay visible in the rendered transcript.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectiveDisplay {
    /// Remove directives from displayed text
    #[default]
    Strip,
    /// Show text exactly as the assistant produced it
    Keep,
}

impl DirectiveDisplay {
    /// Apply this policy to message text.
    pub fn render<'a>(self, text: &'a str) -> std::borrow::Cow<'a, str> {
        match self {
            DirectiveDisplay::Keep => std::borrow::Cow::Borrowed(text),
            DirectiveDisplay::Strip => std::borrow::Cow::Owned(strip_directives(text)),
        }
    }
}

/// Name requested by the first rename directive in `text`.
pub fn extract_rename(text: &str) -> Option<String> {
    RENAME_DIRECTIVE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|name| name.as_str().to_string())
}

/// Whether `text` still carries the literal phase marker.
pub fn has_phase_marker(text: &str) -> bool {
    text.contains(PHASE_COMPLETE_MARKER)
}

/// `text` with every directive removed.
///
/// Trailing whitespace left behind by a removed directive is trimmed; text
/// without directives comes back unchanged.
pub fn strip_directives(text: &str) -> String {
    if !has_phase_marker(text) && !RENAME_DIRECTIVE.is_match(text) {
        return text.to_string();
    }
    let without_rename = RENAME_DIRECTIVE.replace_all(text, "");
    without_rename
        .replace(PHASE_COMPLETE_MARKER, "")
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_quoted_name() {
        assert_eq!(
            extract_rename("Hello [RENAME_PROJECT: \"Acme Corp\"] world").as_deref(),
            Some("Acme Corp")
        );
    }

    #[test]
    fn first_directive_wins() {
        let text = "[RENAME_PROJECT: \"One\"] and [RENAME_PROJECT: \"Two\"]";
        assert_eq!(extract_rename(text).as_deref(), Some("One"));
    }

    #[test]
    fn malformed_directives_are_ignored() {
        assert_eq!(extract_rename("[RENAME_PROJECT: Acme]"), None);
        assert_eq!(extract_rename("[RENAME_PROJECT: \"\"]"), None);
        assert_eq!(extract_rename("rename to \"Acme\""), None);
    }

    #[test]
    fn strip_removes_all_markers() {
        let text = "Done with this phase. [PHASE_COMPLETE]\n[RENAME_PROJECT: \"Acme\"]\n";
        assert_eq!(strip_directives(text), "Done with this phase.");
        assert!(has_phase_marker(text));
    }

    #[test]
    fn text_without_directives_is_unchanged() {
        let text = "code:\n    x = 1\n\n";
        assert_eq!(strip_directives(text), text);
        assert_eq!(DirectiveDisplay::Strip.render(text), text);
    }

    #[test]
    fn keep_policy_borrows_text() {
        let text = "x [RENAME_PROJECT: \"y\"]";
        assert_eq!(DirectiveDisplay::Keep.render(text), text);
        assert_eq!(DirectiveDisplay::Strip.render(text), "x");
    }
}
