//! Doc-comment synthesis.
//!
//! Raw comment text that starts with an ellipsis placeholder (`...` or `…`)
//! is completed with the name of the entity it documents, so `"...does X"`
//! on `Foo` becomes `"Foo does X"`. Anything else renders verbatim.

/// Complete a raw comment for `subject`. Blank comments yield `None`.
pub fn synthesize(subject: &str, raw: &str) -> Option<String> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }
    let rest = text
        .strip_prefix("...")
        .or_else(|| text.strip_prefix('…'));
    Some(match rest {
        Some(rest) if rest.trim().is_empty() => subject.to_string(),
        Some(rest) => format!("{} {}", subject, rest.trim_start()),
        None => text.to_string(),
    })
}

/// Text of a role sub-entry (parameter or result), placeholder removed.
///
/// The role label itself is the subject, so `"...the connection"` on
/// parameter `db` yields `"the connection"`.
pub fn role_text(raw: &str) -> Option<String> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }
    let rest = text
        .strip_prefix("...")
        .or_else(|| text.strip_prefix('…'))
        .unwrap_or(text);
    Some(rest.trim().to_string())
}

/// [`synthesize`] over an optional comment, split into lines.
pub fn doc_lines(subject: &str, raw: Option<&str>) -> Vec<String> {
    raw.and_then(|r| synthesize(subject, r))
        .map(|text| text.lines().map(|l| l.trim_end().to_string()).collect())
        .unwrap_or_default()
}

/// A function comment together with its role-labelled sub-entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FuncDoc {
    pub summary: Vec<String>,
    /// `(parameter name, role text)` in declaration order.
    pub params: Vec<(String, String)>,
    /// Documented results in declaration order.
    pub results: Vec<ResultDoc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultDoc {
    /// Result name if named, else its rendered type.
    pub label: String,
    pub text: String,
    pub failure: bool,
}

impl FuncDoc {
    pub fn is_empty(&self) -> bool {
        self.summary.is_empty() && self.params.is_empty() && self.results.is_empty()
    }

    pub fn has_roles(&self) -> bool {
        !self.params.is_empty() || !self.results.is_empty()
    }
}
