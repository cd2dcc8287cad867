//! Purpose: Provide the runtime JSON decode entrypoints and failure categories.
//! Exports: `from_str`, `from_slice`, `ParseFailureCategory`, `categorize_error`, `hint_for_error`.
//! Role: Parser boundary that centralizes serde_json usage details.
//! Invariants: Category labels are stable strings used in diagnostics.
//! Invariants: Hints never embed payload contents, only position and context.
//! Notes: Error mapping into crate errors is done by callsites so domain context stays explicit.

use serde::de::DeserializeOwned;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParseFailureCategory {
    Syntax,
    Eof,
    Data,
    Io,
}

impl ParseFailureCategory {
    pub fn label(self) -> &'static str {
        match self {
            ParseFailureCategory::Syntax => "syntax",
            ParseFailureCategory::Eof => "eof",
            ParseFailureCategory::Data => "data",
            ParseFailureCategory::Io => "io",
        }
    }
}

pub fn from_str<T: DeserializeOwned>(input: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(input)
}

pub fn from_slice<T: DeserializeOwned>(input: &[u8]) -> Result<T, serde_json::Error> {
    serde_json::from_slice(input)
}

pub fn categorize_error(err: &serde_json::Error) -> ParseFailureCategory {
    use serde_json::error::Category;
    match err.classify() {
        Category::Syntax => ParseFailureCategory::Syntax,
        Category::Eof => ParseFailureCategory::Eof,
        Category::Data => ParseFailureCategory::Data,
        Category::Io => ParseFailureCategory::Io,
    }
}

pub fn hint_for_error(err: &serde_json::Error, context: &str) -> String {
    let category = categorize_error(err);
    format!(
        "parse category: {}; line {} column {}; context: {context}",
        category.label(),
        err.line(),
        err.column()
    )
}
