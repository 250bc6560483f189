//! Cleanup of markup artifacts in model-generated prose.

use std::sync::LazyLock;

use regex::Regex;

/// Two or more consecutive emphasis markers.
static EMPHASIS_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*{2,}").expect("static pattern"));

/// A line made only of asterisks, slashes or dashes, with optional
/// surrounding whitespace. Dashes cover the ASCII `-` used in Markdown rules
/// (`---`) as well as the full-width `－`.
static SYMBOL_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*[*/\-－]+\s*$").expect("static pattern"));

/// Removes `**`-style emphasis runs, then blanks out lines that consist
/// solely of separator symbols. Applying it twice gives the same text.
pub fn filter_ai_symbols(text: &str) -> String {
    let text = EMPHASIS_RUN.replace_all(text, "");
    log::debug!("symbol filter input:\n{text}");
    let result = SYMBOL_LINE.replace_all(&text, "").into_owned();
    log::debug!("symbol filter output:\n{result}");
    result
}
