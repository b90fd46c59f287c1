//! Component name normalization.
//!
//! Registry keys are UpperCamelCase: the input is split into words on case
//! changes, separators and between a digit and the letter after it,
//! camel-cased, and the first character is uppercased (`"hello"` ->
//! `"Hello"`, `"trend-chart"` -> `"TrendChart"`, `"chart-2d"` -> `"Chart2D"`).

use heck::ToUpperCamelCase;
use latebind_types::InvalidName;

/// Converts a user-supplied component name into its registry key.
///
/// # Errors
/// Returns [`InvalidName`] when the input has no word characters, including
/// the empty string.
pub fn canonicalize(name: &str) -> Result<String, InvalidName> {
    let canonical = split_after_digits(name).to_upper_camel_case();
    if canonical.is_empty() {
        return Err(InvalidName { name: name.to_string() });
    }
    Ok(canonical)
}

/// Separates a run of digits from the letter that follows it, so `"2d"`
/// becomes the two words `"2"` and `"d"`.
fn split_after_digits(name: &str) -> String {
    let mut split = String::with_capacity(name.len());
    let mut previous_is_digit = false;
    for ch in name.chars() {
        if previous_is_digit && ch.is_alphabetic() {
            split.push(' ');
        }
        split.push(ch);
        previous_is_digit = ch.is_ascii_digit();
    }
    split
}
