//! Operator input grammar
//!
//! Pure parsers; none of them touch the session. Each returns `None` (or an
//! empty list) when the text does not fit, and the engine re-prompts.

use crate::identity::normalize_identity;
use rollcall_sheet::ColumnRef;
use std::collections::HashSet;

const AFFIRMATIVE: &[&str] = &["yes", "y", "yep", "yeah", "ok", "okay", "sure", "confirm", "+"];
const NEGATIVE: &[&str] = &["no", "n", "nope", "nah", "-"];

/// Longest column token accepted from the operator
const MAX_COLUMN_TOKEN: usize = 3;

/// Slash command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/start` or `/update`
    Start,
    /// `/cancel` or `/stop`
    Cancel,
    /// `/poll` with its argument text, if any
    Poll(Option<String>),
    /// `/help`
    Help,
    /// Any other slash command
    Unknown(String),
}

/// Parse a slash command; `None` for plain text
#[must_use]
pub fn parse_command(text: &str) -> Option<Command> {
    let rest = text.trim().strip_prefix('/')?;
    let (head, args) = match rest.split_once(char::is_whitespace) {
        Some((head, args)) => (head, args.trim()),
        None => (rest, ""),
    };
    // `/start@rollcall_bot` in group chats
    let name = head.split('@').next().unwrap_or(head).to_lowercase();

    let command = match name.as_str() {
        "start" | "update" => Command::Start,
        "cancel" | "stop" => Command::Cancel,
        "help" => Command::Help,
        "poll" => Command::Poll((!args.is_empty()).then(|| args.to_string())),
        _ => Command::Unknown(name),
    };
    Some(command)
}

/// Parse a yes/no answer
#[must_use]
pub fn parse_yes_no(text: &str) -> Option<bool> {
    let word = text.trim().trim_end_matches(['.', '!']).to_lowercase();
    if AFFIRMATIVE.contains(&word.as_str()) {
        Some(true)
    } else if NEGATIVE.contains(&word.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// Parse a column typed as letters (`H`, `AB`)
///
/// Only uppercase tokens count, so that ordinary lowercase words reach the
/// label search instead.
#[must_use]
pub fn parse_column_token(text: &str) -> Option<ColumnRef> {
    let token = text.trim();
    if token.is_empty()
        || token.len() > MAX_COLUMN_TOKEN
        || !token.bytes().all(|b| b.is_ascii_uppercase())
    {
        return None;
    }
    token.parse().ok()
}

/// Parse a non-negative cost; a decimal comma is accepted
#[must_use]
pub fn parse_cost(text: &str) -> Option<f64> {
    let cleaned = text.trim().replace(',', ".");
    let value: f64 = cleaned.parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

/// Parse a non-negative integer count
#[must_use]
pub fn parse_count(text: &str) -> Option<u32> {
    text.trim().parse().ok()
}

/// Parse a 1-based choice among `len` items into a zero-based index
#[must_use]
pub fn parse_ordinal(text: &str, len: usize) -> Option<usize> {
    let n: usize = text.trim().trim_end_matches('.').parse().ok()?;
    (1..=len).contains(&n).then(|| n - 1)
}

/// Parse a column label
#[must_use]
pub fn parse_label(text: &str) -> Option<String> {
    let label = text.trim();
    (!label.is_empty()).then(|| label.to_string())
}

/// Split free text into identities
///
/// Separators are whitespace, commas and semicolons. Tokens that normalize
/// to nothing are dropped, as are later duplicates of the same normalized
/// identity.
#[must_use]
pub fn parse_identities(text: &str, markers: &[char]) -> Vec<String> {
    let mut seen = HashSet::new();
    text.split(|c: char| c.is_whitespace() || c == ',' || c == ';')
        .filter_map(|token| {
            let normalized = normalize_identity(token, markers);
            (!normalized.is_empty() && seen.insert(normalized)).then(|| token.to_string())
        })
        .collect()
}

/// Question and options parsed from `/poll Question | A | B`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSpec {
    /// Question text
    pub question: String,
    /// Options; empty when only a question was given
    pub options: Vec<String>,
}

/// Parse the argument text of `/poll`
#[must_use]
pub fn parse_poll_spec(args: &str) -> PollSpec {
    let mut parts = args.split('|').map(str::trim);
    let question = parts.next().unwrap_or_default().to_string();
    let options = parts.filter(|o| !o.is_empty()).map(str::to_string).collect();
    PollSpec { question, options }
}
