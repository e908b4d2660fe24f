//! Reply texts

use crate::error::RESTART_HINT;
use crate::types::{ColumnCandidate, Conflict, WriteReport};
use rollcall_poll::PollRecord;
use rollcall_sheet::ColumnRef;
use std::fmt::Write as _;

/// Command list
pub const HELP: &str = "Commands:\n\
    /start - record attendance for a date column\n\
    /poll [Question | Option 1 | Option 2 ...] - post a poll (default poll without arguments)\n\
    /cancel - abandon the current step\n\
    /help - this list\n\
    Forward one of my polls here to view or use its votes.";

/// Plain text while nothing is in progress
pub const IDLE_HINT: &str = "Nothing is in progress. Send /start to record attendance or /help for commands.";

/// Cycle abandoned
pub const CANCELLED: &str = "Cancelled. Send /start whenever you're ready.";

/// Yes/no expected
pub const YES_NO: &str = "Please answer yes or no.";

/// Label question
pub const ASK_LABEL: &str = "What date (label) should this column have?";

/// Label re-prompt
pub const LABEL_EMPTY: &str = "The label can't be empty. What date should this column have?";

/// Cost question
pub const ASK_COST: &str = "What was the cost?";

/// Cost re-prompt
pub const COST_INVALID: &str = "Please send the cost as a non-negative number, e.g. 50 or 12.5.";

/// Identity question
pub const ASK_USERNAMES: &str = "Who attended? Send the usernames separated by spaces or commas.";

/// Identity re-prompt
pub const USERNAMES_EMPTY: &str = "I couldn't find any usernames in that. Send them separated by spaces or commas.";

/// Headcount question
pub const ASK_COUNT: &str = "How many people attended?";

/// Headcount re-prompt
pub const COUNT_INVALID: &str = "Please send the headcount as a whole number, e.g. 12.";

/// Poll intent re-prompt
pub const POLL_INTENT: &str = "Reply \"view\" to see the votes or \"update\" to record them in the sheet.";

/// Start-of-cycle question when a date column already exists
#[must_use]
pub fn confirm_column(candidate: &ColumnCandidate) -> String {
    format!(
        "The latest column is {} ({}). Use it?\n\
         Answer yes or no, send a column letter, or type a date to search for.",
        candidate.column, candidate.label
    )
}

/// Offer to create `column`
#[must_use]
pub fn offer_new_column(column: ColumnRef) -> String {
    format!("Create a new column {column}? (yes/no)")
}

/// Search came up empty
#[must_use]
pub fn no_column_matches(query: &str) -> String {
    format!(
        "No column matches \"{}\". Answer yes or no, send a column letter, or try another date.",
        query.trim()
    )
}

/// Column letter outside the date columns
#[must_use]
pub fn column_out_of_range(column: ColumnRef, first: ColumnRef, last: ColumnRef) -> String {
    format!(
        "Column {column} is outside the date columns ({first} to {last}). Answer yes or no, send a column letter in that range, or try a date."
    )
}

/// Several columns match
#[must_use]
pub fn choose_column(candidates: &[ColumnCandidate]) -> String {
    let mut out = String::from("Several columns match. Which one?\n");
    for (n, candidate) in candidates.iter().enumerate() {
        let _ = writeln!(out, "{}. {} ({})", n + 1, candidate.column, candidate.label);
    }
    out.push_str("Send the number or the column letter.");
    out
}

/// Column selection re-prompt
#[must_use]
pub fn choose_column_again(count: usize) -> String {
    format!("Please send a number from 1 to {count} or one of the listed column letters.")
}

/// Column adopted
#[must_use]
pub fn using_column(column: ColumnRef, label: Option<&str>) -> String {
    match label {
        Some(label) => format!("Using column {column} ({label})."),
        None => format!("Using column {column}."),
    }
}

/// Nobody matched
#[must_use]
pub fn nobody_matched(pending: &[String]) -> String {
    format!(
        "None of these are in the sheet: {}. Nothing was written. {RESTART_HINT}",
        pending.join(", ")
    )
}

/// Suggest the matched count as headcount
#[must_use]
pub fn confirm_count(matched: usize, requested: usize) -> String {
    format!("Found {matched} of {requested} in the sheet. Set the headcount to {matched}? (yes/no)")
}

/// Ask whether occupied cells may be overwritten
#[must_use]
pub fn confirm_override(column: ColumnRef, conflicts: &[Conflict]) -> String {
    let mut out = format!("These cells in column {column} already have values:\n");
    for conflict in conflicts {
        let _ = writeln!(out, "- {}: {}", conflict.identity, conflict.existing_value);
    }
    out.push_str("Overwrite them? (yes/no)");
    out
}

/// Outcome of the final write
#[must_use]
pub fn report(report: &WriteReport) -> String {
    let mut out = format!(
        "Done. Column {}: {} updated",
        report.column,
        report.updated.len()
    );
    if !report.updated.is_empty() {
        let _ = write!(out, " ({})", report.updated.join(", "));
    }
    out.push('.');
    if !report.skipped.is_empty() {
        let _ = write!(out, "\nLeft unchanged: {}.", report.skipped.join(", "));
    }
    if !report.unmatched.is_empty() {
        let _ = write!(out, "\nNot found in the sheet: {}.", report.unmatched.join(", "));
    }
    out
}

/// Forwarded poll loaded
#[must_use]
pub fn poll_loaded(record: &PollRecord) -> String {
    format!(
        "Poll \"{}\" with {} voter(s). {POLL_INTENT}",
        record.question(),
        record.voter_count()
    )
}

/// Per-option voter lists
#[must_use]
pub fn poll_view(record: &PollRecord) -> String {
    let mut out = format!("{}\n", record.question());
    for (index, option, voters) in record.tallies() {
        let names: Vec<&str> = voters.iter().map(String::as_str).collect();
        let listed = if names.is_empty() { "-".to_string() } else { names.join(", ") };
        let _ = writeln!(out, "{}. {} ({}): {}", index + 1, option, voters.len(), listed);
    }
    out.trim_end().to_string()
}

/// Ask which option holds the attendees
#[must_use]
pub fn choose_poll_option(record: &PollRecord) -> String {
    let mut out = String::from("Which option lists the attendees?\n");
    for (index, option, voters) in record.tallies() {
        let _ = writeln!(out, "{}. {} ({})", index + 1, option, voters.len());
    }
    out.push_str("Send the option number.");
    out
}

/// Option number re-prompt
#[must_use]
pub fn choose_poll_option_again(count: usize) -> String {
    format!("Please send an option number from 1 to {count}.")
}

/// Selected option has no voters
#[must_use]
pub fn poll_option_empty(option: &str) -> String {
    format!("Nobody voted for \"{option}\", so there is nothing to record. {RESTART_HINT}")
}

/// Forwarded poll is not one of ours
pub const UNKNOWN_POLL: &str = "I don't know that poll. Only polls I posted (and that are still recent) can be used.";

/// Poll posted
#[must_use]
pub fn poll_created(question: &str, options: usize) -> String {
    format!("Poll \"{question}\" posted with {options} options. Forward it back to me once people have voted.")
}

/// Unrecognised slash command
#[must_use]
pub fn unknown_command(name: &str) -> String {
    format!("Unknown command /{name}. Send /help for the list.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_names_the_bounds() {
        let text = column_out_of_range("A".parse().unwrap(), "F".parse().unwrap(), "GW".parse().unwrap());
        assert!(text.starts_with("Column A is outside the date columns (F to GW)."));
    }

    #[test]
    fn report_lists_each_group() {
        let text = report(&WriteReport {
            column: "F".parse().unwrap(),
            updated: vec!["@a".into(), "@b".into()],
            skipped: vec![],
            unmatched: vec!["@c".into()],
        });
        assert!(text.starts_with("Done. Column F: 2 updated (@a, @b)."));
        assert!(text.contains("Not found in the sheet: @c."));
        assert!(!text.contains("Left unchanged"));
    }

    #[test]
    fn choose_column_numbers_from_one() {
        let text = choose_column(&[
            ColumnCandidate::new("F".parse().unwrap(), "Sep 1"),
            ColumnCandidate::new("I".parse().unwrap(), "sep 1"),
        ]);
        assert!(text.contains("1. F (Sep 1)"));
        assert!(text.contains("2. I (sep 1)"));
    }

    #[test]
    fn poll_view_shows_voters() {
        let mut record = PollRecord::new("Sunday?", vec!["Yes".into(), "No".into()]).unwrap();
        record.apply_selection("@x", &[1]);

        let text = poll_view(&record);
        assert!(text.contains("1. Yes (0): -"));
        assert!(text.contains("2. No (1): @x"));
    }
}
