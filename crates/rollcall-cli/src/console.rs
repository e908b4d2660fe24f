//! Console transport and line grammar
//!
//! Lines starting with `:` are directives that stand in for platform
//! events; anything else is operator text.
//!
//! ```text
//! :vote <poll> <voter> [option...]   option numbers are 1-based
//! :forward <poll>
//! :dump
//! :quit
//! ```

use async_trait::async_trait;
use parking_lot::Mutex;
use rollcall_core::{ChatTransport, ConversationId, InboundEvent, TransportError};
use rollcall_poll::{PollId, VoteChange};
use std::io::Write;

/// Console input errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsoleError {
    /// Directive is missing an argument
    #[error(":{directive} needs {what}")]
    MissingArgument {
        /// Directive name
        directive: &'static str,
        /// Missing argument
        what: &'static str,
    },

    /// Option number is not a positive integer
    #[error("option numbers start at 1, got {0:?}")]
    BadOption(String),

    /// Unknown directive
    #[error("unknown directive :{0} (try :vote, :forward, :dump or :quit)")]
    UnknownDirective(String),
}

/// One parsed console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleLine {
    /// Nothing to do
    Blank,
    /// Operator text
    Text(String),
    /// Vote change with zero-based indices
    Vote {
        /// Poll voted on
        poll: PollId,
        /// Voter handle
        voter: String,
        /// Zero-based selection
        selected: Vec<usize>,
    },
    /// Forward a poll into the conversation
    Forward(PollId),
    /// Print the sheet
    Dump,
    /// Stop reading input
    Quit,
}

impl ConsoleLine {
    /// Engine event for this line, if it is one
    #[must_use]
    pub fn into_event(self, conversation: &ConversationId) -> Option<InboundEvent> {
        match self {
            Self::Text(text) => Some(InboundEvent::text(conversation.clone(), text)),
            Self::Vote { poll, voter, selected } => Some(InboundEvent::vote(
                conversation.clone(),
                VoteChange::new(poll, voter, selected),
            )),
            Self::Forward(poll) => Some(InboundEvent::forwarded(conversation.clone(), poll)),
            Self::Blank | Self::Dump | Self::Quit => None,
        }
    }
}

/// Parse one console line
///
/// # Errors
/// `ConsoleError` for malformed directives
pub fn parse_line(line: &str) -> Result<ConsoleLine, ConsoleError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(ConsoleLine::Blank);
    }
    let Some(directive) = trimmed.strip_prefix(':') else {
        return Ok(ConsoleLine::Text(trimmed.to_string()));
    };

    let mut words = directive.split_whitespace();
    let name = words.next().unwrap_or_default().to_lowercase();
    match name.as_str() {
        "vote" => {
            let poll = words.next().ok_or(ConsoleError::MissingArgument {
                directive: "vote",
                what: "a poll id",
            })?;
            let voter = words.next().ok_or(ConsoleError::MissingArgument {
                directive: "vote",
                what: "a voter",
            })?;
            let selected = words
                .map(|word| match word.parse::<usize>() {
                    Ok(n) if n >= 1 => Ok(n - 1),
                    _ => Err(ConsoleError::BadOption(word.to_string())),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ConsoleLine::Vote {
                poll: PollId::new(poll),
                voter: voter.to_string(),
                selected,
            })
        }
        "forward" => {
            let poll = words.next().ok_or(ConsoleError::MissingArgument {
                directive: "forward",
                what: "a poll id",
            })?;
            Ok(ConsoleLine::Forward(PollId::new(poll)))
        }
        "dump" => Ok(ConsoleLine::Dump),
        "quit" | "q" | "exit" => Ok(ConsoleLine::Quit),
        _ => Err(ConsoleError::UnknownDirective(name)),
    }
}

/// Transport printing replies and polls to a writer
pub struct ConsoleTransport<W> {
    out: Mutex<W>,
}

impl ConsoleTransport<std::io::Stdout> {
    /// Transport over standard output
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ConsoleTransport<W> {
    /// Transport over `out`
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    /// Recover the writer
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    fn emit(&self, text: &str) -> Result<(), std::io::Error> {
        let mut out = self.out.lock();
        writeln!(out, "{text}")?;
        out.flush()
    }
}

#[async_trait]
impl<W: Write + Send + 'static> ChatTransport for ConsoleTransport<W> {
    async fn deliver(&self, conversation: &ConversationId, text: &str) -> Result<(), TransportError> {
        let framed: String = text
            .lines()
            .map(|line| format!("[{conversation}] bot> {line}"))
            .collect::<Vec<_>>()
            .join("\n");
        self.emit(&framed)
            .map_err(|e| TransportError::Delivery(e.to_string()))
    }

    async fn create_poll(
        &self,
        conversation: &ConversationId,
        question: &str,
        options: &[String],
    ) -> Result<PollId, TransportError> {
        let id = PollId::new(ulid::Ulid::new().to_string());
        let mut text = format!("[{conversation}] poll {id}: {question}");
        for (n, option) in options.iter().enumerate() {
            text.push_str(&format!("\n    {}. {option}", n + 1));
        }
        self.emit(&text)
            .map_err(|e| TransportError::PollCreation(e.to_string()))?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn text_and_blank_lines() {
        assert_eq!(parse_line("   "), Ok(ConsoleLine::Blank));
        assert_eq!(parse_line(" /start "), Ok(ConsoleLine::Text("/start".into())));
    }

    #[test]
    fn vote_indices_become_zero_based() {
        assert_eq!(
            parse_line(":vote p1 @x 2"),
            Ok(ConsoleLine::Vote {
                poll: PollId::new("p1"),
                voter: "@x".into(),
                selected: vec![1],
            })
        );
        assert_eq!(
            parse_line(":vote p1 @x"),
            Ok(ConsoleLine::Vote {
                poll: PollId::new("p1"),
                voter: "@x".into(),
                selected: vec![],
            })
        );
    }

    #[test]
    fn malformed_directives() {
        assert_eq!(parse_line(":vote p1 @x 0"), Err(ConsoleError::BadOption("0".into())));
        assert!(matches!(parse_line(":vote"), Err(ConsoleError::MissingArgument { .. })));
        assert!(matches!(parse_line(":forward"), Err(ConsoleError::MissingArgument { .. })));
        assert_eq!(parse_line(":frob"), Err(ConsoleError::UnknownDirective("frob".into())));
    }

    #[test]
    fn directives_to_events() {
        let conversation = ConversationId::new("console");
        let event = parse_line(":forward p9").unwrap().into_event(&conversation).unwrap();
        assert_eq!(event, InboundEvent::forwarded("console", "p9"));
        assert!(parse_line(":dump").unwrap().into_event(&conversation).is_none());
        assert_eq!(parse_line(":q"), Ok(ConsoleLine::Quit));
    }

    #[tokio::test]
    async fn transport_frames_output() {
        let transport = ConsoleTransport::new(Vec::new());
        let conversation = ConversationId::new("c");

        transport.deliver(&conversation, "one\ntwo").await.unwrap();
        let id = transport
            .create_poll(&conversation, "Sunday?", &["Yes".into(), "No".into()])
            .await
            .unwrap();

        let written = String::from_utf8(transport.into_inner()).unwrap();
        assert!(written.starts_with("[c] bot> one\n[c] bot> two\n"));
        assert!(written.contains(&format!("poll {id}: Sunday?")));
        assert!(written.contains("    2. No"));
    }
}
