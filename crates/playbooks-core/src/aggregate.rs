//! Folding runtime fragments into a reply and trace entries.
//!
//! Aggregation is pure and synchronous: it reads a finite fragment sequence
//! once, never mutates it, and produces exactly one summarizing trace entry
//! per call. A sequence that fails part way keeps everything observed before
//! the failure; the failure is reported next to the partial reply.

use crate::types::{
    ResponseFragment, TraceEntry, INITIAL_GREETING_LABEL, USER_MESSAGE_LABEL,
};
use std::borrow::Borrow;
use std::convert::Infallible;
use std::fmt::Display;

/// Result of aggregating one runtime invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    /// Space-joined reply text, empty when no fragment carried a reply.
    pub reply: String,

    /// New trace entries: diagnostic notes first, summarizing entry last.
    pub entries: Vec<TraceEntry>,

    /// Error that ended the fragment sequence early, if any.
    pub failure: Option<String>,
}

impl Aggregate {
    /// The summarizing entry for this invocation.
    ///
    /// Always present for results of [`aggregate`]; `None` only for a
    /// hand-built value without entries.
    pub fn summary(&self) -> Option<&TraceEntry> {
        self.entries.last()
    }

    /// Whether the fragment sequence ended with an error.
    pub fn is_partial(&self) -> bool {
        self.failure.is_some()
    }
}

/// Aggregate a possibly failing fragment sequence.
///
/// `input` is the user text that triggered the invocation; `None` marks the
/// session's opening turn.
pub fn aggregate<I, F, E>(fragments: I, input: Option<&str>) -> Aggregate
where
    I: IntoIterator<Item = Result<F, E>>,
    F: Borrow<ResponseFragment>,
    E: Display,
{
    let mut replies: Vec<String> = Vec::new();
    let mut entries = Vec::new();
    let mut failure = None;

    for item in fragments {
        match item {
            Ok(fragment) => {
                let fragment = fragment.borrow();
                if let Some(text) = fragment.reply_text() {
                    replies.push(text.to_string());
                }
                if let Some(note) = &fragment.diagnostic_note {
                    entries.push(TraceEntry::note(note.clone()));
                }
            }
            Err(e) => {
                failure = Some(e.to_string());
                break;
            }
        }
    }

    let reply = replies.join(" ");
    let label = if input.is_some() {
        USER_MESSAGE_LABEL
    } else {
        INITIAL_GREETING_LABEL
    };

    let mut summary = TraceEntry::step(label, input, reply.clone());
    if let Some(err) = &failure {
        summary = summary.with_error(err.clone());
    }
    entries.push(summary);

    Aggregate {
        reply,
        entries,
        failure,
    }
}

/// Aggregate a fully materialized fragment slice.
pub fn aggregate_fragments(fragments: &[ResponseFragment], input: Option<&str>) -> Aggregate {
    aggregate(fragments.iter().map(Ok::<_, Infallible>), input)
}
