//! Post-processing of upstream replies.

use std::sync::LazyLock;

use regex::Regex;

use crate::mode::ResponseMode;

static BOXED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\boxed\{(.*?)\}").expect("invalid boxed regex"));

/// Reply handed back to the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub text: String,
    /// Mode of the originating request; the reply itself is never classified.
    pub format_tag: ResponseMode,
}

impl ChatReply {
    /// Package `raw_reply` without any cleanup.
    pub fn verbatim(mode: ResponseMode, raw_reply: impl Into<String>) -> Self {
        Self {
            text: raw_reply.into(),
            format_tag: mode,
        }
    }
}

/// Replace every `\boxed{x}` with `x`.
///
/// The capture is non-greedy and stops at the first closing brace, so nested
/// braces inside a box are cut short.
pub fn strip_boxed(raw_reply: &str) -> String {
    BOXED.replace_all(raw_reply, "${1}").into_owned()
}

/// Strip boxed notation from `raw_reply` and tag it with `mode`.
pub fn build_reply(mode: ResponseMode, raw_reply: &str) -> ChatReply {
    ChatReply {
        text: strip_boxed(raw_reply),
        format_tag: mode,
    }
}
