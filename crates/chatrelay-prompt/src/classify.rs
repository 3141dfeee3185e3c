//! Keyword / pattern classifier for inbound chat messages.

use std::sync::LazyLock;

use regex::Regex;

use crate::mode::ResponseMode;

const LIST_KEYWORDS: [&str; 5] = ["list", "points", "bullets", "steps", "numbered"];

const MATH_KEYWORDS: [&str; 10] = [
    "solve", "calculate", "equation", "math", "+", "-", "*", "/", "^", "=",
];

/// `<digits><operator><digits>`, whitespace around the operator optional.
static ARITHMETIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\s*[-+*/^=]\s*\d+").expect("invalid arithmetic regex"));

const MATH_PREFIX: &str =
    "Explain how to solve this problem step by step with proper mathematical reasoning: ";
const MATH_SUFFIX: &str = "\n\nPresent the solution with each step clearly numbered and explained.";
const LIST_SUFFIX: &str =
    "\n\nProvide the response as a clear numbered list with each point on a new line.";

/// Outcome of [`classify`]: the chosen mode and the prompt to send upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    pub mode: ResponseMode,
    /// Always contains the original message verbatim.
    pub shaped_prompt: String,
}

/// Classify `message` and shape the upstream prompt for it.
///
/// Math intent wins over list intent; a message with neither is passed
/// through untouched. The caller guarantees `message` is non-empty.
pub fn classify(message: &str) -> ClassificationResult {
    let mode = detect_mode(message);
    ClassificationResult {
        mode,
        shaped_prompt: shape_prompt(mode, message),
    }
}

/// Wrap `message` in the instructions for `mode`.
pub fn shape_prompt(mode: ResponseMode, message: &str) -> String {
    match mode {
        ResponseMode::Math => format!("{MATH_PREFIX}{message}{MATH_SUFFIX}"),
        ResponseMode::List => format!("{message}{LIST_SUFFIX}"),
        ResponseMode::Text => message.to_owned(),
    }
}

fn detect_mode(message: &str) -> ResponseMode {
    let lowered = message.to_lowercase();
    let wants_list = has_list_intent(&lowered);
    let wants_math = has_math_intent(&lowered, message);

    if wants_math {
        ResponseMode::Math
    } else if wants_list {
        ResponseMode::List
    } else {
        ResponseMode::Text
    }
}

fn has_list_intent(lowered: &str) -> bool {
    LIST_KEYWORDS.iter().any(|k| lowered.contains(k))
}

fn has_math_intent(lowered: &str, original: &str) -> bool {
    MATH_KEYWORDS.iter().any(|k| lowered.contains(k)) || ARITHMETIC.is_match(original)
}
