//! Prompt shaping for the chat relay.
//!
//! Two pure stages wrap the upstream call:
//!
//! 1. [`classify`] picks a [`ResponseMode`] for the raw user message and
//!    rewrites it into the prompt actually sent upstream.
//! 2. [`build_reply`] cleans the upstream text (LaTeX `\boxed{..}` removal)
//!    and tags it with the mode chosen in step 1.
//!
//! Nothing here performs I/O or holds state, so both stages can be called
//! from any number of request handlers concurrently.

mod classify;
mod format;
mod mode;

pub use classify::{classify, shape_prompt, ClassificationResult};
pub use format::{build_reply, strip_boxed, ChatReply};
pub use mode::ResponseMode;
