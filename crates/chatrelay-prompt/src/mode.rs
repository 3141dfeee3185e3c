//! The three response modes a message can be classified into.

use serde::Serialize;
use strum::{AsRefStr, Display, EnumString};

/// How a chat message is treated: drives prompt shaping and the `format`
/// tag returned to the client.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ResponseMode {
    /// Step-by-step worked solution.
    Math,
    /// Numbered list, one point per line.
    List,
    /// Plain pass-through.
    Text,
}
