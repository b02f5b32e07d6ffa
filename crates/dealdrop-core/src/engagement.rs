// ── Deal card engagement state ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Save toggle: `Unsaved -> Saved -> Unsaved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SaveState {
    Unsaved,
    Saved,
}

/// Result of a like toggle after reconciling with the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeOutcome {
    /// Whether the current user likes the deal according to the server.
    pub liked: bool,
    pub likes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    pub(crate) fn as_delta(self) -> i8 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }
}

/// Result of a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteOutcome {
    pub direction: VoteDirection,
    pub score: i64,
}
