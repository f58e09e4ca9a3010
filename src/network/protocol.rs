use crate::core::Difficulty;
use serde::{Deserialize, Serialize};

/// POST body for `{base}/move`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub fen: String,
    pub elo: Difficulty,
}

/// Success body. The service echoes the FEN back; `error` is only set on
/// non-success responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MoveResponse {
    #[serde(default, rename = "move")]
    pub mv: Option<String>,
    #[serde(default)]
    pub fen: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
