//! Error types for the rules adapter and the move service client.

/// Errors raised by the rules engine adapter
#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    /// Notation string that fits none of the accepted grammars
    #[error("Unrecognised move notation: {notation}")]
    Unparseable { notation: String },

    /// Well-formed move that is not legal in the current position
    #[error("Illegal move: {mv}")]
    Illegal { mv: String },

    /// Position string that could not be loaded
    #[error("Invalid FEN '{fen}': {message}")]
    InvalidFen { fen: String, message: String },
}

/// Errors surfaced by a move service. The session treats them all alike;
/// the variants only feed the diagnostic log.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Move service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Move service returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Move service response carried no move")]
    MissingMove,

    #[error("Move service response could not be decoded: {0}")]
    Malformed(String),
}

pub type RulesResult<T> = Result<T, RulesError>;
