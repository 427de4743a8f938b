//! Error types for the connect-N arena

use thiserror::Error;

use crate::game::{Mark, StateKey};

/// Main error type for the crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("player '{player}' has winning reward {reward} equal to the draw value; search direction is undefined")]
    AmbiguousReward { player: String, reward: Mark },

    #[error("invalid number of players {0} (a game needs exactly 2)")]
    InvalidPlayerCount(usize),

    #[error("more than one player uses mark {mark}")]
    DuplicateMark { mark: Mark },

    #[error("invalid board geometry: {message}")]
    InvalidGeometry { message: String },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("illegal move: position {position} is occupied or not on the board")]
    IllegalMove { position: usize },

    #[error("cannot unmake move at position {position}: the most recent move was {last:?}")]
    UnmakeOutOfOrder { position: usize, last: Option<usize> },

    #[error("no policy entry for state {state}")]
    PolicyMiss { state: StateKey },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// In-game rule violations can be retried with a different move; everything
    /// else aborts the operation that raised it.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::IllegalMove { .. })
    }

    /// Wraps an I/O failure with what was being attempted.
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            operation: operation.into(),
            source,
        }
    }
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::io("IO operation", source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn illegal_move_is_recoverable() {
        assert!(Error::IllegalMove { position: 4 }.is_recoverable());
        assert!(!Error::InvalidPlayerCount(3).is_recoverable());
        assert!(!Error::UnmakeOutOfOrder {
            position: 1,
            last: Some(2)
        }
        .is_recoverable());
    }

    #[test]
    fn display_messages() {
        let err = Error::AmbiguousReward {
            player: "Neutral".to_string(),
            reward: 0,
        };
        assert_eq!(
            err.to_string(),
            "player 'Neutral' has winning reward 0 equal to the draw value; search direction is undefined"
        );

        let err = Error::UnmakeOutOfOrder {
            position: 3,
            last: None,
        };
        assert_eq!(
            err.to_string(),
            "cannot unmake move at position 3: the most recent move was None"
        );

        let err = Error::PolicyMiss {
            state: StateKey::from(&[1, 0, -1][..]),
        };
        assert_eq!(err.to_string(), "no policy entry for state (1, 0, -1)");
    }
}
