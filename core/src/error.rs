//! Error taxonomy shared by every granite crate.

use thiserror::Error;

/// Errors raised while building or querying granite models.
#[derive(Debug, Error)]
pub enum GraniteError {
    /// Structurally impossible input (empty label, zero component length, ...)
    #[error("Invalid argument: {reason}")]
    InvalidArgument {
        /// What was wrong with the argument
        reason: String,
    },

    /// A training row violates the row invariants
    #[error("Invalid training row {id}: {reason}")]
    InvalidTrainingRow {
        /// Id of the offending row
        id: String,
        /// Which invariant was violated
        reason: String,
    },

    /// No training rows to build from
    #[error("Training set is empty")]
    EmptyTrainingSet,

    /// Filtering removed every word of one or more classifications
    #[error("Training set over-filtered, no words left for: {}", labels.join(", "))]
    OverFiltered {
        /// Classifications left without any word
        labels: Vec<String>,
    },

    /// A stemming function returned a different number of stems than words
    #[error("Stemming function returned {actual} stems for {expected} words")]
    StemmingContract {
        /// Number of words handed to the stemmer
        expected: usize,
        /// Number of stems it returned
        actual: usize,
    },

    /// Phrase tree internal state is inconsistent
    #[error("Corrupt phrase tree: {reason}")]
    CorruptPhraseTree {
        /// Which invariant was broken
        reason: String,
    },

    /// Insert attempted on a frozen phrase tree
    #[error("Phrase tree is immutable")]
    ImmutablePhraseTree,

    /// A line of training text could not be decoded
    #[error("Malformed training text on line {line}: {reason}")]
    MalformedTrainingText {
        /// 1-based line number
        line: usize,
        /// Decoder message
        reason: String,
    },

    /// Configuration could not be parsed
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O failure from a file collaborator
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl GraniteError {
    /// Shorthand for [`GraniteError::InvalidArgument`].
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        GraniteError::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`GraniteError::InvalidTrainingRow`].
    pub fn invalid_row(id: impl ToString, reason: impl Into<String>) -> Self {
        GraniteError::InvalidTrainingRow {
            id: id.to_string(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`GraniteError::CorruptPhraseTree`].
    pub fn corrupt(reason: impl Into<String>) -> Self {
        GraniteError::CorruptPhraseTree {
            reason: reason.into(),
        }
    }
}

/// Result type for granite operations
pub type GraniteResult<T> = Result<T, GraniteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn over_filtered_names_every_label() {
        let err = GraniteError::OverFiltered {
            labels: vec!["ham".into(), "spam".into()],
        };
        assert_eq!(
            err.to_string(),
            "Training set over-filtered, no words left for: ham, spam"
        );
    }

    #[test]
    fn row_errors_carry_the_id() {
        let err = GraniteError::invalid_row(300, "duplicate value");
        match err {
            GraniteError::InvalidTrainingRow { id, reason } => {
                assert_eq!(id, "300");
                assert_eq!(reason, "duplicate value");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn io_errors_pass_through() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.txt");
        let err: GraniteError = io.into();
        assert_eq!(err.to_string(), "missing.txt");
    }
}
