//! Command outcome reporting.

use serde::{Deserialize, Serialize};

/// The reversibility of an applied command.
///
/// Commands that delete folders or imported files from disk can restore
/// their database rows on revert but not the filesystem content. Callers
/// receive that asymmetry explicitly rather than discovering it later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    /// Revert restores every observable effect of the command.
    FullyReversible,
    /// Revert restores the database rows only; the named side effect
    /// remains.
    PartiallyReversible {
        /// What revert cannot restore.
        reason: String,
    },
}

impl CommandOutcome {
    /// Create a partially reversible outcome with the given reason.
    pub fn partial(reason: impl Into<String>) -> Self {
        Self::PartiallyReversible {
            reason: reason.into(),
        }
    }

    /// Whether revert restores everything the command changed.
    pub fn is_fully_reversible(&self) -> bool {
        matches!(self, Self::FullyReversible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_outcome() {
        let outcome = CommandOutcome::partial("files removed from disk");
        assert!(!outcome.is_fully_reversible());
        match outcome {
            CommandOutcome::PartiallyReversible { reason } => {
                assert_eq!(reason, "files removed from disk");
            }
            _ => panic!("expected partial outcome"),
        }
    }
}
