//! Error type for tree state transitions.

use thiserror::Error;

use crate::selection::SelectionMode;

pub type Result<T> = std::result::Result<T, TreeStateError>;

/// Failures raised by [`TreeEngine`](crate::TreeEngine).
///
/// Every variant is a contract violation by the calling layer. Ordinary
/// no-ops (unknown ids, re-expanding an open folder) never produce an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeStateError {
    /// The action is structurally incompatible with the configured selection mode.
    #[error("action `{action}` is not supported in {mode:?} selection mode")]
    Configuration {
        action: &'static str,
        mode: SelectionMode,
    },

    /// The engine was configured to leave state ownership with the host.
    #[error("engine does not own its state; use `reduce` with host-held state")]
    StateNotOwned,
}

impl TreeStateError {
    #[must_use]
    pub(crate) fn configuration(action: &'static str, mode: SelectionMode) -> Self {
        Self::Configuration { action, mode }
    }

    /// Whether this is a selection-mode configuration error.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_error_names_action_and_mode() {
        let err = TreeStateError::configuration("select_all", SelectionMode::Single);
        assert!(err.is_configuration());
        assert_eq!(
            err.to_string(),
            "action `select_all` is not supported in Single selection mode"
        );
    }

    #[test]
    fn state_not_owned_is_not_configuration() {
        assert!(!TreeStateError::StateNotOwned.is_configuration());
    }
}
