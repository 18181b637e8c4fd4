//! Per-instance engine configuration.

use bitflags::bitflags;

use crate::selection::SelectionMode;

/// Configuration fixed for the lifetime of a [`TreeEngine`](crate::TreeEngine).
///
/// Switching modes means building a new engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeConfig {
    /// Selection policy.
    pub selection_mode: SelectionMode,
    /// At most one root-level folder may be open at a time.
    pub single_root_expansion: bool,
    /// Cascading mode only: mount with every node selected.
    pub all_initially_selected: bool,
    /// Whether the engine keeps state between actions. When `false` the
    /// host stores each [`EngineState`](crate::EngineState) and feeds it
    /// back through [`TreeEngine::reduce`](crate::TreeEngine::reduce).
    pub owns_state: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            selection_mode: SelectionMode::None,
            single_root_expansion: false,
            all_initially_selected: false,
            owns_state: true,
        }
    }
}

impl TreeConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the selection policy.
    #[must_use]
    pub fn selection_mode(mut self, mode: SelectionMode) -> Self {
        self.selection_mode = mode;
        self
    }

    /// Limit expansion to a single root-level folder.
    #[must_use]
    pub fn single_root_expansion(mut self, enabled: bool) -> Self {
        self.single_root_expansion = enabled;
        self
    }

    /// Mount with every node selected (cascading mode only).
    #[must_use]
    pub fn all_initially_selected(mut self, enabled: bool) -> Self {
        self.all_initially_selected = enabled;
        self
    }

    /// Choose whether the engine or the host owns state.
    #[must_use]
    pub fn owns_state(mut self, owns: bool) -> Self {
        self.owns_state = owns;
        self
    }

    /// Actions this configuration permits.
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        let mut caps = Capabilities::EXPAND | Capabilities::COLLAPSE | Capabilities::COLLAPSE_ALL;
        if !self.single_root_expansion {
            caps |= Capabilities::EXPAND_ALL;
        }
        let mode = self.selection_mode;
        caps.set(Capabilities::SELECT, mode.is_enabled());
        caps.set(Capabilities::UNSELECT, mode.supports_unselect());
        caps.set(Capabilities::SELECT_ALL, mode.supports_select_all());
        caps.set(Capabilities::UNSELECT_ALL, mode.supports_select_all());
        caps
    }
}

bitflags! {
    /// Affordances a host should offer for a given configuration.
    ///
    /// Hosts hide controls whose flag is absent (for example the "expand
    /// all" button under single-root expansion).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Capabilities: u8 {
        const EXPAND       = 0b0000_0001;
        const COLLAPSE     = 0b0000_0010;
        const EXPAND_ALL   = 0b0000_0100;
        const COLLAPSE_ALL = 0b0000_1000;
        const SELECT       = 0b0001_0000;
        const UNSELECT     = 0b0010_0000;
        const SELECT_ALL   = 0b0100_0000;
        const UNSELECT_ALL = 0b1000_0000;
    }
}
