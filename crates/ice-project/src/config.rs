//! Store configuration

use ice_doc::CURRENT_VERSION;
use serde::{Deserialize, Serialize};

/// Configuration for a [`ProjectStore`](crate::ProjectStore)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Schema tag documents are expected to carry
    pub schema_version: String,
    /// Board currently selected in the shell
    pub active_board: String,
    /// Indent saved documents
    pub pretty: bool,
    /// Decimal places kept for pan and zoom, capped at 15
    pub state_precision: u32,
    /// Language generated to discover a block's included files
    pub generator_target: String,
}

impl StoreConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With active board
    #[inline]
    #[must_use]
    pub fn with_active_board(mut self, board: impl Into<String>) -> Self {
        self.active_board = board.into();
        self
    }

    /// With pretty printing on or off
    #[inline]
    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// With view state precision
    #[inline]
    #[must_use]
    pub fn with_state_precision(mut self, decimals: u32) -> Self {
        self.state_precision = decimals;
        self
    }

    /// With generator target language
    #[inline]
    #[must_use]
    pub fn with_generator_target(mut self, target: impl Into<String>) -> Self {
        self.generator_target = target.into();
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_VERSION.to_string(),
            active_board: String::new(),
            pretty: true,
            state_precision: 4,
            generator_target: "verilog".to_string(),
        }
    }
}
