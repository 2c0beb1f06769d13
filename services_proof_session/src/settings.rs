//! Editor settings and the process-wide shorthand table

use crate::error::SettingsError;
use proof_editor_core::{
    SessionConfig, ShorthandTable, Tick, DEFAULT_DOUBLE_CLICK_WINDOW, DEFAULT_OBLIGATION_MARKER,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, OnceLock};

static SHORTHANDS: OnceLock<Arc<ShorthandTable>> = OnceLock::new();

/// Install the process-wide shorthand table
///
/// Only the first install takes effect; returns false if a table was
/// already in place.
pub fn install_shorthands(table: ShorthandTable) -> bool {
    let installed = SHORTHANDS.set(Arc::new(table)).is_ok();
    if !installed {
        tracing::warn!("shorthand table already installed; ignoring replacement");
    }
    installed
}

/// The process-wide shorthand table, the built-in one unless another was
/// installed first
pub fn shorthands() -> Arc<ShorthandTable> {
    SHORTHANDS
        .get_or_init(|| Arc::new(ShorthandTable::builtin()))
        .clone()
}

/// User-facing editor settings (JSON)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Second-click window in logical time units
    pub double_click_window: Tick,
    /// Token marking an unfinished obligation
    pub obligation_marker: String,
    /// Ordered `[token, symbol]` pairs replacing the built-in table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shorthands: Option<Vec<(String, String)>>,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            double_click_window: DEFAULT_DOUBLE_CLICK_WINDOW,
            obligation_marker: DEFAULT_OBLIGATION_MARKER.to_string(),
            shorthands: None,
        }
    }
}

impl EditorSettings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        match std::fs::read_to_string(path) {
            Ok(json) => Self::from_json(&json),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no settings file, using defaults");
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.double_click_window == 0 {
            return Err(SettingsError::ZeroWindow);
        }
        if self.obligation_marker.is_empty() {
            return Err(SettingsError::EmptyMarker);
        }
        Ok(())
    }

    /// The table these settings describe, without installing it
    pub fn shorthand_table(&self) -> ShorthandTable {
        match &self.shorthands {
            Some(pairs) => ShorthandTable::from_pairs(pairs.iter().cloned()),
            None => ShorthandTable::builtin(),
        }
    }

    /// Install the configured table process-wide and build the session
    /// configuration on top of whichever table is in effect
    pub fn install(&self) -> SessionConfig {
        if self.shorthands.is_some() {
            install_shorthands(self.shorthand_table());
        }
        self.session_config(shorthands())
    }

    /// Session configuration using an explicit table
    pub fn session_config(&self, shorthands: Arc<ShorthandTable>) -> SessionConfig {
        SessionConfig {
            obligation_marker: self.obligation_marker.clone(),
            double_click_window: self.double_click_window,
            shorthands,
        }
    }
}
