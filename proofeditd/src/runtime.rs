//! # Host Runtime
//!
//! The event loop that replays a script against one proof tab.

use crate::input_script::{InputScript, InputScriptError, ScriptedInput};
use crate::service::LocalStepService;
use proof_editor_core::{SessionSnapshot, TabId, Tick};
use services_proof_session::{
    EditorAction, EditorSettings, JsonFileTheoryStore, ProofEditor, SessionError,
};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Host runtime error types
#[derive(Debug, Error)]
pub enum HostRuntimeError {
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Script error: {0}")]
    Script(#[from] InputScriptError),

    #[error("Invalid theory path: {}", .0.display())]
    InvalidTheoryPath(PathBuf),
}

/// Host runtime configuration
#[derive(Debug, Clone)]
pub struct HostRuntimeConfig {
    /// Theory file, `<dir>/<name>.json`
    pub theory_path: PathBuf,
    /// Theorem to open
    pub item: String,
    /// Optional input script
    pub script: Option<String>,
    /// Editor settings
    pub settings: EditorSettings,
    /// Maximum steps to run (0 = unlimited)
    pub max_steps: usize,
}

impl HostRuntimeConfig {
    pub fn new(theory_path: impl Into<PathBuf>, item: impl Into<String>) -> Self {
        Self {
            theory_path: theory_path.into(),
            item: item.into(),
            script: None,
            settings: EditorSettings::default(),
            max_steps: 0,
        }
    }
}

/// Host runtime
pub struct HostRuntime {
    config: HostRuntimeConfig,
    editor: ProofEditor,
    store: JsonFileTheoryStore,
    service: LocalStepService,
    script: Option<InputScript>,
    tab: TabId,
    /// Logical clock, advanced by `wait`
    clock: Tick,
    steps: usize,
}

impl HostRuntime {
    /// Creates a runtime with the configured theorem open
    pub fn new(config: HostRuntimeConfig) -> Result<Self, HostRuntimeError> {
        let (root, theory) = split_theory_path(&config.theory_path)?;
        let store = JsonFileTheoryStore::new(root);
        let mut service = LocalStepService::new(config.settings.obligation_marker.clone());

        let script = config
            .script
            .as_deref()
            .map(InputScript::from_text)
            .transpose()?;

        let mut editor = ProofEditor::with_settings(&config.settings);
        let tab = editor.open_from_store(&store, &theory, &config.item)?;
        editor.run_pending(&mut service)?;
        tracing::info!(%tab, theory = %theory, item = %config.item, "proof tab opened");

        Ok(Self {
            config,
            editor,
            store,
            service,
            script,
            tab,
            clock: 0,
            steps: 0,
        })
    }

    /// Runs the event loop
    ///
    /// Returns when the script is exhausted or max steps is reached.
    pub fn run(&mut self) -> Result<(), HostRuntimeError> {
        loop {
            if self.config.max_steps > 0 && self.steps >= self.config.max_steps {
                break;
            }
            let Some(input) = self.script.as_mut().and_then(InputScript::next_input) else {
                break;
            };
            self.step(input)?;
            self.steps += 1;
        }
        Ok(())
    }

    /// Executes one scripted input and resolves the requests it issued
    pub fn step(&mut self, input: ScriptedInput) -> Result<(), HostRuntimeError> {
        match input {
            ScriptedInput::Wait(ticks) => {
                self.clock = self.clock.saturating_add(ticks);
                self.editor.tick(self.tab, self.clock)?;
            }
            ScriptedInput::Save => {
                self.editor.save_proof(&mut self.store, self.tab)?;
            }
            other => {
                if let Some(event) = other.to_input_event(self.clock) {
                    let action = self.editor.process_input(self.tab, event)?;
                    if let EditorAction::Rejected(reason) = action {
                        tracing::debug!(tab = %self.tab, %reason, "scripted input dropped");
                    }
                }
            }
        }

        for (tab, outcome) in self.editor.run_pending(&mut self.service)? {
            tracing::debug!(%tab, ?outcome, "step request resolved");
        }
        Ok(())
    }

    /// Renders the open tab
    pub fn render(&self) -> Result<String, HostRuntimeError> {
        Ok(self.editor.render(self.tab)?)
    }

    pub fn snapshot(&self) -> Result<SessionSnapshot, HostRuntimeError> {
        Ok(self.editor.session(self.tab)?.snapshot())
    }

    pub fn tab(&self) -> TabId {
        self.tab
    }

    pub fn editor(&self) -> &ProofEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut ProofEditor {
        &mut self.editor
    }

    pub fn step_count(&self) -> usize {
        self.steps
    }

    pub fn clock(&self) -> Tick {
        self.clock
    }
}

/// Split `<dir>/<name>.json` into the store root and theory name
fn split_theory_path(path: &Path) -> Result<(PathBuf, String), HostRuntimeError> {
    let invalid = || HostRuntimeError::InvalidTheoryPath(path.to_path_buf());
    if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
        return Err(invalid());
    }
    let name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .ok_or_else(invalid)?;
    let root = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((root, name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use services_proof_session::StoreError;

    #[test]
    fn test_split_theory_path() {
        let (root, name) = split_theory_path(Path::new("theories/logic_base.json")).unwrap();
        assert_eq!(root, PathBuf::from("theories"));
        assert_eq!(name, "logic_base");

        let (root, _) = split_theory_path(Path::new("logic_base.json")).unwrap();
        assert_eq!(root, PathBuf::from("."));

        assert!(matches!(
            split_theory_path(Path::new("logic_base.txt")),
            Err(HostRuntimeError::InvalidTheoryPath(_))
        ));
    }

    #[test]
    fn test_missing_theory_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = HostRuntimeConfig::new(dir.path().join("absent.json"), "thm");
        assert!(matches!(
            HostRuntime::new(config),
            Err(HostRuntimeError::Session(SessionError::Store(
                StoreError::TheoryNotFound(_)
            )))
        ));
    }
}
