//! Logging setup for the proof editor host.
//!
//! Events go to stderr so stdout carries only the rendered session.
//!
//! ## Environment Variables
//!
//! 1. **`PROOFEDIT_LOG`** (highest priority) - editor-specific logging control
//! 2. **`RUST_LOG`** - standard tracing environment variable
//! 3. **Default** - `warn` globally, `info` for the editor crates

use std::env;
use tracing_subscriber::{fmt, EnvFilter};

pub type LogError = Box<dyn std::error::Error + Send + Sync>;

const CRATES: &[&str] = &["proof_editor_core", "services_proof_session", "proofeditd"];

/// Initialize logging.
///
/// Fails if a global subscriber is already installed.
pub fn init() -> Result<(), LogError> {
    fmt()
        .with_env_filter(create_filter())
        .with_writer(std::io::stderr)
        .try_init()
}

/// Initialize logging for tests.
///
/// Safe to call from every test; only the first call installs a
/// subscriber.
#[allow(clippy::let_unit_value)]
pub fn test() {
    let _ = fmt()
        .with_env_filter(create_filter())
        .with_test_writer()
        .try_init();
}

/// Filter from `PROOFEDIT_LOG` > `RUST_LOG` > defaults.
fn create_filter() -> EnvFilter {
    if let Ok(value) = env::var("PROOFEDIT_LOG") {
        return expand_proofedit_log(&value);
    }
    if let Ok(value) = env::var("RUST_LOG") {
        return EnvFilter::new(value);
    }
    EnvFilter::new(default_directives())
}

fn default_directives() -> String {
    with_level("info")
}

/// `PROOFEDIT_LOG=debug` becomes `warn,proof_editor_core=debug,...`;
/// anything with module syntax is used as-is.
fn expand_proofedit_log(value: &str) -> EnvFilter {
    if value.contains('=') || value.contains(':') || value.contains(',') {
        return EnvFilter::new(value);
    }
    EnvFilter::new(with_level(value))
}

fn with_level(level: &str) -> String {
    let mut directives = String::from("warn");
    for name in CRATES {
        directives.push_str(&format!(",{}={}", name, level));
    }
    directives
}
