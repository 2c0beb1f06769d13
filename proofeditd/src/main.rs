//! # proofeditd
//!
//! Opens one theorem from a theory file, replays an input script against it
//! and prints the resulting proof view.

use proofeditd::{logging, HostRuntime, HostRuntimeConfig};
use services_proof_session::EditorSettings;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

enum Invocation {
    Run(HostRuntimeConfig),
    Help,
}

fn main() -> ExitCode {
    let mut args = env::args();
    let program = args.next().unwrap_or_else(|| "proofeditd".to_string());

    let config = match parse_args(args) {
        Ok(Invocation::Run(config)) => config,
        Ok(Invocation::Help) => {
            print_usage(&program);
            return ExitCode::SUCCESS;
        }
        Err(message) => {
            eprintln!("error: {}", message);
            print_usage(&program);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init() {
        eprintln!("logging disabled: {}", e);
    }

    let view = HostRuntime::new(config).and_then(|mut runtime| {
        runtime.run()?;
        runtime.render()
    });
    match view {
        Ok(view) => {
            print!("{}", view);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "proof replay failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Invocation, String> {
    let mut theory: Option<PathBuf> = None;
    let mut item: Option<String> = None;
    let mut script: Option<String> = None;
    let mut settings = EditorSettings::default();
    let mut max_steps = 0;

    while let Some(flag) = args.next() {
        let mut value = || {
            args.next()
                .ok_or_else(|| format!("{} expects a value", flag))
        };
        match flag.as_str() {
            "-t" | "--theory" => theory = Some(PathBuf::from(value()?)),
            "-i" | "--item" => item = Some(value()?),
            "-s" | "--script" => {
                let path = value()?;
                let text = fs::read_to_string(&path)
                    .map_err(|e| format!("cannot read script {}: {}", path, e))?;
                script = Some(text);
            }
            "--settings" => {
                let path = value()?;
                settings = EditorSettings::load(Path::new(&path))
                    .map_err(|e| format!("cannot load settings {}: {}", path, e))?;
            }
            "--max-steps" => {
                let raw = value()?;
                max_steps = raw
                    .parse()
                    .map_err(|_| format!("--max-steps expects a number, got '{}'", raw))?;
            }
            "-h" | "--help" => return Ok(Invocation::Help),
            other => return Err(format!("unrecognised argument '{}'", other)),
        }
    }

    let theory = theory.ok_or("--theory is required")?;
    let item = item.ok_or("--item is required")?;
    let mut config = HostRuntimeConfig::new(theory, item);
    config.script = script;
    config.settings = settings;
    config.max_steps = max_steps;
    Ok(Invocation::Run(config))
}

fn print_usage(program: &str) {
    eprintln!(
        "usage: {} --theory <DIR/NAME.json> --item <THEOREM> [--script <FILE>] \
         [--settings <FILE>] [--max-steps <N>]",
        program
    );
    eprintln!();
    eprintln!("  -t, --theory    theory document holding the theorem");
    eprintln!("  -i, --item      theorem to open");
    eprintln!("  -s, --script    input script to replay (see demos/)");
    eprintln!("      --settings  editor settings JSON");
    eprintln!("      --max-steps stop after N scripted inputs (0 = all)");
    eprintln!();
    eprintln!("Set PROOFEDIT_LOG or RUST_LOG to control logging.");
}
