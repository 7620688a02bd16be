//! `vocalis check`: validate the config file and the effective settings.
//!
//! Prints one line per diagnostic with an `[ok]`, `[warn]`, `[fail]` or
//! `[info]` marker and exits non-zero when any error was found.

use std::path::Path;

use {
    anyhow::Result,
    vocalis_config::{Diagnostic, Severity},
};

use crate::setup::load_effective_config;

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn marker(severity: Severity) -> (&'static str, &'static str) {
    match severity {
        Severity::Error => ("fail", RED),
        Severity::Warning => ("warn", YELLOW),
        Severity::Info => ("info", CYAN),
    }
}

fn print_section(title: &str, diagnostics: &[Diagnostic]) {
    eprintln!("{BOLD}{title}{RESET}");
    if diagnostics.is_empty() {
        eprintln!("  [{GREEN}ok{RESET}]  no problems found");
    }
    for d in diagnostics {
        let (label, color) = marker(d.severity);
        if d.path.is_empty() {
            eprintln!("  [{color}{label}{RESET}]  {}", d.message);
        } else {
            eprintln!("  [{color}{label}{RESET}]  {}: {}", d.path, d.message);
        }
    }
    eprintln!();
}

/// Run both validation passes. Returns every diagnostic, file-level first.
pub fn collect_diagnostics(path: Option<&Path>) -> Vec<Diagnostic> {
    let file = vocalis_config::validate(path);
    let mut diagnostics = file.diagnostics;
    // Semantic checks only make sense once the file parses.
    if !diagnostics.iter().any(|d| d.severity == Severity::Error) {
        match load_effective_config(path) {
            Ok(config) => diagnostics.extend(vocalis_config::validate_config(&config)),
            Err(e) => diagnostics.push(Diagnostic {
                severity: Severity::Error,
                category: "syntax",
                path: String::new(),
                message: e.to_string(),
            }),
        }
    }
    diagnostics
}

pub fn handle_check(path: Option<&Path>) -> Result<()> {
    let label = path
        .map(Path::to_path_buf)
        .or_else(vocalis_config::find_config_file)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".into());

    let diagnostics = collect_diagnostics(path);
    print_section(&format!("Config ({label})"), &diagnostics);

    let errors = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    let warnings = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();
    eprintln!("{BOLD}Summary:{RESET} {errors} error(s), {warnings} warning(s)");

    if errors > 0 {
        anyhow::bail!("config check failed with {errors} error(s)");
    }
    Ok(())
}
