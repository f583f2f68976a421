//! Terminal output for CLI handlers.
//!
//! Handlers print through these helpers so `--json` and `--quiet` behave
//! the same everywhere. In JSON mode each helper emits one line of the form
//! `{"type": ..., "payload": ...}`; commands with structured results use
//! [`json_output`] instead.

use std::fmt::Display;
use std::sync::OnceLock;

use owo_colors::OwoColorize;
use owo_colors::Stream::{Stderr, Stdout};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde_json::json;

/// Output flags taken from the global CLI arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    pub json: bool,
    pub quiet: bool,
}

impl OutputConfig {
    #[must_use]
    pub const fn new(json: bool, quiet: bool) -> Self {
        Self { json, quiet }
    }
}

static OUTPUT_CONFIG: OnceLock<RwLock<OutputConfig>> = OnceLock::new();

fn current() -> OutputConfig {
    *OUTPUT_CONFIG
        .get_or_init(|| RwLock::new(OutputConfig::default()))
        .read()
}

fn suppressed(config: OutputConfig) -> bool {
    !config.json && config.quiet
}

fn emit_json_line(kind: &str, payload: serde_json::Value) {
    println!("{}", json!({ "type": kind, "payload": payload }));
}

/// Apply output settings. Call once, early in `main`.
pub fn configure(config: OutputConfig) {
    *OUTPUT_CONFIG
        .get_or_init(|| RwLock::new(OutputConfig::default()))
        .write() = config;
}

#[must_use]
pub fn is_json() -> bool {
    current().json
}

#[must_use]
pub fn is_quiet() -> bool {
    current().quiet
}

/// Print a labeled value.
pub fn field(label: &str, value: impl Display) {
    let config = current();
    if config.json {
        emit_json_line("field", json!({ "label": label, "value": value.to_string() }));
        return;
    }
    if suppressed(config) {
        return;
    }
    let label = format!("{label:<14}");
    println!("  {} {}", label.if_supports_color(Stdout, |t| t.dimmed()), value);
}

pub fn success(message: &str) {
    let config = current();
    if config.json {
        emit_json_line("success", json!({ "message": message }));
        return;
    }
    if suppressed(config) {
        return;
    }
    println!("  {} {}", "✓".if_supports_color(Stdout, |t| t.green()), message);
}

/// Warnings are shown even in quiet mode.
pub fn warning(message: &str) {
    if is_json() {
        emit_json_line("warning", json!({ "message": message }));
        return;
    }
    println!("  {} {}", "⚠".if_supports_color(Stdout, |t| t.yellow()), message);
}

/// Print an error line to stderr.
pub fn error(message: &str) {
    if is_json() {
        eprintln!("{}", json!({ "type": "error", "payload": { "message": message } }));
        return;
    }
    eprintln!("  {} {}", "×".if_supports_color(Stderr, |t| t.red()), message);
}

pub fn section(title: &str) {
    let config = current();
    if config.json {
        emit_json_line("section", json!({ "title": title }));
        return;
    }
    if suppressed(config) {
        return;
    }
    println!();
    println!("{}", title.if_supports_color(Stdout, |t| t.bold()));
}

pub fn note(message: &str) {
    let config = current();
    if config.json {
        emit_json_line("note", json!({ "message": message }));
        return;
    }
    if suppressed(config) {
        return;
    }
    println!("  {}", message.if_supports_color(Stdout, |t| t.dimmed()));
}

/// Print a hint with a `hint:` prefix.
pub fn hint(message: &str) {
    let config = current();
    if config.json {
        emit_json_line("hint", json!({ "message": message }));
        return;
    }
    if suppressed(config) {
        return;
    }
    println!(
        "  {}: {}",
        "hint".if_supports_color(Stdout, |t| t.cyan()),
        message.if_supports_color(Stdout, |t| t.dimmed())
    );
}

/// Print multi-line content (e.g. a rendered table), indented.
pub fn lines(content: &str) {
    let config = current();
    if config.json {
        emit_json_line("lines", json!({ "content": content }));
        return;
    }
    if suppressed(config) {
        return;
    }
    for line in content.lines() {
        println!("  {line}");
    }
}

/// Emit a JSON document as a single line.
pub fn json_output(value: serde_json::Value) {
    println!("{value}");
}

/// Money colored by sign: green above zero, red below.
#[must_use]
pub fn money(value: Decimal) -> String {
    let text = format!("{value:.2}");
    if is_json() || value.is_zero() {
        return text;
    }
    if value.is_sign_positive() {
        format!("{}", text.if_supports_color(Stdout, |t| t.green()))
    } else {
        format!("{}", text.if_supports_color(Stdout, |t| t.red()))
    }
}

#[must_use]
pub fn highlight(value: impl Display) -> String {
    let value = value.to_string();
    if is_json() {
        return value;
    }
    format!("{}", value.if_supports_color(Stdout, |t| t.cyan()))
}

#[must_use]
pub fn muted(value: impl Display) -> String {
    let value = value.to_string();
    if is_json() {
        return value;
    }
    format!("{}", value.if_supports_color(Stdout, |t| t.dimmed()))
}
