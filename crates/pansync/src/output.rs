//! Outcome and resource rendering for text and JSON output.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;

use pansync_core::Outcome;

use crate::cli::OutputFormat;

/// Whether text output should be colorized.
fn use_color() -> bool {
    io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err()
}

/// Print a reconciliation outcome.
///
/// Text mode is one line: `[changed]` or `[ok]`, then the engine's
/// message. JSON mode serializes the outcome as-is for scripting.
pub fn print_outcome(outcome: &Outcome, format: &OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    let rendered = match format {
        OutputFormat::Text => {
            let tag = if outcome.changed { "[changed]" } else { "[ok]" };
            let tag = if use_color() {
                if outcome.changed {
                    tag.yellow().to_string()
                } else {
                    tag.green().to_string()
                }
            } else {
                tag.to_string()
            };
            format!("{tag} {}", outcome.message)
        }
        OutputFormat::Json => render_json(outcome),
    };
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{rendered}");
}

/// Print the configuration subtree fetched by a `show` command.
///
/// An empty body means the node is absent; text mode says so on stderr,
/// keeping stdout clean for piping.
pub fn print_resource(label: &str, xml: &str, format: &OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match format {
        OutputFormat::Text => {
            if xml.is_empty() {
                eprintln!("{label}: not present");
            } else {
                let mut stdout = io::stdout().lock();
                let _ = writeln!(stdout, "{xml}");
            }
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "present": !xml.is_empty(),
                "xml": xml,
            });
            let mut stdout = io::stdout().lock();
            let _ = writeln!(stdout, "{}", render_json(&value));
        }
    }
}

/// Pretty-printed JSON.
fn render_json<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string_pretty(data).expect("serialization should not fail")
}
