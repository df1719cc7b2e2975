//! Summary reporting for CLI commands.

use console::style;

use crate::agent::{ClickOutcome, ResponseSource, Served};
use crate::format::{format_bytes, format_status};
use crate::request::FetchRequest;

const SEPARATOR: &str = "────────────────────────────────────────────────────────────";

/// Prints the outcome of one intercepted request.
pub fn print_served(request: &FetchRequest, served: &Served) {
    let source = match served.source {
        ResponseSource::Network => style("network").green(),
        ResponseSource::Cache => style("cache").cyan(),
    };
    println!(
        "  {} {} <- {} ({}, {})",
        request.method,
        request.url,
        source,
        format_status(served.response.status),
        format_bytes(served.response.body.len() as u64),
    );
}

/// Prints a failed request.
pub fn print_failed(request: &FetchRequest, error: &crate::Error) {
    println!(
        "  {} {} <- {} ({error})",
        request.method,
        request.url,
        style("failed").red()
    );
}

/// Prints the buckets removed by activation.
pub fn print_activated(current: &str, deleted: &[String]) {
    println!("\n{SEPARATOR}");
    println!("Active cache: {}", style(current).bold());
    println!("{SEPARATOR}");
    if deleted.is_empty() {
        println!("  No stale caches");
    }
    for name in deleted {
        println!("  Deleted {name}");
    }
    println!("{SEPARATOR}");
}

/// Prints what a notification click did.
pub fn print_click(outcome: &ClickOutcome) {
    match outcome {
        ClickOutcome::Focused { client_id } => println!("  Focused {client_id}"),
        ClickOutcome::Opened => println!("  Opened a new window"),
        ClickOutcome::Ignored => println!("  No window to focus or open"),
    }
}
