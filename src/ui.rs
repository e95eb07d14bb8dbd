//! Terminal output helpers.

use colored::Colorize;
use reconcile::{Action, AttrValue};

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.len()).dimmed());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Render one attribute value; NULL shows as the device default marker.
pub fn display_value(value: Option<&AttrValue>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "(default)".to_string(),
    }
}

/// Render one plan action as a diff-style line.
pub fn action_line(action: &Action) -> String {
    match action {
        Action::Create => format!("{} create resource", "+".green()),
        Action::Set { name, value } => format!("{} {name} = {value}", "~".yellow()),
        Action::Reset { name } => format!("{} {name} = (default)", "~".yellow()),
        Action::Delete => format!("{} delete resource", "-".red()),
        Action::ResetAll { names } => {
            format!("{} reset to defaults: {}", "-".red(), names.join(", "))
        }
    }
}
