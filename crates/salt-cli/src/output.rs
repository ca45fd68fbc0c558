//! Output formatting helpers.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print the answer of one minion, flagging anything but `true`.
///
/// Returns whether the minion answered `true`.
pub fn minion(name: &str, answer: &Value) -> bool {
    match answer {
        Value::Bool(true) => {
            println!("{} {}", "✓".green(), name);
            true
        }
        other => {
            println!("{} {} {}", "✗".red(), name, other.to_string().dimmed());
            false
        }
    }
}

/// Print a value as JSON, compact or pretty-printed.
pub fn json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);
    Ok(())
}
