// State readers
pub mod baseline;
pub mod imported;

// Cloud import
pub mod import;

pub mod config;

use crate::ui;

/// Explain a failed state read before the error itself is printed.
pub fn hint(err: &tfstate::Error) {
    let kind = err.kind();
    ui::error(&format!("{}. {}", kind.description(), kind.advice()));
}
