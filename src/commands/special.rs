//! Operator input parser for the interactive tagging loop
//!
//! Each line the operator types is either a label (a category name or its
//! 1-based number in the configured list) or a `/`-prefixed command.
//! Commands and category names are case-insensitive.

use crate::backend::TrainMode;
use thiserror::Error;

/// Errors that can occur when parsing operator input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Label that matches no configured category
    #[error("Unknown category: {0}\n\nType '/help' to list the categories")]
    UnknownLabel(String),
}

/// What the operator asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorInput {
    /// Label the displayed image with this category (as configured)
    Label(String),

    /// Request model training
    Train(TrainMode),

    /// Copy labeled images into per-category folders
    Export,

    /// Fetch an image again after a failure or exhaustion
    Retry,

    /// Reprint the latest statistics
    Stats,

    /// Leave the session and go back to the session list
    Menu,

    /// Display help information
    Help,

    /// Leave the program
    Quit,

    /// Blank line
    Empty,
}

/// Parse one line of operator input
///
/// # Arguments
///
/// * `input` - Raw line as typed
/// * `categories` - Configured categories, in display order
///
/// # Errors
///
/// Returns `CommandError` for unknown commands, bad arguments and labels
/// that match no category.
///
/// # Examples
///
/// ```
/// use phototag::commands::special::{parse_operator_input, OperatorInput};
///
/// let categories = vec!["keep".to_string(), "meme".to_string()];
/// assert_eq!(
///     parse_operator_input("2", &categories).unwrap(),
///     OperatorInput::Label("meme".to_string())
/// );
/// ```
pub fn parse_operator_input(
    input: &str,
    categories: &[String],
) -> Result<OperatorInput, CommandError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(OperatorInput::Empty);
    }

    let lower = trimmed.to_lowercase();
    if !trimmed.starts_with('/') {
        return match lower.as_str() {
            "exit" | "quit" => Ok(OperatorInput::Quit),
            _ => resolve_label(trimmed, categories),
        };
    }

    match lower.as_str() {
        "/train" | "/train fine-tune" | "/train finetune" => {
            Ok(OperatorInput::Train(TrainMode::FineTune))
        }
        "/train full" => Ok(OperatorInput::Train(TrainMode::Full)),
        input if input.starts_with("/train ") => Err(CommandError::UnsupportedArgument {
            command: "/train".to_string(),
            arg: input[7..].trim().to_string(),
        }),
        "/export" | "/copy" => Ok(OperatorInput::Export),
        "/retry" | "/next" => Ok(OperatorInput::Retry),
        "/stats" => Ok(OperatorInput::Stats),
        "/menu" | "/sessions" => Ok(OperatorInput::Menu),
        "/help" | "/?" => Ok(OperatorInput::Help),
        "/quit" | "/exit" => Ok(OperatorInput::Quit),
        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

fn resolve_label(input: &str, categories: &[String]) -> Result<OperatorInput, CommandError> {
    if let Ok(index) = input.parse::<usize>() {
        return index
            .checked_sub(1)
            .and_then(|i| categories.get(i))
            .map(|c| OperatorInput::Label(c.clone()))
            .ok_or_else(|| CommandError::UnknownLabel(input.to_string()));
    }

    categories
        .iter()
        .find(|c| c.eq_ignore_ascii_case(input))
        .map(|c| OperatorInput::Label(c.clone()))
        .ok_or_else(|| CommandError::UnknownLabel(input.to_string()))
}

/// Print the help text for the tagging loop
pub fn print_help(categories: &[String]) {
    println!(
        r#"
Tagging Commands
================

LABELING:
  <category>      - Label the displayed image
  <number>        - Label by position in the list below
"#
    );
    for (i, category) in categories.iter().enumerate() {
        println!("  {:>2}. {}", i + 1, category);
    }
    println!(
        r#"
SESSION:
  /retry          - Fetch an image again after an error
  /stats          - Show the latest statistics
  /menu           - Back to the session list

BACKEND:
  /train          - Fine-tune the model on the current labels
  /train full     - Retrain the model from scratch
  /export         - Copy labeled images into per-category folders

OTHER:
  /help           - Show this help message
  /quit           - Leave phototag
"#
    );
}
