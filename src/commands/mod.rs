/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes four top-level command modules:

- `sessions` - List labeling sessions
- `tag`      - Interactive tagging loop
- `train`    - One-shot training request
- `export`   - One-shot export of labeled images

Every handler talks to the backend over HTTP and renders through a
[`terminal::TerminalSink`] behind a [`BusyTracker`], so the busy indicator
covers the session and its side channels together.
*/

use crate::backend::{Backend, HttpBackend, SessionId};
use crate::config::Config;
use crate::error::{PhototagError, Result};
use crate::render::{BusyTracker, RenderSink};
use crate::session::ActionOutcome;
use std::sync::Arc;

// Operator input parser for the tagging loop
pub mod special;

// RenderSink that prints to the terminal
pub mod terminal;

use terminal::TerminalSink;

/// Build the HTTP backend described by `config`
///
/// # Errors
///
/// Returns error if the base URL is invalid or the HTTP client cannot be
/// created
pub fn build_backend(config: &Config) -> Result<Arc<dyn Backend>> {
    Ok(Arc::new(HttpBackend::new(&config.backend)?))
}

/// One sink per command, shared by every component that renders
fn build_sink(config: &Config) -> Arc<dyn RenderSink> {
    let terminal = Arc::new(TerminalSink::new(config.display.preview_path.clone()));
    Arc::new(BusyTracker::new(terminal))
}

/// Turn the outcome of a one-shot action into the process result
fn outcome_to_result(outcome: ActionOutcome, what: &str) -> Result<()> {
    match outcome {
        ActionOutcome::Acknowledged(_) => Ok(()),
        ActionOutcome::Rejected(message) => Err(PhototagError::BackendRejection(message).into()),
        ActionOutcome::Failed => {
            Err(PhototagError::Transport(format!("{} request did not reach the backend", what)).into())
        }
        ActionOutcome::Busy => {
            Err(PhototagError::Transport(format!("{} request already in flight", what)).into())
        }
        ActionOutcome::Disabled => {
            Err(PhototagError::CapabilityDisabled(what.to_lowercase()).into())
        }
    }
}

// Session listing command handler
pub mod sessions {
    //! Print the sessions the backend knows about.

    use super::*;
    use crate::session::SessionDirectory;

    /// List sessions as `Session <id> - (<processed>/<total>)`
    ///
    /// An empty or failed listing is not an error; the failure notice has
    /// already been printed by the sink.
    pub async fn run_sessions(config: Config) -> Result<()> {
        let backend = build_backend(&config)?;
        let directory = SessionDirectory::new(backend, build_sink(&config));

        let sessions = directory.list_sessions().await;
        if sessions.is_empty() {
            println!("No sessions available");
        }
        for entry in &sessions {
            println!("{}", entry);
        }
        Ok(())
    }
}

// Tagging command handler
pub mod tag {
    //! Interactive tagging loop.
    //!
    //! Picks a session (from the command line or the listing), then reads
    //! operator input with rustyline until the operator quits. `/menu`
    //! returns to the session list.

    use super::special::{parse_operator_input, print_help, OperatorInput};
    use super::terminal::stats_lines;
    use super::*;
    use crate::backend::SessionListEntry;
    use crate::session::{
        Exporter, SessionDirectory, SessionState, TaggingSession, TrainingTrigger,
    };
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// What the inner loop asks the outer loop to do next
    enum Next {
        Menu,
        Quit,
    }

    /// Start the interactive tagging loop
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `session` - Session to open directly; `None` shows the listing
    ///
    /// # Errors
    ///
    /// Returns `MissingSession` if no session was chosen, or an error if
    /// the terminal cannot be read.
    pub async fn run_tag(config: Config, session: Option<String>) -> Result<()> {
        tracing::info!("Starting interactive tagging");

        let backend = build_backend(&config)?;
        let sink = build_sink(&config);
        let directory = SessionDirectory::new(backend.clone(), sink.clone());
        let trainer = TrainingTrigger::new(
            backend.clone(),
            sink.clone(),
            config.labeling.supports_training,
        );
        let exporter = Exporter::new(backend.clone(), sink.clone());

        let mut rl = DefaultEditor::new().map_err(PhototagError::from)?;
        let mut requested = session;

        loop {
            let session = match requested.take() {
                Some(id) => TaggingSession::new(
                    SessionId::new(id),
                    config.labeling.clone(),
                    backend.clone(),
                    sink.clone(),
                )?,
                None => match pick_session(&directory, &mut rl).await? {
                    Some(entry) => directory.open(&entry, config.labeling.clone())?,
                    None => return Ok(()),
                },
            };

            match run_session(&config, &session, &trainer, &exporter, &mut rl).await? {
                Next::Menu => continue,
                Next::Quit => return Ok(()),
            }
        }
    }

    /// Show the listing and read the operator's choice
    ///
    /// Returns `Ok(None)` when the operator quits.
    async fn pick_session(
        directory: &SessionDirectory,
        rl: &mut DefaultEditor,
    ) -> Result<Option<SessionListEntry>> {
        let sessions = directory.list_sessions().await;
        if sessions.is_empty() {
            return Err(PhototagError::MissingSession.into());
        }

        for (i, entry) in sessions.iter().enumerate() {
            println!("  {:>2}. {}", i + 1, entry);
        }

        loop {
            match rl.readline("session> ") {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        return Err(PhototagError::MissingSession.into());
                    }
                    if matches!(trimmed.to_lowercase().as_str(), "quit" | "exit" | "/quit") {
                        return Ok(None);
                    }
                    match select_entry(&sessions, trimmed) {
                        Some(entry) => return Ok(Some(entry.clone())),
                        None => println!(
                            "{}",
                            format!("No session matches '{}'", trimmed).yellow()
                        ),
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(None),
                Err(err) => return Err(PhototagError::from(err).into()),
            }
        }
    }

    /// Match a listing row by 1-based position or by session id
    fn select_entry<'a>(sessions: &'a [SessionListEntry], choice: &str) -> Option<&'a SessionListEntry> {
        if let Some(entry) = choice
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| sessions.get(i))
        {
            return Some(entry);
        }
        sessions.iter().find(|e| e.session_id.as_str() == choice)
    }

    async fn run_session(
        config: &Config,
        session: &TaggingSession,
        trainer: &TrainingTrigger,
        exporter: &Exporter,
        rl: &mut DefaultEditor,
    ) -> Result<Next> {
        let categories = &config.labeling.categories;
        println!(
            "\nSession {} - categories: {}",
            session.session_id().as_str().bold(),
            categories.join(", ")
        );
        println!("Type '/help' for available commands, '/quit' to leave\n");

        session.initialize().await;

        loop {
            let prompt = format!("[{}] {}> ", session.session_id(), session.state());
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if !trimmed.is_empty() {
                        rl.add_history_entry(trimmed).map_err(PhototagError::from)?;
                    }

                    match parse_operator_input(trimmed, categories) {
                        Ok(OperatorInput::Label(category)) => {
                            session.submit_label(&category).await;
                        }
                        Ok(OperatorInput::Train(mode)) => {
                            trainer.train(session.session_id(), mode).await;
                        }
                        Ok(OperatorInput::Export) => {
                            exporter.export_labeled(session.session_id()).await;
                        }
                        Ok(OperatorInput::Retry) => {
                            if session.initialize().await == SessionState::Exhausted {
                                println!(
                                    "{}",
                                    "Session is finished; use /menu to pick another".yellow()
                                );
                            }
                        }
                        Ok(OperatorInput::Stats) => {
                            let lines = stats_lines(&session.stats());
                            if lines.is_empty() {
                                println!("No statistics yet");
                            }
                            for line in lines {
                                println!("{}", line);
                            }
                        }
                        Ok(OperatorInput::Menu) => return Ok(Next::Menu),
                        Ok(OperatorInput::Help) => print_help(categories),
                        Ok(OperatorInput::Quit) => return Ok(Next::Quit),
                        Ok(OperatorInput::Empty) => {}
                        Err(e) => println!("{}", e.to_string().yellow()),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    return Ok(Next::Quit);
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    return Ok(Next::Quit);
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    return Err(PhototagError::from(err).into());
                }
            }
        }
    }

}

// Training command handler
pub mod train {
    //! One-shot training request.

    use super::*;
    use crate::backend::TrainMode;
    use crate::session::TrainingTrigger;

    /// Request training for `session` and report the outcome
    ///
    /// # Errors
    ///
    /// Returns error unless the backend acknowledged the request
    pub async fn run_train(config: Config, session: String, full: bool) -> Result<()> {
        let session = SessionId::new(session);
        if session.is_blank() {
            return Err(PhototagError::MissingSession.into());
        }
        let mode = if full {
            TrainMode::Full
        } else {
            TrainMode::FineTune
        };

        let trigger = TrainingTrigger::new(
            build_backend(&config)?,
            build_sink(&config),
            config.labeling.supports_training,
        );
        outcome_to_result(trigger.train(&session, mode).await, "Training")
    }
}

// Export command handler
pub mod export {
    //! One-shot export of labeled images.

    use super::*;
    use crate::session::Exporter;

    /// Copy the labeled images of `session` into per-category folders
    ///
    /// # Errors
    ///
    /// Returns error unless the backend acknowledged the request
    pub async fn run_export(config: Config, session: String) -> Result<()> {
        let session = SessionId::new(session);
        if session.is_blank() {
            return Err(PhototagError::MissingSession.into());
        }

        let exporter = Exporter::new(build_backend(&config)?, build_sink(&config));
        outcome_to_result(exporter.export_labeled(&session).await, "Export")
    }
}
