//! Line-based control surface on stdin
//!
//! Stands in for a settings window: every command maps to one operation on the
//! poll loop or the persisted settings.

use crate::engine::{speed_label, PollLoop, StatusEvent};
use crate::persistence::persistence_worker::PersistenceAction;
use color_eyre::{eyre::eyre, Result};
use std::str::FromStr;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, warn};

/// Step used by `faster` and `slower`
pub const SENSITIVITY_STEP: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConsoleCommand {
    Start,
    Stop,
    Reconnect,
    Faster,
    Slower,
    Speed(f64),
    Defaults,
    Status,
    Help,
    Quit,
}

impl FromStr for ConsoleCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or_default().to_lowercase();
        let argument = parts.next();

        match (command.as_str(), argument) {
            ("start", None) => Ok(ConsoleCommand::Start),
            ("stop", None) => Ok(ConsoleCommand::Stop),
            ("reconnect", None) => Ok(ConsoleCommand::Reconnect),
            ("faster" | "+", None) => Ok(ConsoleCommand::Faster),
            ("slower" | "-", None) => Ok(ConsoleCommand::Slower),
            ("speed", Some(value)) => value
                .parse::<f64>()
                .map(ConsoleCommand::Speed)
                .map_err(|_| format!("Invalid speed value: {}", value)),
            ("defaults", None) => Ok(ConsoleCommand::Defaults),
            ("status", None) => Ok(ConsoleCommand::Status),
            ("help" | "?", None) => Ok(ConsoleCommand::Help),
            ("quit" | "exit", None) => Ok(ConsoleCommand::Quit),
            _ => Err(format!("Unknown command: {}", line.trim())),
        }
    }
}

const HELP: &str = "Commands: start, stop, reconnect, faster, slower, speed <value>, defaults, status, quit";

/// Reads commands until `quit`, end of input or Ctrl-C
pub async fn run_console(
    poll_loop: &mut PollLoop,
    persistence: mpsc::Sender<PersistenceAction>,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    info!("{}", HELP);

    loop {
        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl-C received, shutting down");
                break;
            }

            line = lines.next_line() => line
                .map_err(|e| eyre!("Failed to read from stdin: {}", e))?,
        };

        let Some(line) = line else {
            info!("Console input closed");
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<ConsoleCommand>() {
            Ok(ConsoleCommand::Quit) => break,
            Ok(command) => execute(command, poll_loop, &persistence).await,
            Err(e) => warn!("{}. {}", e, HELP),
        }
    }

    Ok(())
}

async fn execute(
    command: ConsoleCommand,
    poll_loop: &mut PollLoop,
    persistence: &mpsc::Sender<PersistenceAction>,
) {
    match command {
        ConsoleCommand::Start => match poll_loop.start() {
            Ok(()) => info!("Gopher running"),
            Err(e) => error!("Cannot start: {}", e),
        },
        ConsoleCommand::Stop => poll_loop.stop().await,
        ConsoleCommand::Reconnect => {
            if let Err(e) = poll_loop.connect() {
                error!("Reconnect failed: {}", e);
            }
        }
        ConsoleCommand::Faster => {
            let value = poll_loop.mode().adjust_sensitivity(SENSITIVITY_STEP);
            persist_sensitivity(value, persistence).await;
        }
        ConsoleCommand::Slower => {
            let value = poll_loop.mode().adjust_sensitivity(-SENSITIVITY_STEP);
            persist_sensitivity(value, persistence).await;
        }
        ConsoleCommand::Speed(value) => {
            let value = poll_loop.mode().set_sensitivity(value);
            persist_sensitivity(value, persistence).await;
        }
        ConsoleCommand::Defaults => load_defaults(poll_loop, persistence).await,
        ConsoleCommand::Status => {
            let mode = poll_loop.mode();
            info!(
                "Running: {}, input disabled: {}, window hidden: {}, speed: {} ({:.3})",
                poll_loop.is_running(),
                mode.is_input_disabled(),
                mode.is_window_hidden(),
                speed_label(mode.sensitivity()),
                mode.sensitivity()
            );
        }
        ConsoleCommand::Help => info!("{}", HELP),
        ConsoleCommand::Quit => {}
    }
}

async fn persist_sensitivity(value: f64, persistence: &mpsc::Sender<PersistenceAction>) {
    info!("{}", StatusEvent::SpeedChanged(value));
    if let Err(e) = persistence
        .send(PersistenceAction::SetSensitivity(value))
        .await
    {
        error!("Failed to queue sensitivity save: {}", e);
    }
}

async fn load_defaults(poll_loop: &PollLoop, persistence: &mpsc::Sender<PersistenceAction>) {
    let (response_tx, response_rx) = oneshot::channel();
    if let Err(e) = persistence
        .send(PersistenceAction::LoadDefaults { response_tx })
        .await
    {
        error!("Failed to queue defaults reset: {}", e);
        return;
    }

    match response_rx.await {
        Ok(Ok((mapping, sensitivity))) => {
            *poll_loop.mapping().write().await = mapping;
            poll_loop.mode().set_sensitivity(sensitivity);
            info!("Defaults loaded");
        }
        Ok(Err(e)) => error!("Failed to load defaults: {}", e),
        Err(e) => error!("Persistence worker did not answer: {}", e),
    }
}

/// Logs status events and saves speed changes made on the controller
pub async fn report_status(
    mut status_rx: mpsc::Receiver<StatusEvent>,
    persistence: mpsc::Sender<PersistenceAction>,
) {
    while let Some(event) = status_rx.recv().await {
        info!("{}", event);
        if let StatusEvent::SpeedChanged(value) = event {
            if let Err(e) = persistence
                .send(PersistenceAction::SetSensitivity(value))
                .await
            {
                error!("Failed to queue sensitivity save: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::MappingTable;
    use crate::persistence::config_store::ConfigStore;
    use crate::persistence::persistence_worker::PersistenceWorker;

    #[test]
    fn parses_commands() {
        assert_eq!("start".parse::<ConsoleCommand>(), Ok(ConsoleCommand::Start));
        assert_eq!("  STOP ".parse::<ConsoleCommand>(), Ok(ConsoleCommand::Stop));
        assert_eq!("+".parse::<ConsoleCommand>(), Ok(ConsoleCommand::Faster));
        assert_eq!("slower".parse::<ConsoleCommand>(), Ok(ConsoleCommand::Slower));
        assert_eq!("speed 2.5".parse::<ConsoleCommand>(), Ok(ConsoleCommand::Speed(2.5)));
        assert_eq!("exit".parse::<ConsoleCommand>(), Ok(ConsoleCommand::Quit));
    }

    #[test]
    fn rejects_unknown_or_malformed_commands() {
        assert!("jump".parse::<ConsoleCommand>().is_err());
        assert!("speed fast".parse::<ConsoleCommand>().is_err());
        assert!("speed".parse::<ConsoleCommand>().is_err());
        assert!("start now".parse::<ConsoleCommand>().is_err());
    }

    #[tokio::test]
    async fn controller_speed_changes_are_saved() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("config.toml"));
        let worker = PersistenceWorker::spawn(store.clone(), MappingTable::default(), 1.0);

        let (status_tx, status_rx) = mpsc::channel(8);
        let reporter = tokio::spawn(report_status(status_rx, worker.sender()));
        status_tx.send(StatusEvent::InputDisabled).await.unwrap();
        status_tx.send(StatusEvent::SpeedChanged(2.0)).await.unwrap();
        drop(status_tx);
        reporter.await.unwrap();
        worker.shutdown().await;

        assert_eq!(store.load().await.unwrap().sensitivity, 2.0);
    }
}
