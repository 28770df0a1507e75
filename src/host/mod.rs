//! Terminal presentation host
//!
//! A line-oriented stand-in for a tray menu: reads actions, calls into the
//! controller and timer, and prints the indicator after each change,
//! including changes the timer makes on its own.

pub mod menu;

use std::sync::Arc;

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use crate::{
    controller::Controller,
    state::{ControllerSnapshot, TargetState, TimerPhase, TimerStatus},
    tasks::DelayedActionTimer,
};
pub use menu::{duration_label, menu_text, toggle_label, MenuAction};

/// Snapshot plus timer, as printed by the `json` action
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub adapter: ControllerSnapshot,
    pub timer: TimerStatus,
}

pub struct Host {
    controller: Arc<Controller>,
    timer: Arc<DelayedActionTimer>,
    durations: Vec<u64>,
}

impl Host {
    pub fn new(
        controller: Arc<Controller>,
        timer: Arc<DelayedActionTimer>,
        durations: Vec<u64>,
    ) -> Self {
        Self {
            controller,
            timer,
            durations,
        }
    }

    /// Indicator line plus any failure from the last operation
    pub fn indicator(&self) -> String {
        describe(&self.controller.snapshot())
    }

    pub fn menu(&self) -> String {
        menu_text(self.controller.handle(), self.controller.current_state(), &self.durations)
    }

    pub fn report(&self) -> StatusReport {
        StatusReport {
            adapter: self.controller.snapshot(),
            timer: self.timer.status(),
        }
    }

    /// Perform one action and return the text to show
    pub async fn handle(&self, action: MenuAction) -> String {
        debug!("Menu action: {:?}", action);
        match action {
            MenuAction::Toggle => {
                self.controller.toggle().await;
                self.indicator()
            }
            MenuAction::Enable => {
                self.controller.set_state(TargetState::Enabled).await;
                self.indicator()
            }
            MenuAction::Disable => {
                self.controller.set_state(TargetState::Disabled).await;
                self.indicator()
            }
            MenuAction::DisableFor(seconds) => {
                let session = self.timer.start(seconds).await;
                info!("Started timer session {}", session);
                format!("Disabling {} for {}", self.controller.handle(), duration_label(seconds))
            }
            MenuAction::CancelTimer => {
                self.timer.cancel_and_enable().await;
                format!("Timer cancelled\n{}", self.indicator())
            }
            MenuAction::Status => {
                let mut text = self.indicator();
                if let Some(remaining) = self.timer.status().remaining_seconds() {
                    text.push_str(&format!("\nRe-enabling in {}s", remaining));
                }
                text
            }
            MenuAction::Refresh => {
                self.controller.refresh().await;
                self.indicator()
            }
            MenuAction::Json => serde_json::to_string_pretty(&self.report())
                .unwrap_or_else(|e| format!("could not encode status: {}", e)),
            MenuAction::Help => self.menu(),
            MenuAction::Quit => "Bye".to_string(),
        }
    }

    /// Serve actions from `input` until it ends or `quit` is entered
    ///
    /// Any running timer is cancelled on the way out, without re-enabling.
    pub async fn run<R, W>(&self, input: R, mut output: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        let mut snapshots = self.controller.subscribe();
        let mut timer_status = self.timer.subscribe();
        let mut last_phase = timer_status.borrow_and_update().phase;
        snapshots.borrow_and_update();

        write_line(&mut output, &self.menu()).await?;
        write_line(&mut output, &self.indicator()).await?;

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    if line.trim().is_empty() {
                        continue;
                    }
                    match MenuAction::parse(&line, &self.durations) {
                        Ok(MenuAction::Quit) => break,
                        Ok(action) => {
                            let reply = self.handle(action).await;
                            // The reply already shows the new state
                            snapshots.borrow_and_update();
                            write_line(&mut output, &reply).await?;
                        }
                        Err(message) => write_line(&mut output, &message).await?,
                    }
                }
                Ok(()) = snapshots.changed() => {
                    let text = describe(&snapshots.borrow_and_update());
                    write_line(&mut output, &text).await?;
                }
                Ok(()) = timer_status.changed() => {
                    let phase = timer_status.borrow_and_update().phase;
                    if phase != last_phase {
                        last_phase = phase;
                        match phase {
                            TimerPhase::Completed => {
                                write_line(&mut output, "Timer finished").await?
                            }
                            TimerPhase::Cancelled => {
                                write_line(&mut output, "Timer stopped").await?
                            }
                            TimerPhase::Idle | TimerPhase::Running => {}
                        }
                    }
                }
            }
        }

        self.timer.cancel().await;
        Ok(())
    }
}

fn describe(snapshot: &ControllerSnapshot) -> String {
    match snapshot.last_outcome.error() {
        Some(error) => format!("{}\n  ! {}", snapshot.indicator_label(), error),
        None => snapshot.indicator_label(),
    }
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> std::io::Result<()> {
    output.write_all(text.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await
}
