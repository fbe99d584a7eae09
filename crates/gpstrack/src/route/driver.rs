//! Periodic tick driver.
//!
//! A single task owns the [`RouteLogger`]. Commands arrive over a channel and
//! the tick timer is polled in the same `select!`, so a tick and a user
//! action never run at the same time and the pending queue needs no lock.

use std::future;
use std::path::PathBuf;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, warn};

use super::{LogRecord, LoggerState, LoggerStatus, MetaSelection, RouteLogger, SessionSummary};
use crate::error::{Error, Result};
use crate::location::LocationProvider;

/// Commands buffered between the handle and the logger task.
const COMMAND_BUFFER: usize = 32;

/// Something the logger task did on its own schedule.
#[derive(Debug, Clone, PartialEq)]
pub enum LoggerEvent {
    /// A record was appended to the session file.
    Tick(LogRecord),
    /// A tick could not be written. The session stays open.
    TickFailed(String),
}

enum Command {
    Start(oneshot::Sender<Result<PathBuf>>),
    Stop(oneshot::Sender<Result<SessionSummary>>),
    Submit(MetaSelection, oneshot::Sender<Result<bool>>),
    Status(oneshot::Sender<LoggerStatus>),
}

/// Cloneable handle to a running logger task.
///
/// Dropping every handle shuts the task down; an open session is stopped
/// first.
#[derive(Debug, Clone)]
pub struct LoggerHandle {
    tx: mpsc::Sender<Command>,
}

impl LoggerHandle {
    /// Open a new session and begin ticking at the project's interval.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if already logging.
    pub async fn start(&self) -> Result<PathBuf> {
        self.request(Command::Start).await?
    }

    /// Stop ticking and close the session.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if idle.
    pub async fn stop(&self) -> Result<SessionSummary> {
        self.request(Command::Stop).await?
    }

    /// Queue the selection for the next tick. On success the caller's
    /// selection is cleared, whether or not anything was queued.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if idle or `PendingQueueFull` if capped and full.
    pub async fn submit_meta(&self, selection: &mut MetaSelection) -> Result<bool> {
        let snapshot = selection.clone();
        let queued = self.request(|tx| Command::Submit(snapshot, tx)).await??;
        selection.clear();
        Ok(queued)
    }

    /// Current logger status.
    ///
    /// # Errors
    ///
    /// Returns an error if the logger task has exited.
    pub async fn status(&self) -> Result<LoggerStatus> {
        self.request(Command::Status).await
    }

    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(make(tx))
            .await
            .map_err(|_| Error::internal("route logger task has exited"))?;
        rx.await
            .map_err(|_| Error::internal("route logger task dropped the request"))
    }
}

/// Move `logger` onto its own task.
///
/// Returns the command handle, the event stream, and the task's join handle,
/// which yields the logger back once every handle has been dropped.
pub fn spawn_logger<L>(
    logger: RouteLogger<L>,
) -> (
    LoggerHandle,
    mpsc::UnboundedReceiver<LoggerEvent>,
    JoinHandle<RouteLogger<L>>,
)
where
    L: LocationProvider + 'static,
{
    let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(run(logger, rx, events_tx));
    (LoggerHandle { tx }, events_rx, task)
}

async fn run<L: LocationProvider>(
    mut logger: RouteLogger<L>,
    mut commands: mpsc::Receiver<Command>,
    events: mpsc::UnboundedSender<LoggerEvent>,
) -> RouteLogger<L> {
    let mut ticker: Option<Interval> = None;

    loop {
        tokio::select! {
            biased;

            command = commands.recv() => match command {
                Some(command) => handle(&mut logger, &mut ticker, command),
                None => break,
            },

            () = next_tick(&mut ticker) => {
                let event = match logger.on_tick() {
                    Ok(record) => LoggerEvent::Tick(record),
                    Err(e) => {
                        error!("Tick failed: {}", e);
                        LoggerEvent::TickFailed(e.to_string())
                    }
                };
                // Nobody listening is fine; the record is already on disk
                let _ = events.send(event);
            }
        }
    }

    if logger.state() == LoggerState::Logging {
        if let Err(e) = logger.stop() {
            warn!("Failed to stop logger on shutdown: {}", e);
        }
    }
    debug!("Route logger task exiting");
    logger
}

fn handle<L: LocationProvider>(
    logger: &mut RouteLogger<L>,
    ticker: &mut Option<Interval>,
    command: Command,
) {
    match command {
        Command::Start(reply) => {
            let result = logger.start();
            if result.is_ok() {
                // First tick one full interval after start, like a UI timer
                let period = logger.interval();
                let mut interval = time::interval_at(Instant::now() + period, period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                *ticker = Some(interval);
            }
            let _ = reply.send(result);
        }
        Command::Stop(reply) => {
            let result = logger.stop();
            if result.is_ok() {
                *ticker = None;
            }
            let _ = reply.send(result);
        }
        Command::Submit(mut selection, reply) => {
            let _ = reply.send(logger.submit_meta(&mut selection));
        }
        Command::Status(reply) => {
            let _ = reply.send(logger.status());
        }
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => future::pending().await,
    }
}
