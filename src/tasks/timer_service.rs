//! Countdown timer service
//!
//! A single task owns the optional [`CountdownSession`] and its ticker.
//! Commands arrive over an mpsc queue and every state change happens inside
//! that task's loop, so no lock guards the session. Dropping the ticker is
//! the cancel handle: once it is gone no further tick can fire.

use std::time::Duration;
use tokio::{
    sync::{broadcast, mpsc, oneshot, watch},
    time::{interval_at, Instant, Interval, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::{
    error::ServiceError,
    services::{disable_bluetooth, Adapter},
    state::{CountdownSession, Minutes, TimerEvent, TimerPhase, TimerSnapshot},
};

pub const TICK_PERIOD: Duration = Duration::from_millis(1000);

const COMMAND_QUEUE: usize = 16;
const EVENT_BUFFER: usize = 128;

/// Result of a start command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    Started(CountdownSession),
    /// A session was already running; it is returned untouched
    AlreadyRunning(CountdownSession),
}

impl StartOutcome {
    pub fn session(&self) -> &CountdownSession {
        match self {
            StartOutcome::Started(session) | StartOutcome::AlreadyRunning(session) => session,
        }
    }
}

/// Result of a cancel command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled,
    NotRunning,
}

enum Command {
    Start {
        minutes: Minutes,
        reply: oneshot::Sender<StartOutcome>,
    },
    Cancel {
        reply: oneshot::Sender<CancelOutcome>,
    },
}

/// Cloneable handle used to command and observe the timer service
#[derive(Debug, Clone)]
pub struct TimerHandle {
    commands: mpsc::Sender<Command>,
    events: broadcast::Sender<TimerEvent>,
    snapshot: watch::Receiver<TimerSnapshot>,
}

impl TimerHandle {
    /// Ask the service to start a session of `minutes`
    pub async fn start(&self, minutes: Minutes) -> Result<StartOutcome, ServiceError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::Start { minutes, reply })
            .await
            .map_err(|_| ServiceError::Closed)?;
        rx.await.map_err(|_| ServiceError::Closed)
    }

    /// Ask the service to cancel the running session
    pub async fn cancel(&self) -> Result<CancelOutcome, ServiceError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::Cancel { reply })
            .await
            .map_err(|_| ServiceError::Closed)?;
        rx.await.map_err(|_| ServiceError::Closed)
    }

    /// Receive every event published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.events.subscribe()
    }

    /// Current state of the timer
    pub fn snapshot(&self) -> TimerSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Watch the timer snapshot for changes
    pub fn watch(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshot.clone()
    }
}

struct ActiveSession {
    session: CountdownSession,
    ticker: Interval,
}

enum Step {
    Command(Option<Command>),
    Tick,
}

/// The task that owns the countdown
pub struct TimerService {
    adapter: Adapter,
    commands: mpsc::Receiver<Command>,
    events: broadcast::Sender<TimerEvent>,
    snapshot: watch::Sender<TimerSnapshot>,
    active: Option<ActiveSession>,
}

impl TimerService {
    /// Build the service and the handle that controls it
    pub fn new(adapter: Adapter) -> (Self, TimerHandle) {
        let (commands_tx, commands) = mpsc::channel(COMMAND_QUEUE);
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        let (snapshot, snapshot_rx) = watch::channel(TimerSnapshot::idle());

        let handle = TimerHandle {
            commands: commands_tx,
            events: events.clone(),
            snapshot: snapshot_rx,
        };
        let service = Self {
            adapter,
            commands,
            events,
            snapshot,
            active: None,
        };
        (service, handle)
    }

    /// Process commands and ticks until every handle is dropped
    pub async fn run(mut self) {
        info!("Starting timer service with {} adapter", self.adapter.name());

        loop {
            let step = tokio::select! {
                command = self.commands.recv() => Step::Command(command),
                _ = next_tick(&mut self.active) => Step::Tick,
            };

            match step {
                Step::Command(Some(Command::Start { minutes, reply })) => {
                    let _ = reply.send(self.start(minutes));
                }
                Step::Command(Some(Command::Cancel { reply })) => {
                    let _ = reply.send(self.cancel());
                }
                Step::Command(None) => break,
                Step::Tick => self.tick().await,
            }
        }

        info!("Timer service stopped");
    }

    fn start(&mut self, minutes: Minutes) -> StartOutcome {
        if let Some(active) = &self.active {
            debug!("Start for {} minutes ignored, session already running", minutes);
            return StartOutcome::AlreadyRunning(active.session.clone());
        }

        let now = Instant::now();
        let session = CountdownSession::begin_at(minutes, now);
        let mut ticker = interval_at(now, TICK_PERIOD);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("Timer started for {} minutes, ends at {}", minutes, session.ends_at);
        self.snapshot.send_replace(TimerSnapshot::running(
            session.clone(),
            duration_ms(minutes.as_duration()),
        ));
        self.publish(TimerEvent::Started {
            session: session.clone(),
        });

        self.active = Some(ActiveSession {
            session: session.clone(),
            ticker,
        });
        StartOutcome::Started(session)
    }

    fn cancel(&mut self) -> CancelOutcome {
        if self.active.take().is_none() {
            debug!("Cancel ignored, no session running");
            return CancelOutcome::NotRunning;
        }

        info!("Timer cancelled");
        self.publish(TimerEvent::Cancelled);
        self.snapshot
            .send_replace(TimerSnapshot::ended(TimerPhase::Cancelled));
        CancelOutcome::Cancelled
    }

    async fn tick(&mut self) {
        let Some(active) = &self.active else {
            return;
        };

        match active.session.remaining_at(Instant::now()) {
            Some(left) => {
                let remaining_ms = duration_ms(left);
                self.snapshot
                    .send_replace(TimerSnapshot::running(active.session.clone(), remaining_ms));
                self.publish(TimerEvent::Progress { remaining_ms });
            }
            None => {
                self.active = None;
                info!("Timer expired, turning Bluetooth off");

                let outcome = disable_bluetooth(&self.adapter).await;
                match outcome.completion() {
                    Some(success) => self.publish(TimerEvent::Finished { success }),
                    None => debug!("Disable skipped ({:?}), no completion event", outcome),
                }
                self.snapshot
                    .send_replace(TimerSnapshot::ended(TimerPhase::Expired));
            }
        }
    }

    fn publish(&self, event: TimerEvent) {
        if self.events.send(event).is_err() {
            debug!("No timer event subscribers");
        }
    }
}

/// Spawn the timer service onto the runtime and return its handle
pub fn spawn_timer_service(adapter: Adapter) -> TimerHandle {
    let (service, handle) = TimerService::new(adapter);
    tokio::spawn(service.run());
    handle
}

async fn next_tick(active: &mut Option<ActiveSession>) {
    match active {
        Some(active) => {
            active.ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Wait for the next event, skipping over anything a slow reader missed
pub async fn recv_event(events: &mut broadcast::Receiver<TimerEvent>) -> Option<TimerEvent> {
    loop {
        match events.recv().await {
            Ok(event) => return Some(event),
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                warn!("Timer event subscriber lagged, skipped {} events", missed);
            }
            Err(broadcast::error::RecvError::Closed) => return None,
        }
    }
}
