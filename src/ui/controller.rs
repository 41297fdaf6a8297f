//! UI controller: input handling, service commands and the rendered view
//!
//! The controller never owns timer state. It keeps the last value it heard
//! and only hears anything between [`Controller::resume`] and
//! [`Controller::pause`].

use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

use super::validation::{validate_start, Preset};
use crate::{
    error::{AdapterError, ControllerError},
    services::{Adapter, AdapterState},
    state::TimerEvent,
    tasks::{recv_event, CancelOutcome, StartOutcome, TimerHandle},
    utils::format_remaining,
};

pub const IDLE_COUNTDOWN: &str = "00:00";

/// Which of the two layouts is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Minutes input, presets and the start action
    Input,
    /// Running countdown and the cancel action
    Countdown,
}

/// Everything the front-end draws
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub layout: Layout,
    pub input: String,
    pub countdown: String,
    pub bluetooth_on: bool,
}

impl View {
    pub fn indicator(&self) -> &'static str {
        if self.bluetooth_on {
            "ON"
        } else {
            "OFF"
        }
    }
}

/// Something the controller applied to its view while visible
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    Timer(TimerEvent),
    Adapter(AdapterState),
}

struct Subscriptions {
    events: broadcast::Receiver<TimerEvent>,
    adapter: watch::Receiver<AdapterState>,
}

pub struct Controller {
    timer: TimerHandle,
    adapter: Adapter,
    adapter_changes: watch::Receiver<AdapterState>,
    subscriptions: Option<Subscriptions>,
    view: View,
    messages: Vec<String>,
}

impl Controller {
    /// Build a controller; fails when the host has no Bluetooth adapter
    pub async fn new(
        timer: TimerHandle,
        adapter: Adapter,
        adapter_changes: watch::Receiver<AdapterState>,
    ) -> Result<Self, ControllerError> {
        let state = adapter.state().await?;
        if !state.present {
            return Err(AdapterError::Unavailable.into());
        }

        Ok(Self {
            timer,
            adapter,
            adapter_changes,
            subscriptions: None,
            view: View {
                layout: Layout::Input,
                input: String::new(),
                countdown: IDLE_COUNTDOWN.to_string(),
                bluetooth_on: state.enabled,
            },
            messages: Vec::new(),
        })
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    /// Messages shown to the user since the last call
    pub fn take_messages(&mut self) -> Vec<String> {
        std::mem::take(&mut self.messages)
    }

    pub fn set_input(&mut self, text: &str) {
        self.view.input = text.to_string();
    }

    /// Prefill the input with a preset; nothing is started
    pub fn select_preset(&mut self, preset: Preset) {
        self.view.input = preset.minutes().to_string();
    }

    /// Validate the input and ask the service to start
    pub async fn start(&mut self) -> Result<StartOutcome, ControllerError> {
        let bluetooth_on = self.query_adapter().await?.enabled;
        self.view.bluetooth_on = bluetooth_on;

        let minutes = match validate_start(&self.view.input, bluetooth_on) {
            Ok(minutes) => minutes,
            Err(e) => {
                self.messages.push(e.to_string());
                return Err(e.into());
            }
        };

        let outcome = self.timer.start(minutes).await?;
        self.view.layout = Layout::Countdown;
        match &outcome {
            StartOutcome::Started(_) => {
                info!("Controller started a {} minute timer", minutes);
                self.messages
                    .push(format!("Timer started for {} minutes", minutes));
            }
            StartOutcome::AlreadyRunning(_) => {
                self.messages.push("Timer already running".to_string());
            }
        }
        Ok(outcome)
    }

    /// Ask the service to cancel and go back to the input layout
    pub async fn cancel(&mut self) -> Result<CancelOutcome, ControllerError> {
        let outcome = self.timer.cancel().await?;
        self.reset();
        self.messages.push("Timer cancelled".to_string());
        Ok(outcome)
    }

    /// Start listening for timer and adapter updates
    pub fn resume(&mut self) {
        if self.subscriptions.is_some() {
            return;
        }
        debug!("Controller visible, subscribing to updates");

        let mut adapter = self.adapter_changes.clone();
        adapter.mark_unchanged();
        self.subscriptions = Some(Subscriptions {
            events: self.timer.subscribe(),
            adapter,
        });
    }

    /// Stop listening; nothing is delivered until the next `resume`
    pub fn pause(&mut self) {
        if self.subscriptions.take().is_some() {
            debug!("Controller hidden, dropped subscriptions");
        }
    }

    pub fn is_visible(&self) -> bool {
        self.subscriptions.is_some()
    }

    /// Wait for the next update and apply it to the view
    ///
    /// Returns `None` right away while paused, or once the sources are gone.
    pub async fn next_update(&mut self) -> Option<Update> {
        let subscriptions = self.subscriptions.as_mut()?;

        let event = tokio::select! {
            event = recv_event(&mut subscriptions.events) => Some(event?),
            changed = subscriptions.adapter.changed() => {
                changed.ok()?;
                None
            }
        };

        match event {
            Some(event) => {
                self.apply_timer_event(&event);
                Some(Update::Timer(event))
            }
            None => {
                // the monitor publishes freshly queried state, nothing to await here
                let state = *subscriptions.adapter.borrow_and_update();
                self.view.bluetooth_on = state.enabled;
                Some(Update::Adapter(state))
            }
        }
    }

    /// Apply a timer event to the view
    pub fn apply_timer_event(&mut self, event: &TimerEvent) {
        match event {
            TimerEvent::Started { .. } => self.view.layout = Layout::Countdown,
            TimerEvent::Progress { remaining_ms } => {
                self.view.layout = Layout::Countdown;
                self.view.countdown = format_remaining(*remaining_ms);
            }
            TimerEvent::Finished { success } => {
                self.reset();
                self.messages.push(if *success {
                    "Bluetooth turned off!".to_string()
                } else {
                    "Failed to turn off Bluetooth automatically".to_string()
                });
            }
            TimerEvent::Cancelled => self.reset(),
        }
    }

    async fn query_adapter(&self) -> Result<AdapterState, AdapterError> {
        let state = self.adapter.state().await?;
        if !state.present {
            return Err(AdapterError::Unavailable);
        }
        Ok(state)
    }

    fn reset(&mut self) {
        self.view.layout = Layout::Input;
        self.view.input.clear();
        self.view.countdown = IDLE_COUNTDOWN.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::InputError,
        services::SimulatedAdapter,
        state::TimerPhase,
        tasks::spawn_timer_service,
    };
    use std::time::Duration;
    use tokio::time::timeout;

    async fn controller_with(
        sim: &SimulatedAdapter,
    ) -> (Controller, TimerHandle, watch::Sender<AdapterState>) {
        let adapter = Adapter::Simulated(sim.clone());
        let timer = spawn_timer_service(adapter.clone());
        let (tx, rx) = watch::channel(sim.state());
        let controller = Controller::new(timer.clone(), adapter, rx).await.unwrap();
        (controller, timer, tx)
    }

    #[tokio::test]
    async fn missing_adapter_is_fatal() {
        let sim = SimulatedAdapter::absent();
        let adapter = Adapter::Simulated(sim.clone());
        let timer = spawn_timer_service(adapter.clone());
        let (_tx, rx) = watch::channel(sim.state());

        let result = Controller::new(timer, adapter, rx).await;
        assert!(matches!(
            result,
            Err(ControllerError::Adapter(AdapterError::Unavailable))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_input_never_reaches_the_service() {
        let sim = SimulatedAdapter::new(true, true);
        let (mut controller, timer, _adapter_tx) = controller_with(&sim).await;

        for input in ["0", "", "1000"] {
            controller.set_input(input);
            assert!(matches!(controller.start().await, Err(ControllerError::Input(_))));
            assert_eq!(controller.view().layout, Layout::Input);
        }

        assert_eq!(timer.snapshot().phase, TimerPhase::Idle);
        assert_eq!(
            controller.take_messages(),
            [
                "Please enter time between 1-999 minutes",
                "Please enter time in minutes",
                "Please enter time between 1-999 minutes",
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn start_rejected_when_bluetooth_already_off() {
        let sim = SimulatedAdapter::new(false, true);
        let (mut controller, timer, _adapter_tx) = controller_with(&sim).await;

        controller.select_preset(Preset::Five);
        let result = controller.start().await;

        assert!(matches!(
            result,
            Err(ControllerError::Input(InputError::BluetoothOff))
        ));
        assert_eq!(timer.snapshot().phase, TimerPhase::Idle);
        assert_eq!(controller.take_messages(), ["Bluetooth is already OFF"]);
    }

    #[tokio::test(start_paused = true)]
    async fn preset_only_prefills() {
        let sim = SimulatedAdapter::new(true, true);
        let (mut controller, timer, _adapter_tx) = controller_with(&sim).await;

        controller.select_preset(Preset::Thirty);

        assert_eq!(controller.view().input, "30");
        assert_eq!(controller.view().layout, Layout::Input);
        assert_eq!(timer.snapshot().phase, TimerPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn full_session_renders_countdown_and_success() {
        let sim = SimulatedAdapter::new(true, true);
        let (mut controller, _timer, _adapter_tx) = controller_with(&sim).await;
        controller.resume();

        controller.select_preset(Preset::Five);
        controller.start().await.unwrap();
        assert_eq!(controller.view().layout, Layout::Countdown);

        let mut saw_first_tick = false;
        while let Some(update) = controller.next_update().await {
            match update {
                Update::Timer(TimerEvent::Progress { remaining_ms: 300_000 }) => {
                    assert_eq!(controller.view().countdown, "05:00");
                    saw_first_tick = true;
                }
                Update::Timer(TimerEvent::Finished { .. }) => break,
                _ => {}
            }
        }

        assert!(saw_first_tick);
        assert_eq!(controller.view().layout, Layout::Input);
        assert_eq!(controller.view().countdown, IDLE_COUNTDOWN);
        assert!(!sim.state().enabled);
        assert_eq!(
            controller.take_messages(),
            ["Timer started for 5 minutes", "Bluetooth turned off!"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn missing_capability_shows_failure() {
        let sim = SimulatedAdapter::new(true, false);
        let (mut controller, _timer, _adapter_tx) = controller_with(&sim).await;
        controller.resume();

        controller.set_input("1");
        controller.start().await.unwrap();
        while let Some(update) = controller.next_update().await {
            if matches!(update, Update::Timer(TimerEvent::Finished { .. })) {
                break;
            }
        }

        assert!(sim.state().enabled);
        assert_eq!(
            controller.take_messages().last().map(String::as_str),
            Some("Failed to turn off Bluetooth automatically")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_resets_the_view() {
        let sim = SimulatedAdapter::new(true, true);
        let (mut controller, timer, _adapter_tx) = controller_with(&sim).await;
        controller.resume();

        controller.set_input("15");
        controller.start().await.unwrap();
        tokio::time::sleep(Duration::from_secs(3)).await;
        controller.apply_timer_event(&TimerEvent::Progress { remaining_ms: 897_000 });
        assert_eq!(controller.view().countdown, "14:57");

        assert_eq!(controller.cancel().await.unwrap(), CancelOutcome::Cancelled);
        assert_eq!(controller.view().layout, Layout::Input);
        assert_eq!(controller.view().countdown, IDLE_COUNTDOWN);
        assert!(controller.view().input.is_empty());
        assert_eq!(timer.snapshot().phase, TimerPhase::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn paused_controller_receives_nothing() {
        let sim = SimulatedAdapter::new(true, true);
        let (mut controller, _timer, _adapter_tx) = controller_with(&sim).await;
        controller.resume();
        controller.set_input("1");
        controller.start().await.unwrap();

        controller.pause();
        assert!(!controller.is_visible());
        assert_eq!(controller.next_update().await, None);

        // the session ends while hidden; resuming must not replay it
        tokio::time::sleep(Duration::from_secs(120)).await;
        controller.resume();
        let next = timeout(Duration::from_secs(60), controller.next_update()).await;
        assert!(next.is_err());
        assert_eq!(controller.view().layout, Layout::Countdown);
    }

    #[tokio::test(start_paused = true)]
    async fn adapter_change_refreshes_indicator() {
        let sim = SimulatedAdapter::new(true, true);
        let adapter = Adapter::Simulated(sim.clone());
        let timer = spawn_timer_service(adapter.clone());
        let (tx, rx) = watch::channel(sim.state());
        let mut controller = Controller::new(timer, adapter, rx).await.unwrap();
        controller.resume();
        assert_eq!(controller.view().indicator(), "ON");

        sim.set_enabled(false);
        tx.send_replace(sim.state());

        assert!(matches!(controller.next_update().await, Some(Update::Adapter(_))));
        assert_eq!(controller.view().indicator(), "OFF");
    }

    #[tokio::test(start_paused = true)]
    async fn indicator_follows_the_published_state() {
        let sim = SimulatedAdapter::new(true, true);
        let (mut controller, _timer, adapter_tx) = controller_with(&sim).await;
        controller.resume();

        // published value wins even before the adapter itself is re-read
        adapter_tx.send_replace(AdapterState::powered(false));
        let update = controller.next_update().await;

        assert_eq!(update, Some(Update::Adapter(AdapterState::powered(false))));
        assert_eq!(controller.view().indicator(), "OFF");
        assert!(sim.state().enabled);
    }
}
