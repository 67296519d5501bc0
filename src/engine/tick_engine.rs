//! Fixed-rate poll loop with statum state machine
//!
//! Each tick reads the controller once and runs motion, scroll, button dispatch
//! and triggers, in that order, against a snapshot of the mapping table.
//!
//! # State Machine
//!
//! ```text
//! Ready ──► Ticking ──► Stopping
//!              │            ▲
//!              └────────────┘
//!               (cancelled)
//! ```
//!
//! [`PollLoop`] is the handle the control surface talks to. It spawns the engine
//! into a tokio task and owns the cancellation token used to stop it.

use crate::controller::{DeviceInfo, DevicePoll, DeviceSnapshot, InputDevice};
use crate::engine::dispatcher::ActionDispatcher;
use crate::engine::edge::{scroll_amount, EdgeDetector};
use crate::engine::motion::{displacement, to_raw_axis, MotionIntegrator, BASE_SPEED};
use crate::engine::runtime::RuntimeMode;
use crate::engine::{EngineError, EngineSettings, StatusEvent};
use crate::mapping::{InputCode, MappingTable, Slot};
use crate::platform::Platform;
use chrono::{DateTime, Local};
use statum::{machine, state};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub type SharedDevice = Arc<Mutex<Box<dyn InputDevice>>>;
pub type SharedPlatform = Arc<Mutex<Box<dyn Platform>>>;
pub type SharedMapping = Arc<RwLock<MappingTable>>;

/// States of the tick engine lifecycle
#[state]
#[derive(Debug, Clone)]
pub enum TickEngineState {
    Ready,    // Collaborators wired, nothing ticking yet
    Ticking,  // Running the fixed-rate loop
    Stopping, // Cancelled, winding down
}

// Loop statistics, reported periodically
struct TickStats {
    ticks: u64,
    overruns: u64,
    busiest: Duration,
    last_report: DateTime<Local>,
    interval: chrono::Duration,
}

impl TickStats {
    fn new(interval: Duration) -> Self {
        Self {
            ticks: 0,
            overruns: 0,
            busiest: Duration::ZERO,
            last_report: Local::now(),
            interval: chrono::Duration::from_std(interval)
                .unwrap_or_else(|_| chrono::Duration::seconds(30)),
        }
    }

    fn record(&mut self, elapsed: Duration, budget: Duration) {
        self.ticks += 1;
        if elapsed > budget {
            self.overruns += 1;
        }
        self.busiest = self.busiest.max(elapsed);
    }

    fn report_if_due(&mut self) {
        let now = Local::now();
        if now - self.last_report > self.interval {
            info!(
                "Poll loop stats: {} ticks in last {} seconds (avg {:.1}/sec), {} overruns, busiest tick {:?}",
                self.ticks,
                self.interval.num_seconds(),
                self.ticks as f64 / self.interval.num_seconds().max(1) as f64,
                self.overruns,
                self.busiest
            );
            self.ticks = 0;
            self.overruns = 0;
            self.busiest = Duration::ZERO;
            self.last_report = now;
        }
    }
}

/// Translation core for one Running period
///
/// Owns the motion remainder and the edge state, so both start fresh on every
/// start.
#[machine]
pub struct TickEngine<S: TickEngineState> {
    device: SharedDevice,
    platform: SharedPlatform,
    mapping: SharedMapping,
    mode: Arc<RuntimeMode>,
    status_sender: mpsc::Sender<StatusEvent>,
    settings: EngineSettings,
    motion: MotionIntegrator,
    edges: EdgeDetector,
    stats: TickStats,
    device_present: bool,
}

impl TickEngine<Ready> {
    pub fn create(
        device: SharedDevice,
        platform: SharedPlatform,
        mapping: SharedMapping,
        mode: Arc<RuntimeMode>,
        status_sender: mpsc::Sender<StatusEvent>,
        settings: EngineSettings,
    ) -> Self {
        let stats = TickStats::new(settings.stats_interval);
        Self::new(
            device,
            platform,
            mapping,
            mode,
            status_sender,
            settings,
            MotionIntegrator::new(), // motion
            EdgeDetector::new(),     // edges
            stats,
            true, // device_present
        )
    }

    pub fn start(self) -> TickEngine<Ticking> {
        info!("Starting poll loop at {} Hz", self.settings.tick_rate_hz);
        self.transition()
    }
}

impl TickEngine<Ticking> {
    /// Runs one tick against the current mapping snapshot
    pub async fn tick(&mut self) {
        let mapping = *self.mapping.read().await;
        self.process(&mapping);
    }

    fn process(&mut self, mapping: &MappingTable) {
        let poll = match self.device.lock() {
            Ok(mut device) => device.poll(),
            Err(e) => {
                error!("Device lock poisoned: {}", e);
                return;
            }
        };

        let snapshot = match poll {
            DevicePoll::Snapshot(snapshot) => {
                self.device_present = true;
                snapshot
            }
            DevicePoll::NotConnected => {
                if self.device_present {
                    warn!("Controller not connected, idling");
                    self.device_present = false;
                    self.publish(StatusEvent::DeviceLost);
                }
                return;
            }
        };

        let platform_handle = self.platform.clone();
        let mut platform = match platform_handle.lock() {
            Ok(platform) => platform,
            Err(e) => {
                error!("Platform lock poisoned: {}", e);
                return;
            }
        };

        // The gate is read once; a toggle pressed this tick takes effect next tick
        if self.mode.is_input_disabled() {
            self.handle_buttons(&snapshot, mapping, &mut **platform, true);
            return;
        }

        self.apply_motion(&snapshot, &mut **platform);

        if let Some(amount) = scroll_amount(to_raw_axis(snapshot.right_stick.y)) {
            ActionDispatcher::new(&mut **platform, mapping, &self.mode, &self.status_sender)
                .scroll(amount);
        }

        self.handle_buttons(&snapshot, mapping, &mut **platform, false);

        let mut dispatcher = ActionDispatcher::new(
            &mut **platform,
            mapping,
            &self.mode,
            &self.status_sender,
        );
        for (side, edge) in self
            .edges
            .update_triggers(snapshot.left_trigger, snapshot.right_trigger)
        {
            debug!("{:?} trigger {:?}", side, edge);
            dispatcher.dispatch_trigger(side, edge);
        }
    }

    fn handle_buttons(
        &mut self,
        snapshot: &DeviceSnapshot,
        mapping: &MappingTable,
        platform: &mut dyn Platform,
        disabled: bool,
    ) {
        let transitions = if disabled {
            let toggle_code = mapping.effective_binding(Slot::DisableToggle);
            self.edges.update_filtered(&snapshot.buttons, |index| {
                u16::try_from(index).ok().map(InputCode) == toggle_code
            })
        } else {
            self.edges.update(&snapshot.buttons)
        };

        let mut dispatcher =
            ActionDispatcher::new(platform, mapping, &self.mode, &self.status_sender);
        for transition in transitions {
            if disabled {
                dispatcher.dispatch_while_disabled(transition);
            } else {
                dispatcher.dispatch(transition);
            }
        }
    }

    fn apply_motion(&mut self, snapshot: &DeviceSnapshot, platform: &mut dyn Platform) {
        let stick = (
            to_raw_axis(snapshot.left_stick.x),
            to_raw_axis(snapshot.left_stick.y),
        );
        let speed = BASE_SPEED * self.mode.sensitivity();
        let Some(delta) = displacement(stick.0, stick.1, speed) else {
            return;
        };

        let cursor = match platform.cursor_position() {
            Ok(cursor) => cursor,
            Err(e) => {
                error!("Failed to read cursor position: {}", e);
                return;
            }
        };
        let (x, y) = self.motion.advance(cursor, delta);
        if (x, y) != cursor {
            if let Err(e) = platform.set_cursor_position(x, y) {
                error!("Failed to move cursor: {}", e);
            }
        }
    }

    fn publish(&self, event: StatusEvent) {
        if let Err(e) = self.status_sender.try_send(event) {
            warn!("Failed to publish status event: {}", e);
        }
    }

    /// Ticks at the configured rate until `cancel` fires
    ///
    /// A tick that overruns its budget is followed directly by the next one;
    /// missed ticks are not made up.
    pub async fn run_until_cancelled(mut self, cancel: CancellationToken) -> TickEngine<Stopping> {
        let period = self.settings.tick_period();
        info!("Poll loop running with {:?} tick period", period);

        loop {
            if cancel.is_cancelled() {
                break;
            }

            let started = Instant::now();
            self.tick().await;
            let elapsed = started.elapsed();

            self.stats.record(elapsed, period);
            self.stats.report_if_due();

            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Stop requested for poll loop");
                    break;
                }

                _ = tokio::time::sleep(period.saturating_sub(elapsed)) => {}
            }
        }

        self.transition()
    }
}

impl TickEngine<Stopping> {
    pub fn finish(self) {
        info!(
            "Poll loop finished ({} ticks since last report)",
            self.stats.ticks
        );
    }
}

/// Lifecycle handle of the poll loop
///
/// At most one loop task runs at a time. `start` on a running loop and `stop` on
/// a stopped one are no-ops.
pub struct PollLoop {
    device: SharedDevice,
    platform: SharedPlatform,
    mapping: SharedMapping,
    mode: Arc<RuntimeMode>,
    status_sender: mpsc::Sender<StatusEvent>,
    settings: EngineSettings,
    task_handle: Option<JoinHandle<()>>,
    cancel: Option<CancellationToken>,
}

impl PollLoop {
    pub fn new(
        device: SharedDevice,
        platform: SharedPlatform,
        mapping: SharedMapping,
        mode: Arc<RuntimeMode>,
        status_sender: mpsc::Sender<StatusEvent>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            device,
            platform,
            mapping,
            mode,
            status_sender,
            settings,
            task_handle: None,
            cancel: None,
        }
    }

    pub fn mode(&self) -> &Arc<RuntimeMode> {
        &self.mode
    }

    pub fn mapping(&self) -> &SharedMapping {
        &self.mapping
    }

    pub fn is_running(&self) -> bool {
        self.task_handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// (Re)acquires the first available controller
    pub fn connect(&self) -> Result<DeviceInfo, EngineError> {
        let mut device = self
            .device
            .lock()
            .map_err(|e| EngineError::TaskFailed(format!("Device lock poisoned: {}", e)))?;
        match device.connect() {
            Ok(info) => {
                info!("Connected to {} ({})", info.name, info.id);
                Ok(info)
            }
            Err(e) => {
                warn!("Connect failed: {}", e);
                Err(e.into())
            }
        }
    }

    fn device_connected(&self) -> bool {
        match self.device.lock() {
            Ok(device) => device.is_connected(),
            Err(e) => {
                error!("Device lock poisoned: {}", e);
                false
            }
        }
    }

    /// Spawns the loop task
    ///
    /// Refused with [`EngineError::DeviceUnavailable`] when no controller is
    /// connected.
    pub fn start(&mut self) -> Result<(), EngineError> {
        if self.is_running() {
            debug!("Poll loop already running");
            return Ok(());
        }
        if !self.device_connected() {
            error!("Cannot start without a connected controller");
            return Err(EngineError::DeviceUnavailable);
        }

        let engine = TickEngine::create(
            self.device.clone(),
            self.platform.clone(),
            self.mapping.clone(),
            self.mode.clone(),
            self.status_sender.clone(),
            self.settings.clone(),
        )
        .start();

        let cancel = CancellationToken::new();
        let child = cancel.clone();
        let task_handle = tokio::spawn(async move {
            let stopping = engine.run_until_cancelled(child).await;
            stopping.finish();
        });

        self.cancel = Some(cancel);
        self.task_handle = Some(task_handle);
        self.mode.set_running(true);
        self.publish(StatusEvent::Started);
        Ok(())
    }

    /// Cancels the loop and waits for it, bounded by the join timeout
    ///
    /// Best effort: if the task has not exited within the timeout it is left to
    /// finish its current tick in the background and stop still completes.
    pub async fn stop(&mut self) {
        let Some(cancel) = self.cancel.take() else {
            debug!("Poll loop already stopped");
            return;
        };
        cancel.cancel();

        if let Some(handle) = self.task_handle.take() {
            match tokio::time::timeout(self.settings.join_timeout, handle).await {
                Ok(Ok(())) => info!("Poll loop stopped"),
                Ok(Err(e)) => error!("Poll loop task panicked: {}", e),
                Err(_) => warn!(
                    "Poll loop did not exit within {:?}, detaching",
                    self.settings.join_timeout
                ),
            }
        }

        self.mode.set_running(false);
        self.publish(StatusEvent::Stopped);
    }

    fn publish(&self, event: StatusEvent) {
        if let Err(e) = self.status_sender.try_send(event) {
            warn!("Failed to publish status event: {}", e);
        }
    }
}
