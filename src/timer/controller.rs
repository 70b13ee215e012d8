use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    time::Duration,
};

use chrono::Utc;
use log::{debug, info};
use tokio::sync::watch;

use super::{
    ClockSnapshot, ClockState, ConfigProvider, Notifier, SessionCycle, SessionType, TickCallback,
    TickHandle, TickOutcome, TickScheduler,
};

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

struct Ticker {
    generation: u64,
    handle: TickHandle,
}

struct ClockCore {
    cycle: SessionCycle,
    ticker: Option<Ticker>,
    /// Bumped for every scheduled tick source; ticks carrying an older value
    /// are ignored.
    generation: u64,
}

struct Shared {
    core: Mutex<ClockCore>,
    config: Arc<dyn ConfigProvider>,
    notifier: Arc<dyn Notifier>,
    scheduler: Arc<dyn TickScheduler>,
    state_tx: watch::Sender<ClockSnapshot>,
}

/// The Pomodoro session clock. Cheap to clone; clones drive the same clock.
#[derive(Clone)]
pub struct SessionClock {
    shared: Arc<Shared>,
}

impl SessionClock {
    pub fn new(
        config: Arc<dyn ConfigProvider>,
        notifier: Arc<dyn Notifier>,
        scheduler: Arc<dyn TickScheduler>,
    ) -> Self {
        let cycle = SessionCycle::new(config.duration_seconds(SessionType::Focus));
        let (state_tx, _) = watch::channel(cycle.snapshot());

        Self {
            shared: Arc::new(Shared {
                core: Mutex::new(ClockCore {
                    cycle,
                    ticker: None,
                    generation: 0,
                }),
                config,
                notifier,
                scheduler,
                state_tx,
            }),
        }
    }

    pub fn snapshot(&self) -> ClockSnapshot {
        self.lock().cycle.snapshot()
    }

    /// Every mutation is pushed to the returned receiver.
    pub fn subscribe(&self) -> watch::Receiver<ClockSnapshot> {
        self.shared.state_tx.subscribe()
    }

    /// Starts a fresh session, or resumes a paused one.
    ///
    /// Calling this while already active restarts the countdown from the full
    /// configured duration.
    pub fn start(&self) {
        let mut core = self.lock();
        self.begin(&mut core);
        self.publish(&core);
    }

    pub fn pause(&self) {
        let mut core = self.lock();
        if !core.cycle.pause() {
            return;
        }
        cancel_ticker(&mut core);
        info!(
            "Paused {} with {}s remaining",
            core.cycle.session_type(),
            core.cycle.remaining_seconds()
        );
        self.publish(&core);
    }

    pub fn stop(&self) {
        let mut core = self.lock();
        cancel_ticker(&mut core);
        core.cycle.halt();
        let total = self.shared.config.duration_seconds(core.cycle.session_type());
        core.cycle.snapshot_duration(total);
        info!("Stopped {}", core.cycle.session_type());
        self.publish(&core);
    }

    /// Advances to the next session without notifying.
    pub fn skip(&self) {
        let mut core = self.lock();
        cancel_ticker(&mut core);
        info!("Skipping {}", core.cycle.session_type());
        self.advance(&mut core);
        self.publish(&core);
    }

    pub fn restart_cycle(&self) {
        let mut core = self.lock();
        cancel_ticker(&mut core);
        core.cycle
            .restart(self.shared.config.duration_seconds(SessionType::Focus));
        info!("Restarted cycle");
        self.publish(&core);
    }

    fn begin(&self, core: &mut ClockCore) {
        cancel_ticker(core);

        if core.cycle.state() != ClockState::Paused {
            let total = self.shared.config.duration_seconds(core.cycle.session_type());
            core.cycle.snapshot_duration(total);
        }
        core.cycle.activate(Utc::now());

        core.generation = core.generation.wrapping_add(1);
        let generation = core.generation;
        let handle = self
            .shared
            .scheduler
            .schedule_repeating(TICK_INTERVAL, self.tick_callback(generation));
        core.ticker = Some(Ticker { generation, handle });

        debug!("Scheduled tick source #{generation}");
        info!(
            "{} running, {}s remaining",
            core.cycle.session_type(),
            core.cycle.remaining_seconds()
        );
    }

    fn tick_callback(&self, generation: u64) -> TickCallback {
        let shared: Weak<Shared> = Arc::downgrade(&self.shared);
        Arc::new(move || {
            if let Some(shared) = shared.upgrade() {
                SessionClock { shared }.on_tick(generation);
            }
        })
    }

    fn on_tick(&self, generation: u64) {
        let completed = {
            let mut core = self.lock();
            let current = core.ticker.as_ref().map(|ticker| ticker.generation);
            if core.cycle.state() != ClockState::Active || current != Some(generation) {
                debug!("Ignoring stale tick from source #{generation}");
                return;
            }

            match core.cycle.count_down() {
                TickOutcome::Counted => {
                    self.publish(&core);
                    None
                }
                TickOutcome::Expired => {
                    cancel_ticker(&mut core);
                    let finished = core.cycle.session_type();
                    info!("{finished} session complete");
                    self.advance(&mut core);
                    self.publish(&core);
                    Some(finished)
                }
            }
        };

        if let Some(finished) = completed {
            self.shared.notifier.on_session_complete(finished);
        }
    }

    fn advance(&self, core: &mut ClockCore) {
        let config = &self.shared.config;
        let next = core.cycle.next_session(config.long_break_interval());
        core.cycle.snapshot_duration(config.duration_seconds(next));

        core.cycle.halt();
        if config.auto_start_next_session() {
            self.begin(core);
        } else {
            info!("Next up: {next}");
        }
    }

    fn publish(&self, core: &ClockCore) {
        self.shared.state_tx.send_replace(core.cycle.snapshot());
    }

    fn lock(&self) -> MutexGuard<'_, ClockCore> {
        self.shared
            .core
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn cancel_ticker(core: &mut ClockCore) {
    if let Some(mut ticker) = core.ticker.take() {
        ticker.handle.cancel();
        debug!("Cancelled tick source #{}", ticker.generation);
    }
}
