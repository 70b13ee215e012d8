use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use tokio::{runtime::Handle, time};
use tokio_util::sync::CancellationToken;

pub type TickCallback = Arc<dyn Fn() + Send + Sync>;

/// A periodic timer primitive. Implementations must stop invoking the
/// callback once the returned handle is cancelled or dropped.
pub trait TickScheduler: Send + Sync {
    fn schedule_repeating(&self, period: Duration, on_tick: TickCallback) -> TickHandle;
}

/// Cancellation handle for one scheduled tick source.
pub struct TickHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl TickHandle {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_none()
    }
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Runs each tick source as a task on a tokio runtime.
#[derive(Clone)]
pub struct TokioScheduler {
    runtime: Handle,
}

impl TokioScheduler {
    pub fn new(runtime: Handle) -> Self {
        Self { runtime }
    }

    /// Panics outside of a tokio runtime, like `Handle::current`.
    pub fn current() -> Self {
        Self::new(Handle::current())
    }
}

impl TickScheduler for TokioScheduler {
    fn schedule_repeating(&self, period: Duration, on_tick: TickCallback) -> TickHandle {
        let token = CancellationToken::new();
        let child = token.clone();

        let task = self.runtime.spawn(async move {
            // `interval` fires immediately; the first tick is one period out.
            let mut interval = time::interval_at(time::Instant::now() + period, period);
            loop {
                tokio::select! {
                    biased;
                    _ = child.cancelled() => break,
                    _ = interval.tick() => on_tick(),
                }
            }
        });

        TickHandle::new(move || {
            token.cancel();
            task.abort();
        })
    }
}

struct ManualSource {
    id: u64,
    period: Duration,
    on_tick: TickCallback,
}

#[derive(Default)]
struct ManualSources {
    next_id: u64,
    scheduled_total: u64,
    live: Vec<ManualSource>,
}

/// A scheduler that only ticks when told to. Cloning shares the same sources.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    sources: Arc<Mutex<ManualSources>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires every live source `count` times, one round at a time. A source
    /// cancelled mid-round is skipped; one scheduled mid-round first fires in
    /// the next round.
    pub fn fire(&self, count: usize) {
        for _ in 0..count {
            let round: Vec<(u64, TickCallback)> = self
                .lock()
                .live
                .iter()
                .map(|source| (source.id, source.on_tick.clone()))
                .collect();

            for (id, on_tick) in round {
                if self.is_live(id) {
                    on_tick();
                }
            }
        }
    }

    /// Advances by `elapsed`, firing each source once per whole period.
    pub fn advance(&self, elapsed: Duration) {
        let period = self
            .lock()
            .live
            .iter()
            .map(|source| source.period)
            .min();
        if let Some(period) = period.filter(|p| !p.is_zero()) {
            let rounds = elapsed.as_millis() / period.as_millis().max(1);
            self.fire(usize::try_from(rounds).unwrap_or(usize::MAX));
        }
    }

    pub fn live_sources(&self) -> usize {
        self.lock().live.len()
    }

    pub fn scheduled_total(&self) -> u64 {
        self.lock().scheduled_total
    }

    fn is_live(&self, id: u64) -> bool {
        self.lock().live.iter().any(|source| source.id == id)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualSources> {
        self.sources.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TickScheduler for ManualScheduler {
    fn schedule_repeating(&self, period: Duration, on_tick: TickCallback) -> TickHandle {
        let id = {
            let mut sources = self.lock();
            let id = sources.next_id;
            sources.next_id += 1;
            sources.scheduled_total += 1;
            sources.live.push(ManualSource {
                id,
                period,
                on_tick,
            });
            id
        };

        let sources = Arc::downgrade(&self.sources);
        TickHandle::new(move || {
            if let Some(sources) = sources.upgrade() {
                sources
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .live
                    .retain(|source| source.id != id);
            }
        })
    }
}
