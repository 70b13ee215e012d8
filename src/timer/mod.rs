pub mod controller;
pub mod ports;
pub mod scheduler;
pub mod state;

pub use controller::{SessionClock, TICK_INTERVAL};
pub use ports::{ConfigProvider, Notifier, SilentNotifier};
pub use scheduler::{ManualScheduler, TickCallback, TickHandle, TickScheduler, TokioScheduler};
pub use state::{ClockSnapshot, ClockState, SessionCycle, SessionStyle, SessionType, TickOutcome};
