//! Services the watchface consumes from its host
//!
//! Event delivery goes through [`WatchEvent`]: the host only forwards events
//! of the services the face subscribed to.

use core::time::Duration;

use chrono::NaiveDateTime;
use enumset::EnumSet;

use super::time::TimeUnit;
use crate::BatteryChargeState;

/// Battery state notifications
pub trait BatteryStateService {
    /// Current state, without waiting for a change
    fn peek(&self) -> BatteryChargeState;

    /// Start delivering [`WatchEvent::Battery`]
    fn subscribe_battery(&mut self);

    fn unsubscribe_battery(&mut self);
}

/// Periodic clock notifications
pub trait TickTimerService {
    /// Start delivering [`WatchEvent::Tick`] whenever one of `units` changes
    fn subscribe_ticks(&mut self, units: EnumSet<TimeUnit>);

    fn unsubscribe_ticks(&mut self);
}

/// Single shot application timer
pub trait AppTimer {
    /// Deliver [`WatchEvent::AnimationTimer`] once after `timeout`,
    /// replacing any pending registration
    fn register(&mut self, timeout: Duration);

    /// Drop a pending registration
    fn cancel(&mut self);
}

/// Wall clock
pub trait WallClock {
    fn now(&self) -> NaiveDateTime;

    /// User prefers the 24h clock format
    fn is_24h_style(&self) -> bool;
}

/// Everything a watchface needs from the host
pub trait Host: BatteryStateService + TickTimerService + AppTimer + WallClock {}

impl<T> Host for T where T: BatteryStateService + TickTimerService + AppTimer + WallClock {}

/// Events dispatched to the watchface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEvent {
    Battery(BatteryChargeState),
    Tick {
        time: NaiveDateTime,
        units: EnumSet<TimeUnit>,
    },
    AnimationTimer,
}
