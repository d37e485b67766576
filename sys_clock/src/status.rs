//! Diagnostic snapshot of the system timer

use serde::{Deserialize, Serialize};

use crate::timer_core::TimerMode;

/// Point-in-time view of the timer, for status queries
///
/// Assembled from several independent reads, so it is a best-effort
/// snapshot: an interrupt landing in between can make the fields disagree
/// by the ticks it announced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerStatus {
    /// Active operating mode
    pub mode: TimerMode,
    /// Counter cycles per kernel tick
    pub cycles_per_tick: u32,
    /// Longest wait a single timeout can request
    pub max_ticks: u32,
    /// Counter value (tickless) or tick count (periodic) of the last announce
    pub last_mark: u32,
    /// Software tick counter (periodic only)
    pub tick_counter: Option<u32>,
    /// Tick count of the next announce (periodic only)
    pub pending_target: Option<u32>,
    /// Ticks elapsed but not yet announced
    pub elapsed_ticks: u32,
    /// Whether `init()` completed
    pub initialized: bool,
}
