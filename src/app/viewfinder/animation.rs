// SPDX-License-Identifier: GPL-3.0-only

//! Scan bar animation
//!
//! The bar sweeps linearly from the top of the viewfinder to the bottom and
//! jumps back, forever. Cycle boundaries are computed from the cycle start
//! instant rather than accumulated frame deltas, so missed or late ticks
//! never shift later cycles.
//!
//! The ticks come from a subscription that lives as long as its
//! [`ScanBarTimer`] is not cancelled. The overlay owns the timer and cancels
//! it on unmount or drop.

use crate::constants::timing;
use cosmic::iced::Subscription;
use futures::SinkExt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

static NEXT_TIMER_ID: AtomicU64 = AtomicU64::new(1);

/// Cancellation handle for the scan bar tick stream
#[derive(Debug, Clone)]
pub struct ScanBarTimer {
    id: u64,
    cancelled: Arc<AtomicBool>,
}

impl Default for ScanBarTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanBarTimer {
    pub fn new() -> Self {
        Self {
            id: NEXT_TIMER_ID.fetch_add(1, Ordering::Relaxed),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Unique per timer, used as the subscription id
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::AcqRel) {
            debug!(timer = self.id, "Scan bar timer cancelled");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Tick stream for this timer
    ///
    /// Ends on its own once the timer is cancelled.
    pub fn subscription<M>(&self, on_tick: fn(Instant) -> M) -> Subscription<M>
    where
        M: Send + 'static,
    {
        let id = self.id;
        let cancelled = Arc::clone(&self.cancelled);

        Subscription::run_with_id(
            ("scan-bar", id),
            cosmic::iced::stream::channel(1, move |mut output| async move {
                let mut interval = tokio::time::interval(timing::SCAN_BAR_FRAME);
                interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

                loop {
                    interval.tick().await;
                    if cancelled.load(Ordering::Acquire) {
                        break;
                    }
                    if output.send(on_tick(Instant::now())).await.is_err() {
                        break;
                    }
                }

                debug!(timer = id, "Scan bar tick stream ended");
            }),
        )
    }
}

/// Position of the scan bar over time
#[derive(Debug)]
pub struct ScanBarAnimation {
    /// Distance covered by one sweep (the viewfinder height)
    travel: f32,
    duration: Duration,
    cycle_start: Instant,
    /// Offset carried between ticks, reset to zero at every cycle boundary
    offset: f32,
    /// Value returned by the last tick, what the bar is drawn at
    position: f32,
    cycles: u64,
    timer: ScanBarTimer,
}

impl ScanBarAnimation {
    /// Start a new cycle at `now`
    pub fn start(travel: f32, duration: Duration, now: Instant) -> Self {
        Self {
            travel,
            duration,
            cycle_start: now,
            offset: 0.0,
            position: 0.0,
            cycles: 0,
            timer: ScanBarTimer::new(),
        }
    }

    /// Advance to `now` and return the offset to draw
    pub fn tick(&mut self, now: Instant) -> f32 {
        if self.timer.is_cancelled() {
            return self.position;
        }

        if self.duration.is_zero() {
            self.offset = 0.0;
            self.position = 0.0;
            return 0.0;
        }

        let elapsed = now.saturating_duration_since(self.cycle_start);
        if elapsed >= self.duration {
            let completed =
                (elapsed.as_nanos() / self.duration.as_nanos()).min(u32::MAX as u128) as u32;
            self.cycle_start += self.duration * completed;
            self.cycles += u64::from(completed);
            self.offset = 0.0;
            self.position = self.travel;
            trace!(cycles = self.cycles, "Scan bar cycle complete");
            return self.travel;
        }

        self.offset = self.travel * (elapsed.as_secs_f32() / self.duration.as_secs_f32());
        self.position = self.offset;
        self.offset
    }

    /// Change travel or duration; the running cycle keeps its start
    pub fn retarget(&mut self, travel: f32, duration: Duration) {
        self.travel = travel;
        self.duration = duration;
    }

    /// Offset state between ticks
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Offset the bar is drawn at
    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn cycle_start(&self) -> Instant {
        self.cycle_start
    }

    pub fn timer(&self) -> &ScanBarTimer {
        &self.timer
    }

    pub fn cancel(&self) {
        self.timer.cancel();
    }
}

impl Drop for ScanBarAnimation {
    fn drop(&mut self) {
        self.timer.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_linear_progress() {
        let t0 = Instant::now();
        let mut anim = ScanBarAnimation::start(200.0, ms(2000), t0);
        assert_eq!(anim.tick(t0), 0.0);
        assert!((anim.tick(t0 + ms(500)) - 50.0).abs() < 0.01);
        assert!((anim.tick(t0 + ms(1000)) - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_zero_duration_stays_at_top() {
        let t0 = Instant::now();
        let mut anim = ScanBarAnimation::start(200.0, Duration::ZERO, t0);
        assert_eq!(anim.tick(t0 + ms(10)), 0.0);
        assert_eq!(anim.offset(), 0.0);
    }

    #[test]
    fn test_late_tick_keeps_cycle_grid() {
        let t0 = Instant::now();
        let mut anim = ScanBarAnimation::start(100.0, ms(1000), t0);
        // Three and a half cycles elapse between ticks
        assert_eq!(anim.tick(t0 + ms(3500)), 100.0);
        assert_eq!(anim.cycles(), 3);
        assert_eq!(anim.cycle_start(), t0 + ms(3000));
        assert!((anim.tick(t0 + ms(3750)) - 75.0).abs() < 0.01);
    }

    #[test]
    fn test_cancelled_tick_is_noop() {
        let t0 = Instant::now();
        let mut anim = ScanBarAnimation::start(200.0, ms(1000), t0);
        let before = anim.tick(t0 + ms(250));
        anim.cancel();
        assert_eq!(anim.tick(t0 + ms(900)), before);
        assert_eq!(anim.cycles(), 0);
    }

    #[test]
    fn test_timers_are_unique() {
        let a = ScanBarTimer::new();
        let b = ScanBarTimer::new();
        assert_ne!(a.id(), b.id());

        let shared = a.clone();
        a.cancel();
        assert!(shared.is_cancelled());
        assert!(!b.is_cancelled());
    }
}
