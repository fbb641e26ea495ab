/*
 *  sched.rs
 *
 *  GlanceFace - the next meeting at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Cancellable one-shot alarms and the phase-aligned tick delay
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::time::Duration;
use tokio::time::Instant;

/// Delay until the next period boundary. Wake-ups land on round boundaries
/// regardless of when the previous frame finished, so the tick never drifts.
/// At an exact boundary the full period is returned, not zero.
pub fn tick_delay_ms(now_ms: u64, period_ms: u64) -> u64 {
    period_ms - now_ms % period_ms
}

/// A cancellable one-shot deadline. Arming always replaces any pending
/// deadline, so re-arming is idempotent and duplicate firings cannot happen.
/// The alarm holds no task of its own; the owner selects on
/// [`wait`](Alarm::wait) with an `is_armed` guard and clears it after firing.
#[derive(Debug, Default)]
pub struct Alarm {
    deadline: Option<Instant>,
}

impl Alarm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel any pending deadline and schedule a new one.
    pub fn arm_in(&mut self, delay: Duration) {
        self.deadline = Some(Instant::now() + delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Consume the deadline once it has fired. Must only be called from the
    /// select branch guarded by [`is_armed`](Self::is_armed).
    pub fn clear_fired(&mut self) {
        self.deadline = None;
    }

    /// Sleep until the armed deadline. With no deadline this pends forever;
    /// the select guard keeps that branch disabled.
    pub async fn wait(deadline: Option<Instant>) {
        match deadline {
            Some(at) => tokio::time::sleep_until(at).await,
            None => std::future::pending::<()>().await,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_delay_mid_period() {
        assert_eq!(tick_delay_ms(1500, 1000), 500);
    }

    #[test]
    fn tick_delay_at_boundary_is_full_period() {
        assert_eq!(tick_delay_ms(2000, 1000), 1000);
        assert_eq!(tick_delay_ms(0, 1000), 1000);
    }

    #[test]
    fn tick_delay_just_after_boundary() {
        assert_eq!(tick_delay_ms(2001, 1000), 999);
    }

    #[test]
    fn rearm_replaces_pending_deadline() {
        let mut alarm = Alarm::new();
        alarm.arm_in(Duration::from_secs(60));
        let first = alarm.deadline().unwrap();
        alarm.arm_in(Duration::from_secs(1));
        let second = alarm.deadline().unwrap();
        assert!(second < first);
        assert!(alarm.is_armed());
    }

    #[test]
    fn cancel_disarms() {
        let mut alarm = Alarm::new();
        alarm.arm_in(Duration::from_millis(5));
        alarm.cancel();
        assert!(!alarm.is_armed());
    }

    #[tokio::test]
    async fn wait_fires_at_deadline() {
        let mut alarm = Alarm::new();
        alarm.arm_in(Duration::from_millis(30));
        let before = Instant::now();
        Alarm::wait(alarm.deadline()).await;
        alarm.clear_fired();
        assert!(Instant::now() - before >= Duration::from_millis(30));
        assert!(!alarm.is_armed());
    }
}
