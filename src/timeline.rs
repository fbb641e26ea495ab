/*
 *  timeline.rs
 *
 *  GlanceFace - the next meeting at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Upcoming-event timeline: sorted storage, purge-on-query lookup
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

use chrono::{Local, TimeZone, Timelike};
use log::debug;
use std::collections::VecDeque;

/// A single upcoming calendar event. The start instant is epoch milliseconds
/// and immutable once constructed; events are replaced wholesale, never
/// edited in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: i64,
    pub start_ms: i64,
    pub title: String,
    pub calendar_name: String,
}

impl Event {
    pub fn new(id: i64, start_ms: i64, title: &str, calendar_name: &str) -> Self {
        Self {
            id,
            start_ms,
            title: title.to_string(),
            calendar_name: calendar_name.to_string(),
        }
    }

    /// Whole minutes until the event start, truncated toward zero.
    pub fn minutes_to(&self, now_ms: i64) -> i64 {
        (self.start_ms - now_ms) / 60_000
    }

    pub fn is_after(&self, now_ms: i64) -> bool {
        now_ms < self.start_ms
    }

    /// Minute-of-hour of the start instant in local time, used to place the
    /// indicator wedge on the 12-hour face.
    pub fn minute_of_hour(&self) -> u32 {
        Local
            .timestamp_millis_opt(self.start_ms)
            .single()
            .map(|dt| dt.minute())
            .unwrap_or(0)
    }
}

/// Time-ordered list of upcoming events, owned by the render engine and
/// threaded through it - never a process-wide singleton.
///
/// Mutated two ways only: a bulk [`replace`](Self::replace) when a new feed
/// batch arrives, and the destructive purge inside
/// [`upcoming_event`](Self::upcoming_event).
#[derive(Debug, Default)]
pub struct EventTimeline {
    events: VecDeque<Event>,
}

impl EventTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically replace the stored timeline. Stable sort ascending by
    /// start instant, so equal instants keep their arrival order.
    pub fn replace(&mut self, mut events: Vec<Event>) {
        events.sort_by_key(|e| e.start_ms);
        debug!("timeline replaced: {} event(s)", events.len());
        self.events = events.into();
    }

    /// Earliest stored event strictly after `now_ms`. Events at or before
    /// `now_ms` are discarded first; the purge is permanent. Idempotent for
    /// a fixed `now_ms`: the second call finds nothing left to purge.
    pub fn upcoming_event(&mut self, now_ms: i64) -> Option<&Event> {
        let mut purged = 0usize;
        while self.events.front().is_some_and(|e| !e.is_after(now_ms)) {
            self.events.pop_front();
            purged += 1;
        }
        if purged > 0 {
            debug!("timeline purged {} expired event(s)", purged);
        }
        self.events.front()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(id: i64, start_ms: i64) -> Event {
        Event::new(id, start_ms, &format!("event {id}"), "work")
    }

    #[test]
    fn replace_sorts_ascending_by_start() {
        let mut timeline = EventTimeline::new();
        timeline.replace(vec![ev(1, 10), ev(2, 20), ev(3, 5)]);
        let order: Vec<i64> = timeline.events.iter().map(|e| e.id).collect();
        assert_eq!(order, vec![3, 1, 2]);
    }

    #[test]
    fn replace_keeps_arrival_order_on_ties() {
        let mut timeline = EventTimeline::new();
        timeline.replace(vec![ev(7, 10), ev(8, 10), ev(9, 5)]);
        let order: Vec<i64> = timeline.events.iter().map(|e| e.id).collect();
        assert_eq!(order, vec![9, 7, 8]);
    }

    #[test]
    fn upcoming_event_purges_and_returns_next() {
        let mut timeline = EventTimeline::new();
        timeline.replace(vec![ev(1, 10), ev(2, 20), ev(3, 5)]);

        let next = timeline.upcoming_event(12).expect("event expected");
        assert_eq!(next.id, 2);
        // E3@5 and E1@10 are gone for good.
        assert_eq!(timeline.len(), 1);
    }

    #[test]
    fn upcoming_event_is_idempotent() {
        let mut timeline = EventTimeline::new();
        timeline.replace(vec![ev(1, 10), ev(2, 20), ev(3, 5)]);

        let first = timeline.upcoming_event(12).map(|e| e.id);
        let second = timeline.upcoming_event(12).map(|e| e.id);
        assert_eq!(first, Some(2));
        assert_eq!(second, Some(2));
        assert_eq!(timeline.len(), 1);
    }

    #[test]
    fn start_at_now_is_expired() {
        let mut timeline = EventTimeline::new();
        timeline.replace(vec![ev(1, 20)]);
        // Strictly-greater comparison: an event starting exactly now is gone.
        assert!(timeline.upcoming_event(20).is_none());
        assert!(timeline.is_empty());
    }

    #[test]
    fn empty_timeline_returns_none() {
        let mut timeline = EventTimeline::new();
        assert!(timeline.upcoming_event(0).is_none());
    }

    #[test]
    fn minutes_to_truncates_toward_zero() {
        let e = ev(1, 150_000);
        assert_eq!(e.minutes_to(0), 2);
        assert_eq!(e.minutes_to(100_000), 0);
        assert_eq!(e.minutes_to(150_000), 0);
        assert_eq!(e.minutes_to(200_000), 0);
    }
}
