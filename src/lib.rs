/*
 *  lib.rs
 *
 *  GlanceFace - the next meeting at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Library root so the binary and the integration tests share one crate
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

pub mod config;
pub mod engine;
pub mod face;
pub mod feed;
pub mod palette;
pub mod sched;
pub mod sync;
pub mod timeline;

pub use engine::{FeedUpdate, PlatformSignal, RenderEngine};
pub use face::{DisplayMode, FaceRenderer};
pub use palette::Palette;
pub use timeline::{Event, EventTimeline};
