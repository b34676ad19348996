//! Renderer control surface
//!
//! Start/stop lifecycle, output settings changes, and the point buffer
//! operations all producers and the consumer go through. Everything
//! here is callable from any task; the heavy lifting happens in the
//! tick/render/ingestion tasks.

use core::sync::atomic::Ordering;

use defmt::*;

use beamline_core::point::Point;

use crate::channels::{
    DAC_TICK, PERIOD_CHANGED, POINT_BUFFER, RENDERER_RUNNING, RENDER_STATE_CHANGED, SD_PLAYBACK,
    SD_START, SETTINGS,
};

pub fn is_running() -> bool {
    RENDERER_RUNNING.load(Ordering::Relaxed)
}

pub fn is_sd_playing() -> bool {
    SD_PLAYBACK.load(Ordering::Relaxed)
}

/// Enable the render tick.
pub fn start() {
    RENDERER_RUNNING.store(true, Ordering::Relaxed);
    RENDER_STATE_CHANGED.signal(());
    info!("Renderer started");
}

/// Disable the render tick, blank the output, drop buffered points.
pub fn stop() {
    RENDERER_RUNNING.store(false, Ordering::Relaxed);
    buffer_clear();
    // Wake the render task once so it parks the beam blanked instead of
    // holding the last output value.
    DAC_TICK.signal(());
    RENDER_STATE_CHANGED.signal(());
    info!("Renderer stopped");
}

/// Request file playback. The ingestion task re-opens and validates
/// the autoplay file; if that fails, playback stays inactive.
pub fn sd_start() {
    SD_START.signal(());
}

/// Mark file playback active (the ingestion task opened a valid file).
pub fn sd_started() {
    SD_PLAYBACK.store(true, Ordering::Relaxed);
}

/// Deactivate file playback; the ingestion task releases the file and
/// idles until the next [`sd_start`].
pub fn sd_stop() {
    SD_PLAYBACK.store(false, Ordering::Relaxed);
}

/// Change the output tick period in microseconds.
///
/// Periods below the minimum are rejected silently and the previous
/// value kept.
pub fn change_frequency(period_us: u32) {
    let accepted = SETTINGS.lock(|s| s.borrow_mut().set_period_us(period_us));
    if accepted {
        PERIOD_CHANGED.signal(period_us);
        debug!("Tick period now {} us", period_us);
    } else {
        warn!("Rejected tick period {} us", period_us);
    }
}

/// Change the brightness percentage (0-100); out-of-range values are
/// rejected silently and the previous value kept.
pub fn change_brightness(percent: u8) {
    let accepted = SETTINGS.lock(|s| s.borrow_mut().set_brightness(percent));
    if accepted {
        debug!("Brightness now {}%", percent);
    } else {
        warn!("Rejected brightness {}%", percent);
    }
}

pub fn current_period_us() -> u32 {
    SETTINGS.lock(|s| s.borrow().period_us())
}

pub fn current_brightness() -> u8 {
    SETTINGS.lock(|s| s.borrow().brightness())
}

/// Append points; `false` means some or all were dropped (buffer full).
pub fn buffer_push_many(points: &[Point]) -> bool {
    POINT_BUFFER.lock(|b| b.borrow_mut().try_push_many(points))
}

pub fn buffer_pop_one() -> Option<Point> {
    POINT_BUFFER.lock(|b| b.borrow_mut().pop_one())
}

pub fn buffer_clear() {
    POINT_BUFFER.lock(|b| b.borrow_mut().clear());
}

/// Advisory free-slot count for producer backpressure.
pub fn buffer_capacity_remaining() -> usize {
    POINT_BUFFER.lock(|b| b.borrow().capacity_remaining())
}
