//! Inter-task state and signals
//!
//! The point buffer is the only data shared across task boundaries; it
//! sits behind a critical-section mutex so pushes from network tasks
//! and pops from the render task never observe torn cursors. Everything
//! else is a scalar flag (written by one task type, read by others) or
//! a single-slot signal.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;
use portable_atomic::AtomicBool;

use beamline_core::buffer::{PointRing, POINT_BUFFER_CAPACITY};
use beamline_core::render::RenderSettings;

/// The shared point buffer: three producers, one consumer.
pub static POINT_BUFFER: Mutex<CriticalSectionRawMutex, RefCell<PointRing<POINT_BUFFER_CAPACITY>>> =
    Mutex::new(RefCell::new(PointRing::new()));

/// Output settings (tick period, brightness), guarded like the buffer.
pub static SETTINGS: Mutex<CriticalSectionRawMutex, RefCell<RenderSettings>> =
    Mutex::new(RefCell::new(RenderSettings::new()));

/// One-slot tick token from the tick task to the render task.
///
/// Signalling while a token is already pending is a no-op: if the
/// consumer falls behind, ticks are skipped, never queued.
pub static DAC_TICK: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// New tick period accepted (microseconds); the tick task re-arms.
pub static PERIOD_CHANGED: Signal<CriticalSectionRawMutex, u32> = Signal::new();

/// Rendering was started or stopped; wakes the parked tick task.
pub static RENDER_STATE_CHANGED: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// File playback requested; wakes the idle SD ingestion task so it
/// re-opens and validates the autoplay file.
pub static SD_START: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Render tick enabled (the "ISR running" flag).
pub static RENDERER_RUNNING: AtomicBool = AtomicBool::new(false);

/// File playback active (the SD ingestion task is producing).
pub static SD_PLAYBACK: AtomicBool = AtomicBool::new(false);
