//! Render tick task
//!
//! Stands in for the hardware timer ISR: fires at the configured output
//! period and hands the render task a one-slot wake token. If the
//! render task has not consumed the previous token the signal is a
//! no-op, so ticks are skipped rather than queued when the consumer
//! falls behind.

use defmt::*;
use embassy_time::{Duration, Ticker};

use crate::channels::{DAC_TICK, PERIOD_CHANGED, RENDER_STATE_CHANGED};
use crate::renderer;

#[embassy_executor::task]
pub async fn tick_task() {
    info!("Tick task started");

    let mut period_us = renderer::current_period_us();
    let mut ticker = Ticker::every(Duration::from_micros(period_us as u64));

    loop {
        if !renderer::is_running() {
            // Parked until start()/stop() flips the running flag.
            RENDER_STATE_CHANGED.wait().await;
            ticker.reset();
            continue;
        }

        if let Some(new_period) = PERIOD_CHANGED.try_take() {
            period_us = new_period;
            ticker = Ticker::every(Duration::from_micros(period_us as u64));
        }

        ticker.next().await;
        DAC_TICK.signal(());
    }
}
