//! Render task
//!
//! Consumes one point per tick token and writes it to the galvo/color
//! DAC. When the renderer is stopped (or the buffer runs dry) the beam
//! is held blanked at center rather than repeating the last point.

use defmt::*;
use embassy_embedded_hal::shared_bus::blocking::spi::SpiDeviceWithConfig;
use embassy_rp::gpio::Output;
use embassy_rp::peripherals::SPI0;
use embassy_rp::spi::{Blocking, Spi};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;

use beamline_core::point::Point;
use beamline_core::render::scale_brightness;
use beamline_drivers::dac::Dac80508;

use crate::channels::DAC_TICK;
use crate::renderer;

pub type DacSpi =
    SpiDeviceWithConfig<'static, NoopRawMutex, Spi<'static, SPI0, Blocking>, Output<'static>>;
pub type BoardDac = Dac80508<DacSpi>;

#[embassy_executor::task]
pub async fn render_task(mut dac: BoardDac, mut shutter: Output<'static>) {
    info!("Render task started");

    loop {
        DAC_TICK.wait().await;

        if !renderer::is_running() {
            shutter.set_low();
            if dac.write_point(Point::BLANK).is_err() {
                warn!("DAC blank write failed");
            }
            continue;
        }

        let point = renderer::buffer_pop_one().unwrap_or(Point::BLANK);
        let point = scale_brightness(point, renderer::current_brightness());

        if point.is_blanked() {
            shutter.set_low();
        } else {
            shutter.set_high();
        }

        if dac.write_point(point).is_err() {
            warn!("DAC point write failed");
        }
    }
}
