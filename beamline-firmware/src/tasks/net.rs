//! Network plumbing tasks
//!
//! The W5500 MAC driver and the network stack each need a task to run
//! their event loops in.

use embassy_embedded_hal::shared_bus::asynch::spi::SpiDevice;
use embassy_net_wiznet::chip::W5500;
use embassy_net_wiznet::{Device, Runner};
use embassy_rp::gpio::{Input, Output};
use embassy_rp::peripherals::SPI1;
use embassy_rp::spi::{Async, Spi};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;

pub type NetSpi = SpiDevice<'static, NoopRawMutex, Spi<'static, SPI1, Async>, Output<'static>>;

#[embassy_executor::task]
pub async fn ethernet_task(
    runner: Runner<'static, W5500, NetSpi, Input<'static>, Output<'static>>,
) -> ! {
    runner.run().await
}

#[embassy_executor::task]
pub async fn net_task(mut runner: embassy_net::Runner<'static, Device<'static>>) -> ! {
    runner.run().await
}
