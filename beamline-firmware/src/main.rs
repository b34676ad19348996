//! Laser projector firmware entry point
//!
//! Brings up the SPI buses (DAC + SD card on SPI0, W5500 Ethernet on
//! SPI1), the network stack, and the render pipeline tasks, then starts
//! the renderer.

#![no_std]
#![no_main]

use core::cell::RefCell;

use defmt::*;
use embassy_executor::Spawner;
use embassy_net::{Config as NetConfig, StackResources};
use embassy_net_wiznet::State as WiznetState;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::{SPI0, SPI1};
use embassy_rp::spi::{self, Spi};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::mutex::Mutex as AsyncMutex;
use embassy_time::Timer;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use embassy_embedded_hal::shared_bus::asynch::spi::SpiDevice;
use embassy_embedded_hal::shared_bus::blocking::spi::SpiDeviceWithConfig;

use beamline_drivers::dac::Dac80508;
use beamline_protocol::idn::DeviceIdentity;

mod channels;
mod renderer;
mod storage;
mod tasks;

/// Locally administered MAC; also the IDN unit ID.
const MAC_ADDR: [u8; 6] = [0x02, 0xB3, 0x4A, 0x11, 0x4E, 0x01];

const IDN_HOST_NAME: &str = "BeamlineX16";
const IDN_SERVICE_NAME: &str = "BeamlineX16 Laser";

static DAC_SPI_BUS: StaticCell<
    BlockingMutex<NoopRawMutex, RefCell<Spi<'static, SPI0, spi::Blocking>>>,
> = StaticCell::new();
static NET_SPI_BUS: StaticCell<AsyncMutex<NoopRawMutex, Spi<'static, SPI1, spi::Async>>> =
    StaticCell::new();
static NET_STATE: StaticCell<WiznetState<8, 8>> = StaticCell::new();
static NET_RESOURCES: StaticCell<StackResources<4>> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Beamline firmware starting");
    let p = embassy_rp::init(Default::default());

    // Shutter stays closed until the render task sees visible points.
    let shutter = Output::new(p.PIN_8, Level::Low);

    // SPI0 carries the DAC and the SD card with per-device configs.
    let mut dac_config = spi::Config::default();
    dac_config.frequency = 50_000_000;
    dac_config.polarity = spi::Polarity::IdleLow;
    dac_config.phase = spi::Phase::CaptureOnSecondTransition;
    let mut sd_config = spi::Config::default();
    sd_config.frequency = 16_000_000;

    let spi0 = Spi::new_blocking(p.SPI0, p.PIN_18, p.PIN_19, p.PIN_16, spi::Config::default());
    let spi0_bus = DAC_SPI_BUS.init(BlockingMutex::new(RefCell::new(spi0)));
    let dac_spi =
        SpiDeviceWithConfig::new(spi0_bus, Output::new(p.PIN_17, Level::High), dac_config);
    let sd_spi = SpiDeviceWithConfig::new(spi0_bus, Output::new(p.PIN_20, Level::High), sd_config);

    let mut dac = Dac80508::new(dac_spi);
    match dac.init() {
        Ok(()) => info!("DAC80508 initialised"),
        Err(_) => error!("DAC80508 init failed"),
    }

    // SPI1 carries the W5500 Ethernet controller, async with DMA.
    let mut net_config = spi::Config::default();
    net_config.frequency = 25_000_000;
    let spi1 = Spi::new(
        p.SPI1, p.PIN_10, p.PIN_11, p.PIN_12, p.DMA_CH0, p.DMA_CH1, net_config,
    );
    let net_bus = NET_SPI_BUS.init(AsyncMutex::new(spi1));
    let net_spi = SpiDevice::new(net_bus, Output::new(p.PIN_13, Level::High));
    let w5500_int = Input::new(p.PIN_14, Pull::Up);
    let w5500_reset = Output::new(p.PIN_15, Level::High);

    let (device, eth_runner) = embassy_net_wiznet::new(
        MAC_ADDR,
        NET_STATE.init(WiznetState::new()),
        net_spi,
        w5500_int,
        w5500_reset,
    )
    .await
    .unwrap();
    spawner.spawn(tasks::ethernet_task(eth_runner)).unwrap();

    // No hardware RNG wired up; a fixed seed only affects local port
    // selection and this device never opens outbound connections.
    let seed = 0x6265_616d_6c69_6e65;
    let (stack, net_runner) = embassy_net::new(
        device,
        NetConfig::dhcpv4(Default::default()),
        NET_RESOURCES.init(StackResources::new()),
        seed,
    );
    spawner.spawn(tasks::net_task(net_runner)).unwrap();

    let identity = DeviceIdentity {
        mac: MAC_ADDR,
        host_name: IDN_HOST_NAME,
        service_name: IDN_SERVICE_NAME,
    };

    spawner.spawn(tasks::tick_task()).unwrap();
    spawner.spawn(tasks::render_task(dac, shutter)).unwrap();
    spawner.spawn(tasks::sd_stream_task(sd_spi)).unwrap();
    spawner.spawn(tasks::idn_task(stack, identity)).unwrap();
    spawner.spawn(tasks::iwp_task(stack)).unwrap();

    renderer::start();
    info!("All tasks spawned, pipeline running");

    loop {
        Timer::after_secs(60).await;
        trace!("Heartbeat");
    }
}
