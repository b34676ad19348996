//! SD ingestion task
//!
//! Streams the autoplay file from the SD card through the ILDA decoder
//! into the shared point buffer. The decoder loops the file forever;
//! when playback is deactivated the file handle is released and the
//! task idles until the next start request re-opens it. The first
//! session starts unprompted at boot.

use defmt::*;
use embassy_embedded_hal::shared_bus::blocking::spi::SpiDeviceWithConfig;
use embassy_rp::gpio::Output;
use embassy_rp::peripherals::SPI0;
use embassy_rp::spi::{Blocking, Spi};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_time::{Delay, Timer};
use embedded_sdmmc::{Mode, SdCard, VolumeIdx, VolumeManager};

use beamline_core::ilda::IldaDecoder;
use beamline_core::point::Point;

use crate::channels::SD_START;
use crate::renderer;
use crate::storage::{NullTimeSource, SdFileStream};

/// File streamed at boot, 8.3 name in the volume root.
pub const AUTOPLAY_FILE: &str = "AUTOPLAY.ILD";

/// Points decoded per pass before checking buffer backpressure.
const CHUNK_POINTS: usize = 512;

pub type SdSpi =
    SpiDeviceWithConfig<'static, NoopRawMutex, Spi<'static, SPI0, Blocking>, Output<'static>>;

#[embassy_executor::task]
pub async fn sd_stream_task(spi: SdSpi) {
    info!("SD stream task started");

    let sdcard = SdCard::new(spi, Delay);
    match sdcard.num_bytes() {
        Ok(size) => info!("SD card present, {} bytes", size),
        Err(e) => {
            warn!("No SD card: {:?}", Debug2Format(&e));
            return;
        }
    }

    let mut volume_mgr = VolumeManager::new(sdcard, NullTimeSource);
    let mut volume = match volume_mgr.open_volume(VolumeIdx(0)) {
        Ok(v) => v,
        Err(e) => {
            warn!("No FAT volume on SD card: {:?}", Debug2Format(&e));
            return;
        }
    };
    let mut root = match volume.open_root_dir() {
        Ok(d) => d,
        Err(e) => {
            warn!("Cannot open SD root directory: {:?}", Debug2Format(&e));
            return;
        }
    };
    let mut chunk = [Point::BLANK; CHUNK_POINTS];
    loop {
        let file = match root.open_file_in_dir(AUTOPLAY_FILE, Mode::ReadOnly) {
            Ok(f) => f,
            Err(e) => {
                warn!("Cannot open {}: {:?}", AUTOPLAY_FILE, Debug2Format(&e));
                SD_START.wait().await;
                continue;
            }
        };

        let mut decoder = IldaDecoder::new();
        if let Err(e) = decoder.open(SdFileStream::new(file)) {
            warn!("{} is not a playable stream: {}", AUTOPLAY_FILE, e);
            SD_START.wait().await;
            continue;
        }
        renderer::sd_started();
        info!("Streaming {}", AUTOPLAY_FILE);

        'playback: loop {
            if !renderer::is_sd_playing() {
                break;
            }

            let decoded = decoder.decode_chunk(&mut chunk);
            if decoded == 0 {
                // Stream unreadable right now; the decoder already
                // queued a restart, give the card a moment.
                Timer::after_millis(1).await;
                continue;
            }

            while renderer::buffer_capacity_remaining() < decoded {
                if !renderer::is_sd_playing() {
                    break 'playback;
                }
                Timer::after_millis(1).await;
            }
            renderer::buffer_push_many(&chunk[..decoded]);
        }

        // Deactivated: release the file handle and idle until the next
        // start request.
        drop(decoder.close());
        info!("File playback stopped, {} released", AUTOPLAY_FILE);
        SD_START.wait().await;
    }
}
