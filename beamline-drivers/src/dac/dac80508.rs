//! DAC80508 octal 16-bit DAC (SPI mode 1)
//!
//! The DAC80508 drives all five output channels of the projector: galvo
//! X/Y and the R/G/B colour modulators. Every SPI frame is 24 bits: a
//! register selector byte followed by a big-endian 16-bit value.
//!
//! Channel writes go to the per-channel DAC registers without updating
//! the outputs; a trigger register write (LDAC bit) then latches all
//! channels simultaneously so position and colour always move together.

use embedded_hal::spi::SpiDevice;

use beamline_core::point::Point;
use beamline_core::traits::PointDac;

/// DAC80508 register addresses
pub mod reg {
    pub const NOP: u8 = 0x00;
    /// Device ID (read only)
    pub const DEVID: u8 = 0x81;
    pub const SYNC: u8 = 0x02;
    pub const CONFIG: u8 = 0x03;
    pub const GAIN: u8 = 0x04;
    pub const TRIGGER: u8 = 0x05;
    pub const BRDCAST: u8 = 0x06;
    pub const STATUS: u8 = 0x07;
    /// First DAC channel register; channel N lives at DAC_BASE + N.
    pub const DAC_BASE: u8 = 0x08;
}

/// Board channel assignment
pub mod channel {
    pub const X: u8 = 6;
    pub const Y: u8 = 7;
    pub const R: u8 = 5;
    pub const G: u8 = 4;
    pub const B: u8 = 3;
    /// Wired but unused by the render pipeline.
    pub const INTENSITY: u8 = 2;
    pub const USER1: u8 = 1;
    pub const USER2: u8 = 0;
}

/// TRIGGER register: soft reset pattern.
const TRIGGER_SOFT_RESET: u16 = 0x000A;
/// TRIGGER register: LDAC bit, latches all channel registers at once.
const TRIGGER_LDAC: u16 = 0x0010;
/// GAIN register: REFDIV-EN off, 2x buffer gain on all channels.
const GAIN_BUFF_2X: u16 = 0x00FF;
/// SYNC register: broadcast and synchronous-load enable for all channels.
const SYNC_ALL: u16 = 0xFFFF;

/// DAC80508 driver over an `embedded-hal` SPI device.
pub struct Dac80508<SPI> {
    spi: SPI,
}

impl<SPI: SpiDevice> Dac80508<SPI> {
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Required init sequence on attach: soft reset, gain/buffer mode,
    /// broadcast+sync enable.
    pub fn init(&mut self) -> Result<(), SPI::Error> {
        self.write_register(reg::TRIGGER, TRIGGER_SOFT_RESET)?;
        self.write_register(reg::GAIN, GAIN_BUFF_2X)?;
        self.write_register(reg::SYNC, SYNC_ALL)?;
        Ok(())
    }

    /// Raw (register, value) write - one 24-bit frame.
    pub fn write_register(&mut self, register: u8, value: u16) -> Result<(), SPI::Error> {
        let [hi, lo] = value.to_be_bytes();
        self.spi.write(&[register, hi, lo])
    }

    /// Stage a value in one channel register (not latched until sync).
    pub fn write_channel(&mut self, ch: u8, value: u16) -> Result<(), SPI::Error> {
        self.write_register(reg::DAC_BASE + ch, value)
    }

    /// Latch all staged channel registers onto the outputs.
    pub fn sync(&mut self) -> Result<(), SPI::Error> {
        self.write_register(reg::TRIGGER, TRIGGER_LDAC)
    }

    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI: SpiDevice> PointDac for Dac80508<SPI> {
    type Error = SPI::Error;

    fn write_point(&mut self, p: Point) -> Result<(), Self::Error> {
        self.write_channel(channel::X, p.x)?;
        self.write_channel(channel::Y, p.y)?;
        self.write_channel(channel::R, p.r)?;
        self.write_channel(channel::G, p.g)?;
        self.write_channel(channel::B, p.b)?;
        self.sync()
    }

    fn write_rgb(&mut self, r: u16, g: u16, b: u16) -> Result<(), Self::Error> {
        self.write_channel(channel::R, r)?;
        self.write_channel(channel::G, g)?;
        self.write_channel(channel::B, b)?;
        self.sync()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::spi::{ErrorType, Operation};

    /// SPI mock that records every written frame.
    #[derive(Default)]
    struct RecordingSpi {
        frames: heapless::Vec<[u8; 3], 16>,
    }

    impl ErrorType for RecordingSpi {
        type Error = Infallible;
    }

    impl SpiDevice for RecordingSpi {
        fn transaction(
            &mut self,
            operations: &mut [Operation<'_, u8>],
        ) -> Result<(), Self::Error> {
            for op in operations {
                if let Operation::Write(bytes) = op {
                    let mut frame = [0u8; 3];
                    frame.copy_from_slice(bytes);
                    self.frames.push(frame).unwrap();
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_init_sequence() {
        let mut dac = Dac80508::new(RecordingSpi::default());
        dac.init().unwrap();
        let spi = dac.release();
        assert_eq!(
            &spi.frames[..],
            &[
                [reg::TRIGGER, 0x00, 0x0A],
                [reg::GAIN, 0x00, 0xFF],
                [reg::SYNC, 0xFF, 0xFF],
            ]
        );
    }

    #[test]
    fn test_write_point_updates_all_channels_then_latches() {
        let mut dac = Dac80508::new(RecordingSpi::default());
        let p = Point {
            x: 0x1122,
            y: 0x3344,
            r: 0x5566,
            g: 0x7788,
            b: 0x99AA,
        };
        dac.write_point(p).unwrap();
        let spi = dac.release();
        assert_eq!(
            &spi.frames[..],
            &[
                [reg::DAC_BASE + channel::X, 0x11, 0x22],
                [reg::DAC_BASE + channel::Y, 0x33, 0x44],
                [reg::DAC_BASE + channel::R, 0x55, 0x66],
                [reg::DAC_BASE + channel::G, 0x77, 0x88],
                [reg::DAC_BASE + channel::B, 0x99, 0xAA],
                [reg::TRIGGER, 0x00, 0x10],
            ]
        );
    }

    #[test]
    fn test_write_rgb_leaves_galvos_alone() {
        let mut dac = Dac80508::new(RecordingSpi::default());
        dac.write_rgb(0, 0, 0).unwrap();
        let spi = dac.release();
        assert_eq!(spi.frames.len(), 4);
        assert_eq!(spi.frames[0][0], reg::DAC_BASE + channel::R);
        assert_eq!(spi.frames[3], [reg::TRIGGER, 0x00, 0x10]);
    }
}
