//! IWP tagged-record format
//!
//! One datagram carries a sequence of self-delimiting records, parsed
//! in order until the buffer is exhausted or a malformed/unknown tag is
//! hit (remaining bytes are then discarded, never fatal). Coordinates
//! are already unsigned DAC values; unlike the ILDA and IDN paths there
//! is no recentering and no axis flip:
//!
//! ```text
//! TYPE 0 - turn off (clear buffer, emit one blank point)
//!  0
//! +------+
//! | 0x00 |
//! +------+
//!
//! TYPE 1 - 32-bit output tick period
//!  0      1      2      3      4
//! +------+------+------+------+------+
//! | 0x01 |           PERIOD          |
//! +------+------+------+------+------+
//!
//! TYPE 2 - 16b X/Y + 8b R/G/B (rescaled to 16 bit)
//!  0      1      2      3      4      5      6      7
//! +------+------+------+------+------+------+------+------+
//! | 0x02 |      X      |      Y      |   R  |   G  |   B  |
//! +------+------+------+------+------+------+------+------+
//!
//! TYPE 3 - 16b X/Y + 16b R/G/B (used directly)
//!  0      1      2      3      4      5      6      7      8      9      10
//! +------+------+------+------+------+------+------+------+------+------+------+
//! | 0x03 |      X      |      Y      |      R      |      G      |      B      |
//! +------+------+------+------+------+------+------+------+------+------+------+
//! ```

use beamline_core::point::{expand_channel, Point};
use beamline_core::render::MIN_TICK_PERIOD_US;
use heapless::Vec;

use crate::MAX_POINTS_PER_DATAGRAM;

/// UDP port the IWP server listens on.
pub const IWP_UDP_PORT: u16 = 7200;

/// Record tags.
pub mod tag {
    /// Turn off: clear the point buffer, queue one blank point.
    ///
    /// The queued blank is [`Point::BLANK`], which parks the galvos at
    /// mid-field rather than slewing them to coordinate (0, 0); with
    /// colours off the difference is invisible.
    ///
    /// [`Point::BLANK`]: beamline_core::point::Point::BLANK
    pub const OFF: u8 = 0x00;
    /// Set the output tick period (u32 big-endian, microseconds).
    pub const PERIOD: u8 = 0x01;
    /// Point with 8-bit colour channels.
    pub const POINT_RGB8: u8 = 0x02;
    /// Point with 16-bit colour channels.
    pub const POINT_RGB16: u8 = 0x03;
}

/// Board effects requested by one datagram, applied by the caller after
/// the parse pass (points are appended to the buffer in one call).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IwpEffects {
    /// A turn-off record asked for the point buffer to be cleared.
    pub clear: bool,
    /// Last in-range period request, microseconds. Requests below the
    /// renderer minimum are dropped here, matching the renderer's own
    /// rejection of them.
    pub period_us: Option<u32>,
}

/// Parse one datagram, collecting points into `points`.
///
/// Parsing stops early at the first unknown tag or at a record whose
/// declared length exceeds the remaining bytes; everything parsed up to
/// that point still counts. Points beyond the vec capacity are dropped
/// silently.
pub fn parse_datagram(
    data: &[u8],
    points: &mut Vec<Point, MAX_POINTS_PER_DATAGRAM>,
) -> IwpEffects {
    let mut effects = IwpEffects::default();
    let mut offset = 0;

    while offset < data.len() {
        match data[offset] {
            tag::OFF => {
                effects.clear = true;
                let _ = points.push(Point::BLANK);
                offset += 1;
            }
            tag::PERIOD => {
                if offset + 5 > data.len() {
                    break;
                }
                let value = u32::from_be_bytes([
                    data[offset + 1],
                    data[offset + 2],
                    data[offset + 3],
                    data[offset + 4],
                ]);
                if value >= MIN_TICK_PERIOD_US {
                    effects.period_us = Some(value);
                }
                offset += 5;
            }
            tag::POINT_RGB8 => {
                if offset + 8 > data.len() {
                    break;
                }
                let _ = points.push(Point {
                    x: u16::from_be_bytes([data[offset + 1], data[offset + 2]]),
                    y: u16::from_be_bytes([data[offset + 3], data[offset + 4]]),
                    r: expand_channel(data[offset + 5]),
                    g: expand_channel(data[offset + 6]),
                    b: expand_channel(data[offset + 7]),
                });
                offset += 8;
            }
            tag::POINT_RGB16 => {
                if offset + 11 > data.len() {
                    break;
                }
                let _ = points.push(Point {
                    x: u16::from_be_bytes([data[offset + 1], data[offset + 2]]),
                    y: u16::from_be_bytes([data[offset + 3], data[offset + 4]]),
                    r: u16::from_be_bytes([data[offset + 5], data[offset + 6]]),
                    g: u16::from_be_bytes([data[offset + 7], data[offset + 8]]),
                    b: u16::from_be_bytes([data[offset + 9], data[offset + 10]]),
                });
                offset += 11;
            }
            _ => break, // unknown tag: discard the rest of the datagram
        }
    }

    effects
}
