//! The common output point representation
//!
//! Every producer (ILDA file stream, IDN channel messages, IWP datagrams)
//! decodes into this one type, and the render task drains it into the DAC.

/// Zero point of the unsigned galvo coordinate space.
///
/// Source formats use signed 16-bit coordinates centred on zero; the DAC
/// wants unsigned values centred on mid-scale.
pub const CENTER: u16 = 0x8000;

/// One addressable output sample: beam position plus colour intensities.
///
/// All channels are full-scale 16-bit. A "blanked" point has `r = g = b = 0`
/// and the shutter line driven inactive while it is output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Point {
    pub x: u16,
    pub y: u16,
    pub r: u16,
    pub g: u16,
    pub b: u16,
}

impl Point {
    /// Centred, fully blanked point (beam parked, colours off).
    pub const BLANK: Point = Point {
        x: CENTER,
        y: CENTER,
        r: 0,
        g: 0,
        b: 0,
    };

    /// Map signed source coordinates into the unsigned DAC space.
    ///
    /// X grows to the right unchanged; Y is negated because the source
    /// coordinate systems have an inverted vertical axis relative to the
    /// galvo. Wrapping is intentional: `raw + 0x8000` re-centres the
    /// two's-complement range onto 0..=0xFFFF.
    pub fn from_signed_xy(raw_x: i16, raw_y: i16, r: u16, g: u16, b: u16) -> Self {
        Point {
            x: (raw_x as u16).wrapping_add(CENTER),
            y: (raw_y.wrapping_neg() as u16).wrapping_add(CENTER),
            r,
            g,
            b,
        }
    }

    /// Whether this point carries no visible output.
    pub fn is_blanked(&self) -> bool {
        self.r == 0 && self.g == 0 && self.b == 0
    }
}

/// Expand an 8-bit colour channel to 16-bit by replication.
///
/// `0xFF` maps to `0xFFFF`, `0x80` to `0x8080`; this preserves full scale
/// exactly, unlike a plain shift.
pub const fn expand_channel(v: u8) -> u16 {
    ((v as u16) << 8) | v as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_mapping_centres_origin() {
        let p = Point::from_signed_xy(0, 0, 1, 2, 3);
        assert_eq!(p.x, 0x8000);
        assert_eq!(p.y, 0x8000);
    }

    #[test]
    fn test_y_axis_is_flipped() {
        let p = Point::from_signed_xy(100, -100, 0, 0, 0);
        assert_eq!(p.x, 0x8064);
        assert_eq!(p.y, 0x8064);

        let q = Point::from_signed_xy(-100, 100, 0, 0, 0);
        assert_eq!(q.x, 0x7F9C);
        assert_eq!(q.y, 0x7F9C);
    }

    #[test]
    fn test_extremes_wrap_into_range() {
        let p = Point::from_signed_xy(i16::MIN, i16::MAX, 0, 0, 0);
        assert_eq!(p.x, 0x0000);
        // -(32767) + 0x8000 = 1
        assert_eq!(p.y, 0x0001);
    }

    #[test]
    fn test_channel_expansion() {
        assert_eq!(expand_channel(0x00), 0x0000);
        assert_eq!(expand_channel(0x80), 0x8080);
        assert_eq!(expand_channel(0xFF), 0xFFFF);
    }
}
