//! Point output boundary

use crate::point::Point;

/// Output device that latches one point per render tick.
///
/// Implementations update all position/colour channels and trigger a
/// synchronous load so the galvo and colour outputs move together.
pub trait PointDac {
    type Error;

    /// Write all five channels of `p` and latch them simultaneously.
    fn write_point(&mut self, p: Point) -> Result<(), Self::Error>;

    /// Write only the colour channels and latch (used to blank the beam
    /// without moving the galvos).
    fn write_rgb(&mut self, r: u16, g: u16, b: u16) -> Result<(), Self::Error>;
}
