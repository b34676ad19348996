//! Hardware abstraction traits
//!
//! These traits define the interface between the rendering pipeline
//! and its two external collaborators: the seekable byte source the
//! ILDA decoder reads from, and the DAC the render task writes to.

pub mod dac;
pub mod stream;

pub use dac::PointDac;
pub use stream::RecordStream;
