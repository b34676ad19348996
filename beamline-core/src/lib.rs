//! Board-agnostic core of the Beamline laser projector firmware
//!
//! This crate contains the rendering pipeline logic that does not depend
//! on specific hardware implementations:
//!
//! - The common output point representation
//! - The bounded point ring buffer shared by all producers
//! - The looping ILDA file-stream decoder
//! - Renderer settings (output period, brightness) with validation
//! - Hardware abstraction traits (byte stream, point DAC)

#![no_std]
#![deny(unsafe_code)]

pub mod buffer;
pub mod ilda;
pub mod point;
pub mod render;
pub mod traits;

pub use buffer::PointRing;
pub use point::Point;
