//! Hardware driver implementations
//!
//! Concrete implementations of the traits defined in beamline-core:
//!
//! - DAC80508 octal 16-bit DAC over SPI (galvo X/Y plus R/G/B colour)

#![no_std]
#![deny(unsafe_code)]

pub mod dac;
