//! DAC drivers

pub mod dac80508;

pub use dac80508::Dac80508;
