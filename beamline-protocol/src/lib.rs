//! Network wire formats for the Beamline laser projector
//!
//! Two independent UDP protocols feed the same point sink:
//!
//! - **IDN-Hello** (`idn`): discovery (scan, service map) plus real-time
//!   channel messages carrying 8-byte point samples.
//! - **IWP** (`iwp`): a self-delimiting sequence of tagged records in one
//!   datagram, mixing points with board commands.
//!
//! Both modules are pure parse/encode over byte slices - no sockets, no
//! I/O. The firmware hands in whole received datagrams (the transport
//! never delivers fragments) and sends any returned reply back to the
//! datagram's source address.

#![no_std]
#![deny(unsafe_code)]

pub mod idn;
pub mod iwp;

/// Largest datagram the transport delivers.
pub const MAX_DATAGRAM_LEN: usize = 1500;

/// Upper bound on points decodable from one datagram: both protocols
/// spend at least 8 bytes per point.
pub const MAX_POINTS_PER_DATAGRAM: usize = MAX_DATAGRAM_LEN / 8;
