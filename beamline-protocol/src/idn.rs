//! IDN-Hello protocol (discovery + real-time channel streaming)
//!
//! Every packet starts with a 4-byte header:
//!
//! ```text
//! +---------+-------+------------------+
//! | command | flags | sequence (u16 BE)|
//! +---------+-------+------------------+
//! ```
//!
//! This deployment answers scan and service-map requests and consumes
//! real-time channel messages carrying 8-byte point samples. Unknown or
//! malformed packets are ignored silently - no response, no state
//! change beyond what was already validly parsed.

use beamline_core::point::{expand_channel, Point};
use heapless::Vec;

use crate::MAX_POINTS_PER_DATAGRAM;

/// UDP port the IDN-Hello server listens on.
pub const IDN_UDP_PORT: u16 = 7255;

/// Packet header length (command, flags, sequence).
pub const PACKET_HDR_LEN: usize = 4;

/// Largest reply this node ever sends (packet header + scan response).
pub const MAX_REPLY_LEN: usize = 64;

/// Reply datagram, addressed back to the request's source.
pub type Reply = Vec<u8, MAX_REPLY_LEN>;

/// Command codes.
pub mod cmd {
    pub const SCAN_REQUEST: u8 = 0x10;
    pub const SCAN_RESPONSE: u8 = 0x11;
    pub const SERVICEMAP_REQUEST: u8 = 0x12;
    pub const SERVICEMAP_RESPONSE: u8 = 0x13;
    pub const RT_CHANNEL_MESSAGE: u8 = 0x40;
}

/// Group bits of the packet flags field, echoed in responses.
const FLAGS_GROUP_MASK: u8 = 0x0F;

/// Protocol version reported in scan responses (major 0, minor 1).
const PROTOCOL_VERSION: u8 = 0x01;

/// Scan status flag: unit offers real-time streaming.
pub const SCAN_STATUS_REALTIME: u8 = 0x01;

/// Service type: laser projector graphics, continuous streaming.
const SERVICE_TYPE_LPGRF_CONTINUOUS: u8 = 0x0C;

/// Service-map entry flag: this is the default service.
const MAPENTRY_DEFAULT_SERVICE: u8 = 0x01;

/// Content-ID bit 14: a 20-byte channel configuration block precedes
/// the sample payload.
const CONTENTID_CONFIG: u16 = 0x4000;

/// Scan response body length.
const SCAN_RESPONSE_LEN: usize = 40;
/// Service-map response header length.
const SERVICEMAP_HDR_LEN: usize = 4;
/// Service-map entry length.
const SERVICEMAP_ENTRY_LEN: usize = 24;
/// Channel message sub-header length (total size, content ID, timestamp).
const CHANNEL_MSG_HDR_LEN: usize = 8;
/// Sample chunk sub-header length.
const SAMPLE_CHUNK_HDR_LEN: usize = 4;
/// One point sample: X, Y (u16 BE), R, G, B, reserved.
const SAMPLE_LEN: usize = 8;

/// Identity advertised in discovery responses.
#[derive(Debug, Clone, Copy)]
pub struct DeviceIdentity {
    /// Hardware network address; becomes the EUI-48 unit ID.
    pub mac: [u8; 6],
    /// Human-readable host name (truncated to 20 bytes on the wire).
    pub host_name: &'static str,
    /// Advertised service name (truncated to 20 bytes on the wire).
    pub service_name: &'static str,
}

/// Process one received datagram.
///
/// Decoded point samples are appended to `points`; the returned reply,
/// if any, must be sent back to the datagram's source address.
pub fn handle_datagram(
    data: &[u8],
    identity: &DeviceIdentity,
    points: &mut Vec<Point, MAX_POINTS_PER_DATAGRAM>,
) -> Option<Reply> {
    if data.len() < PACKET_HDR_LEN {
        return None;
    }
    let command = data[0];
    let flags = data[1];
    let sequence = [data[2], data[3]];

    match command {
        cmd::SCAN_REQUEST => Some(scan_response(flags, sequence, identity)),
        cmd::SERVICEMAP_REQUEST => Some(servicemap_response(flags, sequence, identity)),
        cmd::RT_CHANNEL_MESSAGE => {
            decode_channel_message(&data[PACKET_HDR_LEN..], points);
            None
        }
        _ => None,
    }
}

fn reply_header(out: &mut Reply, command: u8, flags: u8, sequence: [u8; 2]) {
    // Header always fits: MAX_REPLY_LEN covers every response we build.
    let _ = out.push(command);
    let _ = out.push(flags & FLAGS_GROUP_MASK);
    let _ = out.extend_from_slice(&sequence);
}

/// Copy a name into a fixed-size, zero-padded wire field.
fn push_padded_name(out: &mut Reply, name: &str, width: usize) {
    let bytes = name.as_bytes();
    let n = bytes.len().min(width);
    let _ = out.extend_from_slice(&bytes[..n]);
    for _ in n..width {
        let _ = out.push(0);
    }
}

fn scan_response(flags: u8, sequence: [u8; 2], identity: &DeviceIdentity) -> Reply {
    let mut out = Reply::new();
    reply_header(&mut out, cmd::SCAN_RESPONSE, flags, sequence);

    let _ = out.push(SCAN_RESPONSE_LEN as u8);
    let _ = out.push(PROTOCOL_VERSION);
    let _ = out.push(SCAN_STATUS_REALTIME);
    let _ = out.push(0); // reserved

    // Unit ID: length, type (EUI-48 MAC), address, zero padding to 16.
    let _ = out.push(0x07);
    let _ = out.push(0x01);
    let _ = out.extend_from_slice(&identity.mac);
    for _ in 0..8 {
        let _ = out.push(0);
    }

    push_padded_name(&mut out, identity.host_name, 20);
    out
}

fn servicemap_response(flags: u8, sequence: [u8; 2], identity: &DeviceIdentity) -> Reply {
    let mut out = Reply::new();
    reply_header(&mut out, cmd::SERVICEMAP_RESPONSE, flags, sequence);

    // Map header: exactly one service, no relays in this deployment.
    let _ = out.push(SERVICEMAP_HDR_LEN as u8);
    let _ = out.push(SERVICEMAP_ENTRY_LEN as u8);
    let _ = out.push(0); // relay entry count
    let _ = out.push(1); // service entry count

    let _ = out.push(0x01); // service ID
    let _ = out.push(SERVICE_TYPE_LPGRF_CONTINUOUS);
    let _ = out.push(MAPENTRY_DEFAULT_SERVICE);
    let _ = out.push(0); // relay number
    push_padded_name(&mut out, identity.service_name, 20);
    out
}

/// Decode the sample payload of a real-time channel message.
///
/// Only odd content IDs carry point/wave data. The declared total size
/// covers the channel header plus chunk header plus samples; it is
/// clamped both to zero (undersized declarations) and to the bytes
/// actually present, so a lying header can never read past the
/// datagram.
fn decode_channel_message(msg: &[u8], points: &mut Vec<Point, MAX_POINTS_PER_DATAGRAM>) {
    if msg.len() < CHANNEL_MSG_HDR_LEN {
        return;
    }
    let mut total_size = u16::from_be_bytes([msg[0], msg[1]]) as usize;
    let content_id = u16::from_be_bytes([msg[2], msg[3]]);
    let _timestamp = u32::from_be_bytes([msg[4], msg[5], msg[6], msg[7]]);

    if content_id & 0x01 == 0 {
        return; // not a wave message
    }

    let mut cursor = CHANNEL_MSG_HDR_LEN;
    if content_id & CONTENTID_CONFIG != 0 {
        // Embedded configuration block between the channel header and
        // the sample chunk; skipped, not interpreted.
        cursor += 20;
        total_size = total_size.saturating_sub(20);
    }
    cursor += SAMPLE_CHUNK_HDR_LEN;

    let declared = total_size.saturating_sub(CHANNEL_MSG_HDR_LEN + SAMPLE_CHUNK_HDR_LEN);
    let available = msg.len().saturating_sub(cursor);
    let samples = declared.min(available) / SAMPLE_LEN;

    for i in 0..samples {
        let s = &msg[cursor + i * SAMPLE_LEN..cursor + (i + 1) * SAMPLE_LEN];
        let x = i16::from_be_bytes([s[0], s[1]]);
        let y = i16::from_be_bytes([s[2], s[3]]);
        // s[7] is a reserved/intensity byte, ignored.
        let _ = points.push(Point::from_signed_xy(
            x,
            y,
            expand_channel(s[4]),
            expand_channel(s[5]),
            expand_channel(s[6]),
        ));
    }
}
