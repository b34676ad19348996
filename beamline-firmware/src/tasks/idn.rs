//! IDN-Hello UDP server task
//!
//! Answers discovery (scan/servicemap) requests and feeds realtime
//! channel message samples into the point buffer.

use defmt::*;
use embassy_net::udp::{PacketMetadata, UdpSocket};
use embassy_net::Stack;
use heapless::Vec;

use beamline_protocol::idn::{self, DeviceIdentity, IDN_UDP_PORT};
use beamline_protocol::MAX_DATAGRAM_LEN;

use crate::renderer;

#[embassy_executor::task]
pub async fn idn_task(stack: Stack<'static>, identity: DeviceIdentity) {
    stack.wait_config_up().await;

    let mut rx_meta = [PacketMetadata::EMPTY; 8];
    let mut rx_buffer = [0u8; 4096];
    let mut tx_meta = [PacketMetadata::EMPTY; 8];
    let mut tx_buffer = [0u8; 256];
    let mut socket = UdpSocket::new(
        stack,
        &mut rx_meta,
        &mut rx_buffer,
        &mut tx_meta,
        &mut tx_buffer,
    );
    if socket.bind(IDN_UDP_PORT).is_err() {
        error!("Cannot bind UDP port {}", IDN_UDP_PORT);
        return;
    }
    info!("IDN server listening on UDP {}", IDN_UDP_PORT);

    let mut buf = [0u8; MAX_DATAGRAM_LEN];
    loop {
        let (len, meta) = match socket.recv_from(&mut buf).await {
            Ok(v) => v,
            Err(_) => continue,
        };

        let mut points = Vec::new();
        let reply = idn::handle_datagram(&buf[..len], &identity, &mut points);

        if !points.is_empty() && !renderer::buffer_push_many(&points) {
            trace!("IDN samples dropped, buffer full");
        }

        if let Some(reply) = reply {
            if socket.send_to(&reply, meta).await.is_err() {
                warn!("IDN reply to {} failed", meta.endpoint);
            }
        }
    }
}
