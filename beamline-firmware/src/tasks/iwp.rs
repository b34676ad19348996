//! IWP UDP server task
//!
//! Decodes tagged point/control datagrams. Effects (buffer clear,
//! period change) are applied before the datagram's points are pushed,
//! so a turn-off record takes effect ahead of any points that follow it
//! in the same datagram.

use defmt::*;
use embassy_net::udp::{PacketMetadata, UdpSocket};
use embassy_net::Stack;
use heapless::Vec;

use beamline_protocol::iwp::{self, IWP_UDP_PORT};
use beamline_protocol::MAX_DATAGRAM_LEN;

use crate::renderer;

#[embassy_executor::task]
pub async fn iwp_task(stack: Stack<'static>) {
    stack.wait_config_up().await;

    let mut rx_meta = [PacketMetadata::EMPTY; 8];
    let mut rx_buffer = [0u8; 4096];
    let mut tx_meta = [PacketMetadata::EMPTY; 4];
    let mut tx_buffer = [0u8; 64];
    let mut socket = UdpSocket::new(
        stack,
        &mut rx_meta,
        &mut rx_buffer,
        &mut tx_meta,
        &mut tx_buffer,
    );
    if socket.bind(IWP_UDP_PORT).is_err() {
        error!("Cannot bind UDP port {}", IWP_UDP_PORT);
        return;
    }
    info!("IWP server listening on UDP {}", IWP_UDP_PORT);

    let mut buf = [0u8; MAX_DATAGRAM_LEN];
    loop {
        let len = match socket.recv_from(&mut buf).await {
            Ok((len, _)) => len,
            Err(_) => continue,
        };

        let mut points = Vec::new();
        let effects = iwp::parse_datagram(&buf[..len], &mut points);

        if effects.clear {
            renderer::buffer_clear();
        }
        if let Some(period_us) = effects.period_us {
            renderer::change_frequency(period_us);
        }
        if !points.is_empty() && !renderer::buffer_push_many(&points) {
            trace!("IWP points dropped, buffer full");
        }
    }
}
