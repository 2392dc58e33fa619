//! Bridge UART receive task
//!
//! The network co-processor forwards subscribed messages as
//! `topic payload` lines. Height requests are parsed and handed to the
//! desk task; other topics are ignored.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;
use heapless::Vec;

use hoist_core::session::{parse_height_request, TOPIC_HEIGHT_SET};

use crate::channels::HEIGHT_REQUEST;

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 32;

/// Longest accepted line
const LINE_CAPACITY: usize = 64;

/// Bridge RX task - receives topic lines from the network bridge
#[embassy_executor::task]
pub async fn bridge_rx_task(mut rx: BufferedUartRx) {
    info!("Bridge RX task started");

    let mut line: Vec<u8, LINE_CAPACITY> = Vec::new();
    let mut discarding = false;
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        let n = match rx.read(&mut buf).await {
            Ok(n) => n,
            Err(e) => {
                warn!("Bridge read error: {}", e);
                continue;
            }
        };

        for &byte in &buf[..n] {
            match byte {
                b'\n' | b'\r' => {
                    if !discarding && !line.is_empty() {
                        handle_line(&line);
                    }
                    line.clear();
                    discarding = false;
                }
                _ if discarding => {}
                _ => {
                    if line.push(byte).is_err() {
                        warn!("Bridge line too long, discarded");
                        line.clear();
                        discarding = true;
                    }
                }
            }
        }
    }
}

fn handle_line(line: &[u8]) {
    let (topic, payload) = match line.iter().position(|&b| b == b' ') {
        Some(split) => (&line[..split], &line[split + 1..]),
        None => (line, &[][..]),
    };

    if topic != TOPIC_HEIGHT_SET.as_bytes() {
        trace!("Ignoring topic {=[u8]:a}", topic);
        return;
    }

    match parse_height_request(payload) {
        Some(height) => HEIGHT_REQUEST.signal(height),
        None => warn!("Bad height request {=[u8]:a}", payload),
    }
}
