//! Publish task
//!
//! Hands session events to the network bridge. Events with a topic go out
//! as `topic payload` lines; the rest are only logged.

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;

use hoist_core::session::{format_height_cm, SessionEvent};

use crate::channels::PUBLISH_CHANNEL;

/// Publish task - forwards events to the bridge UART
#[embassy_executor::task]
pub async fn publish_task(mut tx: BufferedUartTx) {
    info!("Publish task started");

    loop {
        let event = PUBLISH_CHANNEL.receive().await;

        match event {
            SessionEvent::HeightRead(height) => {
                let text = format_height_cm(height);
                if let Some(topic) = event.topic() {
                    debug!("{} {}", topic, text.as_str());
                    send_line(&mut tx, topic, text.as_bytes()).await;
                }
            }
            SessionEvent::TargetReached(height) => info!("Target {} mm reached", height),
            SessionEvent::TargetRejected(height) => warn!("Target {} mm rejected", height),
            SessionEvent::Fault(kind) => warn!("Desk fault: {}", kind),
            other => debug!("Desk event: {}", other),
        }
    }
}

/// Write one `topic payload` line
async fn send_line(tx: &mut BufferedUartTx, topic: &str, payload: &[u8]) {
    let result = async {
        tx.write_all(topic.as_bytes()).await?;
        tx.write_all(b" ").await?;
        tx.write_all(payload).await?;
        tx.write_all(b"\n").await
    }
    .await;

    if let Err(e) = result {
        warn!("Bridge write error: {}", e);
    }
}
