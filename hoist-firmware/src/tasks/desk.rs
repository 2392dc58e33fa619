//! Desk task
//!
//! Sole owner of the desk session. Polls the control box link on a fixed
//! cadence, applies height requests, advances the session clock and
//! writes whatever commands it queued.

use defmt::*;
use embassy_time::{Duration, Instant, Ticker};

use hoist_core::session::{DeskSession, Events, SessionEvent};
use hoist_drivers::actuator::AnyActuator;
use hoist_drivers::link::SerialLink;
use hoist_hal_rp2040::{RpOutputPin, RpUartRx, RpUartTx};

use crate::channels::{HEIGHT_REQUEST, PUBLISH_CHANNEL};

/// Poll interval in milliseconds
pub const POLL_INTERVAL_MS: u64 = 50;

/// Session as wired on this board
pub type Desk = DeskSession<AnyActuator<RpOutputPin>>;

/// Control box link as wired on this board
pub type DeskLink = SerialLink<RpUartTx, RpUartRx>;

/// Desk task - runs the session against the control box
#[embassy_executor::task]
pub async fn desk_task(mut link: DeskLink, mut session: Desk) {
    info!("Desk task started");

    for command in session.startup_commands() {
        if let Err(e) = link.send(command) {
            warn!("Startup query {} failed: {}", command, e);
        }
    }

    let mut ticker = Ticker::every(Duration::from_millis(POLL_INTERVAL_MS));
    let mut last = Instant::now();

    loop {
        ticker.next().await;

        if let Err(e) = link.receive(&mut session, publish) {
            warn!("Link read error: {}", e);
        }

        if let Some(height) = HEIGHT_REQUEST.try_take() {
            if session.request_height(height) {
                info!("Seeking {} mm", height);
            }
            forward(session.take_events());
        }

        let now = Instant::now();
        let delta_ms = (now - last).as_millis() as u32;
        last = now;
        forward(session.tick(delta_ms));

        match link.flush_commands(&mut session) {
            Ok(0) => {}
            Ok(n) => trace!("TX: {} commands", n),
            Err(e) => warn!("Link write error: {}", e),
        }
    }
}

fn forward(events: Events) {
    for event in events {
        publish(event);
    }
}

fn publish(event: SessionEvent) {
    if PUBLISH_CHANNEL.try_send(event).is_err() {
        warn!("Publish channel full, dropping {}", event);
    }
}
