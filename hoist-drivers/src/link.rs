//! Serial link driver
//!
//! Moves bytes between a UART and a [`DeskSession`]: received chunks are
//! fed to the session as they come, and queued commands are encoded and
//! written one frame at a time. The read and write directions share no
//! buffer.

use hoist_core::session::{DeskSession, SessionEvent};
use hoist_core::traits::Actuator;
use hoist_hal::{UartRx, UartTx};
use hoist_protocol::{Command, FrameCodec};

/// Bytes read from the UART per call
pub const RX_CHUNK_SIZE: usize = 32;

/// Upper bound on bytes consumed by one [`SerialLink::receive`]
pub const MAX_RX_PER_POLL: usize = 256;

/// Link counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStats {
    /// Bytes received
    pub bytes_in: u32,
    /// Frames written
    pub frames_out: u32,
}

/// UART pair attached to a desk control box
pub struct SerialLink<T, R> {
    tx: T,
    rx: R,
    stats: LinkStats,
}

impl<T: UartTx, R: UartRx> SerialLink<T, R> {
    pub fn new(tx: T, rx: R) -> Self {
        Self {
            tx,
            rx,
            stats: LinkStats::default(),
        }
    }

    /// Drain pending bytes into the session
    ///
    /// Every event the session raises is handed to `publish`. Returns the
    /// number of bytes consumed.
    pub fn receive<A: Actuator>(
        &mut self,
        session: &mut DeskSession<A>,
        mut publish: impl FnMut(SessionEvent),
    ) -> Result<usize, R::Error> {
        let mut buf = [0u8; RX_CHUNK_SIZE];
        let mut total = 0;

        while total < MAX_RX_PER_POLL {
            let n = self.rx.read_available(&mut buf)?;
            if n == 0 {
                break;
            }
            total += n;
            self.stats.bytes_in = self.stats.bytes_in.wrapping_add(n as u32);
            for event in session.ingest_bytes(&buf[..n]) {
                publish(event);
            }
        }

        Ok(total)
    }

    /// Encode and write one command
    pub fn send(&mut self, command: Command) -> Result<(), T::Error> {
        let frame = FrameCodec::encode(command);
        self.tx.write_blocking(&frame)?;
        self.stats.frames_out = self.stats.frames_out.wrapping_add(1);
        Ok(())
    }

    /// Write every command the session has queued
    ///
    /// Returns the number of commands sent.
    pub fn flush_commands<A: Actuator>(
        &mut self,
        session: &mut DeskSession<A>,
    ) -> Result<usize, T::Error> {
        let mut sent = 0;
        while let Some(command) = session.poll_command() {
            self.send(command)?;
            sent += 1;
        }
        if sent > 0 {
            self.tx.flush()?;
        }
        Ok(sent)
    }

    pub fn stats(&self) -> LinkStats {
        self.stats
    }
}
