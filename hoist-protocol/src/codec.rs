//! Streaming frame codec
//!
//! Reframes an arbitrarily chunked byte stream into validated [`Frame`]s.
//!
//! The scanner always validates the first marker-to-terminator span it
//! finds. If that span fails validation only its leading byte is dropped
//! and scanning resumes, so a false marker match never costs the genuine
//! frame behind it. A start marker hidden inside the payload of a frame
//! that is still arriving is not looked at until the enclosing span has
//! failed.

use heapless::Vec;

use crate::commands::Command;
use crate::frame::{Frame, FrameError, Marker, FRAME_OVERHEAD, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE};

/// Capacity of the raw receive buffer
///
/// Under normal operation fewer than 100 bytes are pending. When a garbled
/// peer fills the buffer, the oldest bytes are dropped.
pub const RAW_BUFFER_CAPACITY: usize = 512;

/// Offset of the LENGTH byte within a span
const LENGTH_OFFSET: usize = 3;

/// Scanner position in the current candidate span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum ScanState {
    /// Looking for a start marker
    SeekingMarker,
    /// Marker at the buffer head, waiting for the declared span to arrive
    Accumulating,
    /// A full span of `end` bytes is buffered and needs checking
    Validating { end: usize },
}

/// Codec counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CodecStats {
    /// Frames accepted
    pub frames: u32,
    /// Single-byte resynchronizations after a failed span
    pub resyncs: u32,
    /// Bytes dropped because the raw buffer was full
    pub overflowed: u32,
}

/// Streaming frame decoder and command encoder
pub struct FrameCodec {
    buffer: Vec<u8, RAW_BUFFER_CAPACITY>,
    marker: Marker,
    state: ScanState,
    stats: CodecStats,
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameCodec {
    /// Codec listening for frames sent by the desk
    pub fn new() -> Self {
        Self::for_marker(Marker::Incoming)
    }

    /// Codec listening for frames with the given start marker
    pub fn for_marker(marker: Marker) -> Self {
        Self {
            buffer: Vec::new(),
            marker,
            state: ScanState::SeekingMarker,
            stats: CodecStats::default(),
        }
    }

    /// Append received bytes
    ///
    /// When the buffer is full the oldest bytes are dropped to make room.
    pub fn feed(&mut self, bytes: &[u8]) {
        // Only the newest RAW_BUFFER_CAPACITY bytes can survive
        let bytes = if bytes.len() > RAW_BUFFER_CAPACITY {
            let skipped = bytes.len() - RAW_BUFFER_CAPACITY;
            self.stats.overflowed = self.stats.overflowed.saturating_add(skipped as u32);
            &bytes[skipped..]
        } else {
            bytes
        };

        let free = RAW_BUFFER_CAPACITY - self.buffer.len();
        if bytes.len() > free {
            let drop = bytes.len() - free;
            self.discard(drop);
            self.stats.overflowed = self.stats.overflowed.saturating_add(drop as u32);
            // The head may no longer be a marker
            self.state = ScanState::SeekingMarker;
            #[cfg(feature = "defmt")]
            defmt::warn!("Receive buffer full, dropped {} bytes", drop);
        }

        // Cannot fail: room was made above
        let _ = self.buffer.extend_from_slice(bytes);
    }

    /// Extract the next valid frame, if one is fully buffered
    ///
    /// Returns `None` when more bytes are needed. Invalid spans are
    /// dropped one byte at a time.
    pub fn next_frame(&mut self) -> Option<Frame> {
        loop {
            match self.state {
                ScanState::SeekingMarker => {
                    let start = self.marker.bytes();
                    match self.buffer.windows(2).position(|w| w == start) {
                        Some(pos) => {
                            self.discard(pos);
                            self.state = ScanState::Accumulating;
                        }
                        None => {
                            // Keep a trailing half marker, nothing else can start a frame
                            let keep = match self.buffer.last() {
                                Some(&b) if b == start[0] => 1,
                                _ => 0,
                            };
                            self.discard(self.buffer.len() - keep);
                            return None;
                        }
                    }
                }
                ScanState::Accumulating => {
                    if self.buffer.len() <= LENGTH_OFFSET {
                        return None;
                    }
                    let length = self.buffer[LENGTH_OFFSET] as usize;
                    if length > MAX_PAYLOAD_SIZE {
                        self.resync(FrameError::PayloadTooLarge);
                        continue;
                    }
                    let end = FRAME_OVERHEAD + length;
                    if self.buffer.len() < end {
                        // A corrupted LENGTH must not hold back a good frame behind it
                        if self.complete_frame_after_head() {
                            self.resync(FrameError::Truncated);
                            continue;
                        }
                        return None;
                    }
                    self.state = ScanState::Validating { end };
                }
                ScanState::Validating { end } => match Frame::decode(&self.buffer[..end]) {
                    Ok(frame) if frame.marker == self.marker => {
                        self.discard(end);
                        self.state = ScanState::SeekingMarker;
                        self.stats.frames = self.stats.frames.wrapping_add(1);
                        return Some(frame);
                    }
                    Ok(_) => self.resync(FrameError::BadStartMarker),
                    Err(e) => self.resync(e),
                },
            }
        }
    }

    /// Encode a command into wire bytes
    pub fn encode(command: Command) -> Vec<u8, MAX_FRAME_SIZE> {
        command.to_frame().encode_to_vec()
    }

    /// Codec counters
    pub fn stats(&self) -> CodecStats {
        self.stats
    }

    /// Number of bytes waiting to be framed
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    fn resync(&mut self, _error: FrameError) {
        #[cfg(feature = "defmt")]
        defmt::warn!("Frame rejected ({}), resyncing", _error);

        self.discard(1);
        self.state = ScanState::SeekingMarker;
        self.stats.resyncs = self.stats.resyncs.wrapping_add(1);
    }

    /// Whether a valid frame is fully buffered past the head marker
    fn complete_frame_after_head(&self) -> bool {
        let start = self.marker.bytes();
        (1..self.buffer.len().saturating_sub(LENGTH_OFFSET)).any(|pos| {
            let rest = &self.buffer[pos..];
            if rest[..2] != start {
                return false;
            }
            let end = FRAME_OVERHEAD + rest[LENGTH_OFFSET] as usize;
            rest.len() >= end
                && matches!(Frame::decode(&rest[..end]), Ok(frame) if frame.marker == self.marker)
        })
    }

    /// Remove `count` bytes from the head of the buffer
    fn discard(&mut self, count: usize) {
        let count = count.min(self.buffer.len());
        if count == 0 {
            return;
        }
        let remaining = self.buffer.len() - count;
        self.buffer.copy_within(count.., 0);
        self.buffer.truncate(remaining);
    }
}
