//! Telemetry decoding
//!
//! Maps validated frames from the desk to typed readings. Frame bodies are
//! indexed from the COMMAND byte, so for `[cmd, len, d0, d1, ...]` the
//! first data byte sits at index 2.

use crate::frame::Frame;

// Telemetry IDs: desk → controller
pub const TEL_HEIGHT: u8 = 0x01;
pub const TEL_LIMITS: u8 = 0x07;
pub const TEL_MEMORY_FIRST: u8 = 0x25;
pub const TEL_MEMORY_LAST: u8 = 0x28;

/// LENGTH byte of a height report
const HEIGHT_SUB: u8 = 3;
/// LENGTH byte of a limits report
const LIMITS_SUB: u8 = 4;

/// A typed reading from the desk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TelemetryEvent {
    /// Current height in native units
    HeightReading(u16),
    /// Raw memory slot block, slot is the command ID (37..=40)
    MemorySlotReading { slot: u8, height: u16 },
    /// Configured travel limits
    LimitReading { max: u16, min: u16 },
}

/// Decoding errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Payload too short for its command ID
    Underflow { command_id: u8, needed: usize, got: usize },
}

/// Decode a validated frame
///
/// Unknown command IDs are not an error and yield `Ok(None)`.
pub fn decode(frame: &Frame) -> Result<Option<TelemetryEvent>, DecodeError> {
    let id = frame.command_id;
    let data = frame.payload.as_slice();

    let event = match (id, frame.length()) {
        (TEL_HEIGHT, HEIGHT_SUB) => {
            let height = word(id, data, 0)?;
            TelemetryEvent::HeightReading(height)
        }
        (TEL_LIMITS, LIMITS_SUB) => {
            let max = word(id, data, 0)?;
            let min = word(id, data, 2)?;
            TelemetryEvent::LimitReading { max, min }
        }
        (TEL_MEMORY_FIRST..=TEL_MEMORY_LAST, _) => TelemetryEvent::MemorySlotReading {
            slot: id,
            height: word(id, data, 0)?,
        },
        _ => return Ok(None),
    };

    Ok(Some(event))
}

/// Big-endian u16 at `offset` in the data bytes
fn word(command_id: u8, data: &[u8], offset: usize) -> Result<u16, DecodeError> {
    match data.get(offset..offset + 2) {
        Some(&[hi, lo]) => Ok(u16::from_be_bytes([hi, lo])),
        _ => Err(DecodeError::Underflow {
            command_id,
            needed: offset + 2,
            got: data.len(),
        }),
    }
}
