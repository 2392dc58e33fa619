//! Frame encoding and validation for the desk serial protocol.
//!
//! Frame format:
//! - START (2 bytes): `F1 F1` towards the desk, `F2 F2` from the desk
//! - COMMAND (1 byte): command identifier
//! - LENGTH (1 byte): payload length
//! - PAYLOAD (LENGTH bytes): command-specific data
//! - CHECKSUM (1 byte): sum of COMMAND, LENGTH and all PAYLOAD bytes, mod 256
//! - END (1 byte): 0x7E

use heapless::Vec;

/// Start marker of frames sent to the desk
pub const START_OUTGOING: [u8; 2] = [0xF1, 0xF1];

/// Start marker of frames sent by the desk
pub const START_INCOMING: [u8; 2] = [0xF2, 0xF2];

/// Frame terminator
pub const END_MARKER: u8 = 0x7E;

/// Maximum payload size accepted in either direction
///
/// The longest payload the desk is known to send is 4 bytes (height
/// limits). Anything declaring more than this is treated as line noise.
pub const MAX_PAYLOAD_SIZE: usize = 32;

/// Bytes of a frame that are not payload (START + COMMAND + LENGTH + CHECKSUM + END)
pub const FRAME_OVERHEAD: usize = 2 + 1 + 1 + 1 + 1;

/// Maximum complete frame size
pub const MAX_FRAME_SIZE: usize = FRAME_OVERHEAD + MAX_PAYLOAD_SIZE;

/// Errors that can occur while validating or encoding a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Span does not begin with a known start marker
    BadStartMarker,
    /// Span does not end with 0x7E
    BadEndMarker,
    /// Checksum byte does not match the frame contents
    ChecksumMismatch,
    /// Payload exceeds [`MAX_PAYLOAD_SIZE`]
    PayloadTooLarge,
    /// Span length disagrees with the declared payload length
    Truncated,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// Frame direction, identified by its start marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Marker {
    /// Controller to desk (`F1 F1`)
    Outgoing,
    /// Desk to controller (`F2 F2`)
    Incoming,
}

impl Marker {
    /// Wire bytes of this marker
    pub const fn bytes(self) -> [u8; 2] {
        match self {
            Marker::Outgoing => START_OUTGOING,
            Marker::Incoming => START_INCOMING,
        }
    }

    /// Identify a marker from the first two bytes of a span
    pub fn from_bytes(bytes: [u8; 2]) -> Option<Self> {
        match bytes {
            START_OUTGOING => Some(Marker::Outgoing),
            START_INCOMING => Some(Marker::Incoming),
            _ => None,
        }
    }
}

/// A validated or constructed frame
///
/// A `Frame` only exists in a consistent state: the declared length is the
/// payload length and the checksum is derived on encode.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    /// Direction marker
    pub marker: Marker,
    /// Command identifier
    pub command_id: u8,
    /// Payload data
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Frame {
    /// Create a new frame with the given command and payload
    pub fn new(marker: Marker, command_id: u8, payload: &[u8]) -> Result<Self, FrameError> {
        let mut payload_vec = Vec::new();
        payload_vec
            .extend_from_slice(payload)
            .map_err(|_| FrameError::PayloadTooLarge)?;

        Ok(Self {
            marker,
            command_id,
            payload: payload_vec,
        })
    }

    /// Create a frame with no payload
    pub fn empty(marker: Marker, command_id: u8) -> Self {
        Self {
            marker,
            command_id,
            payload: Vec::new(),
        }
    }

    /// Declared payload length
    pub fn length(&self) -> u8 {
        // Bounded by MAX_PAYLOAD_SIZE
        self.payload.len() as u8
    }

    /// Checksum of this frame as it goes on the wire
    pub fn checksum(&self) -> u8 {
        checksum(self.command_id, self.length(), &self.payload)
    }

    /// Total encoded size in bytes
    pub fn encoded_len(&self) -> usize {
        FRAME_OVERHEAD + self.payload.len()
    }

    /// Encode this frame into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let frame_len = self.encoded_len();
        if buffer.len() < frame_len {
            return Err(FrameError::BufferTooSmall);
        }

        let payload_end = 4 + self.payload.len();
        buffer[..2].copy_from_slice(&self.marker.bytes());
        buffer[2] = self.command_id;
        buffer[3] = self.length();
        buffer[4..payload_end].copy_from_slice(&self.payload);
        buffer[payload_end] = self.checksum();
        buffer[payload_end + 1] = END_MARKER;

        Ok(frame_len)
    }

    /// Encode this frame into a heapless Vec
    pub fn encode_to_vec(&self) -> Vec<u8, MAX_FRAME_SIZE> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        // The buffer always fits a frame whose payload is bounded by MAX_PAYLOAD_SIZE
        let len = self.encode(&mut buffer).unwrap_or(0);
        let mut vec = Vec::new();
        let _ = vec.extend_from_slice(&buffer[..len]);
        vec
    }

    /// Validate one complete frame span and build the frame
    ///
    /// The span must start with either marker, end with [`END_MARKER`],
    /// be exactly as long as its LENGTH byte declares, and carry a correct
    /// checksum.
    pub fn decode(span: &[u8]) -> Result<Self, FrameError> {
        if span.len() < FRAME_OVERHEAD {
            return Err(FrameError::Truncated);
        }

        let marker =
            Marker::from_bytes([span[0], span[1]]).ok_or(FrameError::BadStartMarker)?;

        let length = span[3] as usize;
        if length > MAX_PAYLOAD_SIZE {
            return Err(FrameError::PayloadTooLarge);
        }
        if span.len() != FRAME_OVERHEAD + length {
            return Err(FrameError::Truncated);
        }
        if span[span.len() - 1] != END_MARKER {
            return Err(FrameError::BadEndMarker);
        }

        // Checksum covers COMMAND, LENGTH and PAYLOAD: span[2..len-2]
        let body = &span[2..span.len() - 2];
        let expected = body.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
        if span[span.len() - 2] != expected {
            return Err(FrameError::ChecksumMismatch);
        }

        Frame::new(marker, span[2], &body[2..])
    }
}

/// Sum of command, length and payload bytes, modulo 256
pub fn checksum(command_id: u8, length: u8, payload: &[u8]) -> u8 {
    payload
        .iter()
        .fold(command_id.wrapping_add(length), |acc, &b| acc.wrapping_add(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_encode_empty_payload() {
        let frame = Frame::empty(Marker::Outgoing, 0x2B); // Stop
        let mut buffer = [0u8; 10];
        let len = frame.encode(&mut buffer).unwrap();

        assert_eq!(len, 6);
        assert_eq!(&buffer[..6], &[0xF1, 0xF1, 0x2B, 0x00, 0x2B, 0x7E]);
    }

    #[test]
    fn test_frame_encode_with_payload() {
        // Captured from the desk remote: go to 70.0 cm
        let frame = Frame::new(Marker::Outgoing, 0x1B, &[0x02, 0xBC]).unwrap();
        let encoded = frame.encode_to_vec();

        assert_eq!(
            encoded.as_slice(),
            &[241, 241, 27, 2, 2, 188, 219, 126]
        );
    }

    #[test]
    fn test_decode_captured_height_frame() {
        let frame = Frame::decode(&[242, 242, 1, 3, 3, 31, 15, 53, 126]).unwrap();

        assert_eq!(frame.marker, Marker::Incoming);
        assert_eq!(frame.command_id, 1);
        assert_eq!(frame.payload.as_slice(), &[3, 31, 15]);
    }

    #[test]
    fn test_decode_checksum_wraps() {
        // 7 + 4 + 4 + 226 + 2 + 88 = 331 -> 75
        let frame = Frame::decode(&[242, 242, 7, 4, 4, 226, 2, 88, 75, 126]).unwrap();
        assert_eq!(frame.checksum(), 75);
    }

    #[test]
    fn test_decode_rejects_bad_checksum() {
        let result = Frame::decode(&[242, 242, 1, 3, 3, 31, 15, 54, 126]);
        assert_eq!(result, Err(FrameError::ChecksumMismatch));
    }

    #[test]
    fn test_decode_rejects_bad_markers() {
        assert_eq!(
            Frame::decode(&[242, 241, 43, 0, 43, 126]),
            Err(FrameError::BadStartMarker)
        );
        assert_eq!(
            Frame::decode(&[242, 242, 43, 0, 43, 125]),
            Err(FrameError::BadEndMarker)
        );
    }

    #[test]
    fn test_decode_rejects_length_mismatch() {
        assert_eq!(
            Frame::decode(&[242, 242, 1, 3, 3, 31, 34, 126]),
            Err(FrameError::Truncated)
        );
        assert_eq!(Frame::decode(&[242, 242, 126]), Err(FrameError::Truncated));
    }

    #[test]
    fn test_end_marker_inside_payload() {
        let frame = Frame::new(Marker::Incoming, 0x01, &[0x00, 0x7E, 0x0F]).unwrap();
        let encoded = frame.encode_to_vec();
        assert_eq!(Frame::decode(&encoded), Ok(frame));
    }

    #[test]
    fn test_payload_too_large() {
        let large_payload = [0u8; MAX_PAYLOAD_SIZE + 1];
        let result = Frame::new(Marker::Outgoing, 0x01, &large_payload);
        assert_eq!(result, Err(FrameError::PayloadTooLarge));
    }

    #[test]
    fn test_encode_buffer_too_small() {
        let frame = Frame::empty(Marker::Outgoing, 0x01);
        let mut buffer = [0u8; 5];
        assert_eq!(frame.encode(&mut buffer), Err(FrameError::BufferTooSmall));
    }
}
