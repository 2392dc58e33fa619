//! Events published by a desk session
//!
//! Also holds the helpers at the pub/sub boundary: topic names, the
//! centimeter rendering of a height and parsing of inbound set requests.

use core::fmt::Write;

use heapless::String;

use crate::motion::MotionState;
use crate::safety::FaultKind;

/// Topic the current height is published on
pub const TOPIC_HEIGHT_READ: &str = "desk/height/read";

/// Topic height requests arrive on
pub const TOPIC_HEIGHT_SET: &str = "desk/height/set";

/// Longest rendered height ("6553.5")
pub const HEIGHT_TEXT_LEN: usize = 8;

/// State change worth telling the outside world about
///
/// Heights are in native units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionEvent {
    /// Height changed
    HeightRead(u16),
    /// Travel limits reported or changed
    LimitsRead { max: u16, min: u16 },
    /// Raw memory slot block
    MemorySlotRead { slot: u8, height: u16 },
    /// Motion state changed
    MotionChanged(MotionState),
    /// A seek completed
    TargetReached(u16),
    /// A height request was outside the allowed range
    TargetRejected(u16),
    /// A seek was aborted
    Fault(FaultKind),
}

impl SessionEvent {
    /// Pub/sub topic for events that have one
    pub fn topic(&self) -> Option<&'static str> {
        match self {
            SessionEvent::HeightRead(_) => Some(TOPIC_HEIGHT_READ),
            _ => None,
        }
    }
}

/// Render a millimeter height as centimeters with one decimal
///
/// `700` becomes `"70.0"`.
pub fn format_height_cm(height_mm: u16) -> String<HEIGHT_TEXT_LEN> {
    let mut text = String::new();
    // Cannot overflow: at most 6 characters
    let _ = write!(text, "{}.{}", height_mm / 10, height_mm % 10);
    text
}

/// Parse a centimeter height request into millimeters
///
/// Accepts an integer or a single decimal (`"70"`, `"70.5"`), surrounded
/// by optional whitespace. Anything else, or a value that does not fit,
/// is `None`.
pub fn parse_height_request(payload: &[u8]) -> Option<u16> {
    let text = core::str::from_utf8(payload).ok()?.trim();

    let (whole, tenths) = match text.split_once('.') {
        Some((whole, frac)) => (whole, Some(frac)),
        None => (text, None),
    };

    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let whole: u16 = whole.parse().ok()?;

    let tenths = match tenths.map(str::as_bytes) {
        None => 0,
        Some(&[digit]) if digit.is_ascii_digit() => u16::from(digit - b'0'),
        Some(_) => return None,
    };

    whole.checked_mul(10)?.checked_add(tenths)
}
