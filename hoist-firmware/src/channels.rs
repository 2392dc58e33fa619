//! Inter-task communication channels
//!
//! The desk task owns the session; everything else talks to it through
//! these statics.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use hoist_core::session::SessionEvent;

/// Channel capacity for published events
const PUBLISH_CHANNEL_SIZE: usize = 16;

/// Latest height request from the bridge, in mm
///
/// A newer request overwrites one the desk task has not picked up yet.
pub static HEIGHT_REQUEST: Signal<CriticalSectionRawMutex, u16> = Signal::new();

/// Session events on their way to the bridge
pub static PUBLISH_CHANNEL: Channel<CriticalSectionRawMutex, SessionEvent, PUBLISH_CHANNEL_SIZE> =
    Channel::new();
