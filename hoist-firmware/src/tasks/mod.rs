//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod bridge_rx;
pub mod desk;
pub mod publish;

pub use bridge_rx::bridge_rx_task;
pub use desk::desk_task;
pub use publish::publish_task;
