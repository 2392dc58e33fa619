//! Desk session
//!
//! Owns everything known about one desk and is the only place that state
//! changes. The transport feeds it bytes and ticks, drains the commands
//! it produces, and publishes the events it returns.

use core::mem;

use heapless::{Deque, Vec};
use hoist_protocol::{telemetry, CodecStats, Command, FrameCodec, TelemetryEvent};

use super::events::SessionEvent;
use crate::config::DeskConfig;
use crate::motion::{MotionController, MotionOutput, MotionState};
use crate::safety::{SafetyStatus, StallSupervisor};
use crate::traits::Actuator;

/// Events buffered between two drains
pub const MAX_EVENTS: usize = 32;

/// Commands buffered between two drains
pub const COMMAND_QUEUE_CAPACITY: usize = 16;

/// Events returned by the session
pub type Events = Vec<SessionEvent, MAX_EVENTS>;

/// Everything known about the desk, in native units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeskState {
    /// Unknown until the first height reading
    pub current_height_mm: Option<u16>,
    pub max_height_mm: Option<u16>,
    pub min_height_mm: Option<u16>,
    /// Active target
    pub target_height_mm: Option<u16>,
    pub motion: MotionState,
}

/// One desk, driven through actuator `A`
pub struct DeskSession<A: Actuator> {
    codec: FrameCodec,
    controller: MotionController<A>,
    supervisor: StallSupervisor,
    state: DeskState,
    /// Last height published, for deduplication
    last_published: Option<u16>,
    /// Last limits published (max, min)
    limits_published: Option<(u16, u16)>,
    commands: Deque<Command, COMMAND_QUEUE_CAPACITY>,
    events: Events,
}

impl<A: Actuator> DeskSession<A> {
    /// Create a session with nothing known about the desk
    pub fn new(actuator: A, config: &DeskConfig) -> Self {
        Self {
            codec: FrameCodec::new(),
            controller: MotionController::new(actuator, config.motion),
            supervisor: StallSupervisor::new(config.stall),
            state: DeskState::default(),
            last_published: None,
            limits_published: None,
            commands: Deque::new(),
            events: Vec::new(),
        }
    }

    /// Feed received bytes and process every complete frame
    ///
    /// Returns the events raised since the last drain.
    pub fn ingest_bytes(&mut self, bytes: &[u8]) -> Events {
        self.codec.feed(bytes);

        while let Some(frame) = self.codec.next_frame() {
            match telemetry::decode(&frame) {
                Ok(Some(event)) => self.apply(event),
                Ok(None) => {}
                Err(_e) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("Telemetry skipped: {}", _e);
                }
            }
        }

        self.take_events()
    }

    /// Ask the desk to move to `height` (native units)
    ///
    /// Returns whether the request was accepted. Rejections raise
    /// [`SessionEvent::TargetRejected`] and change nothing else.
    pub fn request_height(&mut self, height: u16) -> bool {
        let target = self.controller.config().to_fine(height);
        match self.controller.set_target(target) {
            Ok(_) => {
                self.drain_controller();
                true
            }
            Err(_) => {
                self.emit(SessionEvent::TargetRejected(height));
                false
            }
        }
    }

    /// Stop any seek and drop the target
    pub fn cancel(&mut self) -> bool {
        let interrupted = self.controller.cancel();
        self.drain_controller();
        interrupted
    }

    /// Advance time by `delta_ms`
    ///
    /// Runs the controller clock and the stall supervisor. A fault stops
    /// the desk and raises [`SessionEvent::Fault`].
    pub fn tick(&mut self, delta_ms: u32) -> Events {
        self.controller.tick(delta_ms);
        self.drain_controller();
        self.sync_position();

        self.supervisor.update_motion(
            self.controller.state().is_moving(),
            self.controller.elapsed_in_state_ms(),
        );
        self.supervisor.update_time(delta_ms);

        if let SafetyStatus::Fault(kind) = self.supervisor.check() {
            #[cfg(feature = "defmt")]
            defmt::warn!("Motion fault: {}", kind);
            self.emit(SessionEvent::Fault(kind));
            self.controller.cancel();
            self.supervisor.reset();
            self.drain_controller();
        }

        self.take_events()
    }

    /// Next command for the transport, oldest first
    pub fn poll_command(&mut self) -> Option<Command> {
        self.commands.pop_front()
    }

    /// Events raised outside of [`ingest_bytes`](Self::ingest_bytes) and
    /// [`tick`](Self::tick)
    pub fn take_events(&mut self) -> Events {
        mem::take(&mut self.events)
    }

    pub fn query_limits(&self) -> Command {
        Command::QueryLimits
    }

    pub fn query_memory_and_height(&self) -> Command {
        Command::QueryMemoryAndHeight
    }

    /// Queries to send once the link is up
    pub fn startup_commands(&self) -> [Command; 2] {
        [self.query_limits(), self.query_memory_and_height()]
    }

    pub fn state(&self) -> DeskState {
        self.state
    }

    pub fn codec_stats(&self) -> CodecStats {
        self.codec.stats()
    }

    pub fn controller(&self) -> &MotionController<A> {
        &self.controller
    }

    fn apply(&mut self, event: TelemetryEvent) {
        match event {
            TelemetryEvent::HeightReading(height) => {
                let position = self.controller.config().to_fine(height);
                self.supervisor.update_position(position);
                self.controller.update_position(position);
                self.publish_height(height);
                self.drain_controller();
            }
            TelemetryEvent::LimitReading { max, min } => {
                self.state.max_height_mm = Some(max);
                self.state.min_height_mm = Some(min);
                let config = self.controller.config();
                let (min_fine, max_fine) = (config.to_fine(min), config.to_fine(max));
                self.controller.set_limits(min_fine, max_fine);

                if self.limits_published != Some((max, min))
                    && self.emit(SessionEvent::LimitsRead { max, min })
                {
                    self.limits_published = Some((max, min));
                }
            }
            TelemetryEvent::MemorySlotReading { slot, height } => {
                self.emit(SessionEvent::MemorySlotRead { slot, height });
            }
        }
    }

    /// Record the current height and publish it if it changed
    ///
    /// Only the newest undrained height is kept: an older `HeightRead`
    /// still in the buffer is replaced. A height that could not be
    /// buffered is not marked published, so the next reading retries it.
    fn publish_height(&mut self, height: u16) {
        self.state.current_height_mm = Some(height);
        if self.last_published == Some(height) {
            return;
        }

        if let Some(stale) = self
            .events
            .iter()
            .position(|e| matches!(e, SessionEvent::HeightRead(_)))
        {
            self.events.remove(stale);
        }
        if self.emit(SessionEvent::HeightRead(height)) {
            self.last_published = Some(height);
        }
    }

    /// Pick up positions the controller estimated on its own
    fn sync_position(&mut self) {
        let Some(position) = self.controller.position() else {
            return;
        };
        let height = self.controller.config().to_native(position);
        if self.state.current_height_mm != Some(height) {
            self.supervisor.update_position(position);
            self.publish_height(height);
        }
    }

    fn drain_controller(&mut self) {
        while let Some(output) = self.controller.poll_output() {
            match output {
                MotionOutput::Transition(state) => {
                    self.state.motion = state;
                    self.emit(SessionEvent::MotionChanged(state));
                }
                MotionOutput::Send(command) => {
                    if self.commands.is_full() {
                        #[cfg(feature = "defmt")]
                        defmt::warn!("Command queue full, dropping oldest");
                        self.commands.pop_front();
                    }
                    let _ = self.commands.push_back(command);
                }
                MotionOutput::Arrived(target) => {
                    let height = self.controller.config().to_native(target);
                    self.emit(SessionEvent::TargetReached(height));
                }
            }
        }

        let config = self.controller.config();
        self.state.target_height_mm = self.controller.target().map(|t| config.to_native(t));
    }

    /// Buffer an event, returns false if it was dropped
    fn emit(&mut self, event: SessionEvent) -> bool {
        if self.events.push(event).is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("Event buffer full, dropping {}", event);
            return false;
        }
        true
    }
}
