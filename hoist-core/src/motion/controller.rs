//! Closed-loop height controller
//!
//! Drives the desk towards a target through an [`Actuator`] and reports
//! what it did through a bounded outbox. All heights are fine units (see
//! [`MotionConfig`]).
//!
//! A seek ends when the position enters the hysteresis band around the
//! target, or passes the target in the direction of travel. Ending a seek
//! and reversing both go through [`MotionState::Stopping`] with the
//! actuator released, so the two directions are never engaged together.

use heapless::Deque;

use super::state::{MotionOutput, MotionState, RangeError, TargetOutcome};
use crate::config::{MotionConfig, PositionSource};
use crate::traits::{Actuator, Direction};

/// Outputs buffered between two drains
pub const OUTBOX_CAPACITY: usize = 16;

/// Motion controller state machine
pub struct MotionController<A: Actuator> {
    actuator: A,
    config: MotionConfig,
    state: MotionState,
    /// Last known position
    position: Option<i32>,
    /// Active target
    target: Option<i32>,
    /// Reported travel limits (min, max)
    limits: Option<(i32, i32)>,
    elapsed_in_state_ms: u32,
    /// Dead-reckoning travel below one fine unit, in fine units × ms/s
    travel_remainder: u64,
    outbox: Deque<MotionOutput, OUTBOX_CAPACITY>,
}

impl<A: Actuator> MotionController<A> {
    /// Create an idle controller
    pub fn new(actuator: A, config: MotionConfig) -> Self {
        Self {
            actuator,
            config,
            state: MotionState::Idle,
            position: None,
            target: None,
            limits: None,
            elapsed_in_state_ms: 0,
            travel_remainder: 0,
            outbox: Deque::new(),
        }
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    pub fn position(&self) -> Option<i32> {
        self.position
    }

    pub fn target(&self) -> Option<i32> {
        self.target
    }

    pub fn limits(&self) -> Option<(i32, i32)> {
        self.limits
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    /// Time spent in the current state
    ///
    /// Supervisors use this to bound how long a seek may run.
    pub fn elapsed_in_state_ms(&self) -> u32 {
        self.elapsed_in_state_ms
    }

    /// Record the travel limits reported by the desk
    pub fn set_limits(&mut self, min: i32, max: i32) {
        self.limits = Some((min.min(max), min.max(max)));
    }

    /// Range a target must fall into
    ///
    /// The reported limits once known, the configured safety range before.
    pub fn bounds(&self) -> (i32, i32) {
        self.limits.unwrap_or_else(|| self.config.safety_range())
    }

    /// Request a new target
    ///
    /// A rejected target leaves the controller untouched. An accepted one
    /// replaces any seek in progress.
    pub fn set_target(&mut self, target: i32) -> Result<TargetOutcome, RangeError> {
        let (min, max) = self.bounds();
        if target < min || target > max {
            #[cfg(feature = "defmt")]
            defmt::warn!("Target {} outside {}..={}", target, min, max);
            return Err(RangeError {
                requested: target,
                min,
                max,
            });
        }

        self.target = Some(target);
        match self.position {
            Some(position) => Ok(self.approach(position, target)),
            None => Ok(TargetOutcome::AwaitingPosition),
        }
    }

    /// Feed a position reading
    pub fn update_position(&mut self, position: i32) {
        self.position = Some(position);

        let Some(target) = self.target else {
            return;
        };

        match self.state {
            MotionState::Seeking { direction } => {
                if self.converged(position, target, direction) {
                    self.finish(target);
                }
            }
            // A target without a seek was waiting for this reading
            MotionState::Idle | MotionState::Stopping => {
                self.approach(position, target);
            }
        }
    }

    /// Advance the clock
    ///
    /// In dead-reckoning mode this also moves the estimated position and
    /// may complete the seek.
    pub fn tick(&mut self, delta_ms: u32) {
        self.elapsed_in_state_ms = self.elapsed_in_state_ms.saturating_add(delta_ms);

        let MotionState::Seeking { direction } = self.state else {
            return;
        };

        if let PositionSource::DeadReckoning { fine_per_s } = self.config.position_source {
            if let Some(position) = self.position {
                let travel = self.travel_remainder + u64::from(fine_per_s) * u64::from(delta_ms);
                self.travel_remainder = travel % 1000;
                let step = (travel / 1000).min(i32::MAX as u64) as i32;
                self.update_position(position.saturating_add(direction.sign() * step));
            }
        }

        if self.state.is_moving() {
            if let Some(command) = self.actuator.hold() {
                self.push(MotionOutput::Send(command));
            }
        }
    }

    /// Abandon the target, stopping if moving
    ///
    /// Returns true if a seek was interrupted.
    pub fn cancel(&mut self) -> bool {
        self.target = None;
        if self.state.is_moving() {
            self.stop();
            true
        } else {
            false
        }
    }

    /// Take the oldest pending output
    pub fn poll_output(&mut self) -> Option<MotionOutput> {
        self.outbox.pop_front()
    }

    /// Start, continue or skip a seek from `position` to `target`
    fn approach(&mut self, position: i32, target: i32) -> TargetOutcome {
        if (position - target).abs() <= self.config.hysteresis {
            self.finish(target);
            return TargetOutcome::AlreadyThere;
        }

        let direction = if target > position {
            Direction::Up
        } else {
            Direction::Down
        };
        self.drive(direction, target);
        TargetOutcome::Seeking(direction)
    }

    fn converged(&self, position: i32, target: i32, direction: Direction) -> bool {
        if (position - target).abs() <= self.config.hysteresis {
            return true;
        }
        // Overshoot past the band
        match direction {
            Direction::Up => position >= target,
            Direction::Down => position <= target,
        }
    }

    fn drive(&mut self, direction: Direction, target: i32) {
        let native = self.config.to_native(target);

        match self.state {
            MotionState::Seeking { direction: current } if current == direction => {
                // Same direction, only the target moved
                if let Some(command) = self.actuator.engage(direction, native) {
                    self.push(MotionOutput::Send(command));
                }
                return;
            }
            MotionState::Seeking { .. } => self.release(),
            MotionState::Idle | MotionState::Stopping => {}
        }

        let command = self.actuator.engage(direction, native);
        self.travel_remainder = 0;
        self.enter(MotionState::Seeking { direction });
        if let Some(command) = command {
            self.push(MotionOutput::Send(command));
        }
    }

    /// Target reached: clear it and stop if moving
    fn finish(&mut self, target: i32) {
        self.target = None;
        if self.state.is_moving() {
            self.stop();
            self.push(MotionOutput::Arrived(target));
        }
    }

    fn stop(&mut self) {
        self.release();
        self.enter(MotionState::Idle);
    }

    fn release(&mut self) {
        let command = self.actuator.release();
        self.enter(MotionState::Stopping);
        if let Some(command) = command {
            self.push(MotionOutput::Send(command));
        }
    }

    fn enter(&mut self, state: MotionState) {
        if state == self.state {
            return;
        }
        #[cfg(feature = "defmt")]
        defmt::debug!("Motion {} -> {}", self.state, state);
        self.state = state;
        self.elapsed_in_state_ms = 0;
        self.push(MotionOutput::Transition(state));
    }

    fn push(&mut self, output: MotionOutput) {
        if self.outbox.is_full() {
            #[cfg(feature = "defmt")]
            defmt::warn!("Motion outbox full, dropping oldest output");
            self.outbox.pop_front();
        }
        let _ = self.outbox.push_back(output);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoist_protocol::Command;

    /// Records engage/release calls and enforces exclusivity
    #[derive(Default)]
    struct MockActuator {
        engaged: Option<Direction>,
        engages: u32,
        releases: u32,
        overlap: bool,
    }

    impl Actuator for MockActuator {
        fn engage(&mut self, direction: Direction, target: u16) -> Option<Command> {
            if self.engaged == Some(direction.opposite()) {
                self.overlap = true;
            }
            self.engaged = Some(direction);
            self.engages += 1;
            Some(Command::GoToHeight(target))
        }

        fn release(&mut self) -> Option<Command> {
            self.engaged = None;
            self.releases += 1;
            Some(Command::Stop)
        }

        fn engaged(&self) -> Option<Direction> {
            self.engaged
        }
    }

    fn controller() -> MotionController<MockActuator> {
        MotionController::new(MockActuator::default(), MotionConfig::default())
    }

    fn drain(c: &mut MotionController<MockActuator>) -> heapless::Vec<MotionOutput, 32> {
        let mut out = heapless::Vec::new();
        while let Some(o) = c.poll_output() {
            out.push(o).unwrap();
        }
        out
    }

    const UP: MotionState = MotionState::Seeking {
        direction: Direction::Up,
    };
    const DOWN: MotionState = MotionState::Seeking {
        direction: Direction::Down,
    };

    #[test]
    fn test_seek_up_and_converge() {
        let mut c = controller();
        c.update_position(6000);
        c.set_limits(6000, 12400);

        assert_eq!(c.set_target(10000), Ok(TargetOutcome::Seeking(Direction::Up)));
        assert_eq!(c.state(), UP);
        assert_eq!(c.actuator().engaged(), Some(Direction::Up));
        assert_eq!(
            drain(&mut c).as_slice(),
            &[
                MotionOutput::Transition(UP),
                MotionOutput::Send(Command::GoToHeight(1000)),
            ]
        );

        c.update_position(8000);
        assert_eq!(c.state(), UP);

        // 999.5 mm is inside the 0.8 mm band
        c.update_position(9995);
        assert_eq!(c.state(), MotionState::Idle);
        assert_eq!(c.target(), None);
        assert_eq!(c.actuator().engaged(), None);
        assert_eq!(
            drain(&mut c).as_slice(),
            &[
                MotionOutput::Transition(MotionState::Stopping),
                MotionOutput::Send(Command::Stop),
                MotionOutput::Transition(MotionState::Idle),
                MotionOutput::Arrived(10000),
            ]
        );
    }

    #[test]
    fn test_within_band_is_noop() {
        let mut c = controller();
        c.update_position(7000);

        assert_eq!(c.set_target(7005), Ok(TargetOutcome::AlreadyThere));
        assert_eq!(c.state(), MotionState::Idle);
        assert_eq!(c.actuator().engages, 0);
        assert_eq!(c.target(), None);
        assert!(drain(&mut c).is_empty());
    }

    #[test]
    fn test_band_edge() {
        let mut c = controller();
        c.update_position(7000);
        assert_eq!(c.set_target(7008), Ok(TargetOutcome::AlreadyThere));
        assert_eq!(c.set_target(7009), Ok(TargetOutcome::Seeking(Direction::Up)));
    }

    #[test]
    fn test_bounds_with_limits() {
        let mut c = controller();
        c.update_position(7000);
        c.set_limits(6000, 12400);

        assert_eq!(
            c.set_target(5999),
            Err(RangeError {
                requested: 5999,
                min: 6000,
                max: 12400
            })
        );
        assert!(c.set_target(12401).is_err());
        assert_eq!(c.target(), None);
        assert_eq!(c.state(), MotionState::Idle);

        assert!(c.set_target(6000).is_ok());
    }

    #[test]
    fn test_rejection_keeps_active_target() {
        let mut c = controller();
        c.update_position(7000);
        c.set_target(9000).unwrap();
        drain(&mut c);

        assert!(c.set_target(20000).is_err());
        assert_eq!(c.target(), Some(9000));
        assert_eq!(c.state(), UP);
        assert!(drain(&mut c).is_empty());
    }

    #[test]
    fn test_safety_range_before_limits() {
        let mut c = controller();
        c.update_position(7000);
        assert!(c.set_target(5990).is_err());
        assert!(c.set_target(12510).is_err());
        assert!(c.set_target(12500).is_ok());
    }

    #[test]
    fn test_swapped_limits_normalized() {
        let mut c = controller();
        c.set_limits(12500, 6000);
        assert_eq!(c.limits(), Some((6000, 12500)));
    }

    #[test]
    fn test_target_before_position() {
        let mut c = controller();
        assert_eq!(c.set_target(8000), Ok(TargetOutcome::AwaitingPosition));
        assert_eq!(c.state(), MotionState::Idle);

        c.update_position(9000);
        assert_eq!(c.state(), DOWN);
        assert_eq!(c.target(), Some(8000));
    }

    #[test]
    fn test_target_before_position_already_there() {
        let mut c = controller();
        c.set_target(8000).unwrap();
        c.update_position(8003);
        assert_eq!(c.state(), MotionState::Idle);
        assert_eq!(c.target(), None);
        assert_eq!(c.actuator().engages, 0);
    }

    #[test]
    fn test_reversal_releases_first() {
        let mut c = controller();
        c.update_position(8000);
        c.set_target(10000).unwrap();
        drain(&mut c);

        assert_eq!(c.set_target(7000), Ok(TargetOutcome::Seeking(Direction::Down)));
        assert!(!c.actuator().overlap);
        assert_eq!(c.actuator().engaged(), Some(Direction::Down));
        assert_eq!(
            drain(&mut c).as_slice(),
            &[
                MotionOutput::Transition(MotionState::Stopping),
                MotionOutput::Send(Command::Stop),
                MotionOutput::Transition(DOWN),
                MotionOutput::Send(Command::GoToHeight(700)),
            ]
        );
    }

    #[test]
    fn test_retarget_same_direction() {
        let mut c = controller();
        c.update_position(8000);
        c.set_target(10000).unwrap();
        drain(&mut c);

        c.set_target(11000).unwrap();
        assert_eq!(c.actuator().releases, 0);
        assert_eq!(
            drain(&mut c).as_slice(),
            &[MotionOutput::Send(Command::GoToHeight(1100))]
        );
    }

    #[test]
    fn test_retarget_into_band_stops() {
        let mut c = controller();
        c.update_position(8000);
        c.set_target(10000).unwrap();

        assert_eq!(c.set_target(8004), Ok(TargetOutcome::AlreadyThere));
        assert_eq!(c.state(), MotionState::Idle);
        assert_eq!(c.actuator().engaged(), None);
    }

    #[test]
    fn test_overshoot_converges() {
        let mut c = controller();
        c.update_position(8000);
        c.set_target(7000).unwrap();

        c.update_position(6900);
        assert_eq!(c.state(), MotionState::Idle);
        assert_eq!(c.actuator().engaged(), None);
    }

    #[test]
    fn test_cancel() {
        let mut c = controller();
        assert!(!c.cancel());

        c.update_position(8000);
        c.set_target(10000).unwrap();
        assert!(c.cancel());
        assert_eq!(c.state(), MotionState::Idle);
        assert_eq!(c.target(), None);
        assert_eq!(c.actuator().engaged(), None);
    }

    #[test]
    fn test_elapsed_in_state() {
        let mut c = controller();
        c.tick(300);
        assert_eq!(c.elapsed_in_state_ms(), 300);

        c.update_position(8000);
        c.set_target(10000).unwrap();
        assert_eq!(c.elapsed_in_state_ms(), 0);
        c.tick(50);
        c.tick(50);
        assert_eq!(c.elapsed_in_state_ms(), 100);
    }

    #[test]
    fn test_dead_reckoning() {
        let config = MotionConfig {
            position_source: PositionSource::DeadReckoning { fine_per_s: 250 },
            ..MotionConfig::default()
        };
        let mut c = MotionController::new(MockActuator::default(), config);
        c.update_position(7000);
        c.set_target(7100).unwrap();

        // 250 fine/s at 30 ms per tick: 7.5 fine per tick
        for _ in 0..10 {
            c.tick(30);
        }
        assert_eq!(c.position(), Some(7075));
        assert_eq!(c.state(), UP);

        c.tick(30);
        c.tick(30);
        assert_eq!(c.position(), Some(7090));
        assert_eq!(c.state(), UP);

        // 7097 is inside the band
        c.tick(30);
        assert_eq!(c.position(), Some(7097));
        assert_eq!(c.state(), MotionState::Idle);
    }

    #[test]
    fn test_outbox_drops_oldest() {
        let mut c = controller();
        c.update_position(8000);
        for i in 0..(OUTBOX_CAPACITY as i32 + 4) {
            c.set_target(10000 + i * 100).unwrap();
        }

        let out = drain(&mut c);
        assert_eq!(out.len(), OUTBOX_CAPACITY);
        assert_eq!(
            out.last(),
            Some(&MotionOutput::Send(Command::GoToHeight(
                1000 + (OUTBOX_CAPACITY as u16 + 3) * 10
            )))
        );
    }
}
