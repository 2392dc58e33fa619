//! Stall supervision
//!
//! Watches seeks for lack of progress. The controller itself has no
//! notion of a stall; it only exposes its time in state and position.

use crate::config::StallConfig;

/// Types of motion faults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultKind {
    /// Position did not move while seeking
    Stall,
    /// A single seek ran longer than allowed
    SeekTimeout,
}

/// Safety condition status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SafetyStatus {
    /// All conditions normal
    Ok,
    /// Safety condition violated
    Fault(FaultKind),
}

/// Stall supervisor for seeks
///
/// Progress means the position moved at least `min_progress` fine units
/// away from where it was when progress was last seen.
#[derive(Debug, Clone)]
pub struct StallSupervisor {
    config: StallConfig,
    /// A seek is being watched
    watching: bool,
    /// Position at the last progress
    anchor: Option<i32>,
    /// Time since the last progress (ms)
    since_progress_ms: u32,
    /// Duration of the watched seek (ms)
    seek_elapsed_ms: u32,
}

impl StallSupervisor {
    /// Create a new supervisor
    pub fn new(config: StallConfig) -> Self {
        Self {
            config,
            watching: false,
            anchor: None,
            since_progress_ms: 0,
            seek_elapsed_ms: 0,
        }
    }

    /// Update seek status from the controller
    ///
    /// # Arguments
    /// - `moving`: controller is seeking
    /// - `elapsed_in_state_ms`: controller time in its current state
    pub fn update_motion(&mut self, moving: bool, elapsed_in_state_ms: u32) {
        if !moving {
            self.reset();
            return;
        }
        if !self.watching {
            self.watching = true;
            self.since_progress_ms = 0;
        }
        self.seek_elapsed_ms = elapsed_in_state_ms;
    }

    /// Record a position reading
    pub fn update_position(&mut self, position: i32) {
        if !self.watching {
            self.anchor = Some(position);
            return;
        }
        match self.anchor {
            Some(anchor) if (position - anchor).abs() < self.config.min_progress => {}
            _ => {
                self.anchor = Some(position);
                self.since_progress_ms = 0;
            }
        }
    }

    /// Update time tracking
    ///
    /// # Arguments
    /// - `delta_ms`: Time elapsed since last update
    pub fn update_time(&mut self, delta_ms: u32) {
        if self.watching {
            self.since_progress_ms = self.since_progress_ms.saturating_add(delta_ms);
        }
    }

    /// Check the watched seek
    pub fn check(&self) -> SafetyStatus {
        if !self.watching {
            return SafetyStatus::Ok;
        }

        if self.config.timeout_ms > 0 && self.since_progress_ms >= self.config.timeout_ms {
            return SafetyStatus::Fault(FaultKind::Stall);
        }

        if self.config.max_seek_ms > 0 && self.seek_elapsed_ms >= self.config.max_seek_ms {
            return SafetyStatus::Fault(FaultKind::SeekTimeout);
        }

        SafetyStatus::Ok
    }

    /// Stop watching
    pub fn reset(&mut self) {
        self.watching = false;
        self.since_progress_ms = 0;
        self.seek_elapsed_ms = 0;
    }

    /// Time since the last progress while watching
    pub fn since_progress_ms(&self) -> u32 {
        self.since_progress_ms
    }
}
