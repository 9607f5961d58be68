//! Run-time-remaining estimation
//!
//! The estimate is the program's total hold time plus its total ramp
//! distance scaled by an empirically measured ramp rate, minus the time
//! already spent. The rate defaults to one second per degree until a
//! cooling ramp has completed, since early heating ramps are faster than
//! the worst case.

use micromath::F32Ext;

use crate::program::{CycleId, ProgramTree};

/// Hold and ramp totals of a program
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProgramBudget {
    /// Sum of all non-final hold durations
    pub hold_s: u32,
    /// Sum of inter-step temperature changes, each less the start tolerance
    pub ramp_deg: f32,
}

impl ProgramBudget {
    /// Walk the whole program from `root`, starting at `start_temp`
    ///
    /// Leaves the tree's iteration state exhausted; callers restart it
    /// with `begin_iteration` before running.
    pub fn of_program(tree: &mut ProgramTree, root: CycleId, start_temp: f32, tolerance: f32) -> Self {
        let mut budget = ProgramBudget::default();
        let mut last_temp = start_temp;

        tree.begin_iteration(root);
        while let Some(id) = tree.next_step(root) {
            let Some(step) = tree.step(id) else { break };
            if step.is_final() {
                break;
            }
            budget.hold_s = budget.hold_s.saturating_add(step.duration_s());
            if step.temp_c() != last_temp {
                budget.ramp_deg += ((step.temp_c() - last_temp).abs() - tolerance).max(0.0);
            }
            last_temp = step.temp_c();
        }
        budget
    }
}

/// ETA state for one run
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EtaEstimator {
    budget: ProgramBudget,
    elapsed_ramp_deg: f32,
    elapsed_ramp_ms: u32,
    has_cooled: bool,
    remaining_s: u32,
}

impl EtaEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a run with the given totals, clearing all measurements
    pub fn plan(&mut self, budget: ProgramBudget) {
        *self = Self {
            budget,
            ..Self::default()
        };
    }

    /// Forget the current run
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Record a completed ramp segment
    pub fn ramp_completed(&mut self, start_temp: f32, end_temp: f32, duration_ms: u32) {
        self.elapsed_ramp_deg += (end_temp - start_temp).abs();
        self.elapsed_ramp_ms = self.elapsed_ramp_ms.saturating_add(duration_ms);
        if end_temp < start_temp {
            self.has_cooled = true;
        }
    }

    /// Measured ramp rate, or 1.0 until a cooling ramp has completed
    pub fn seconds_per_degree(&self) -> f32 {
        if self.elapsed_ramp_deg == 0.0 || !self.has_cooled {
            return 1.0;
        }
        // Whole seconds only
        (self.elapsed_ramp_ms / 1000) as f32 / self.elapsed_ramp_deg
    }

    /// Projected total run time in seconds
    pub fn estimated_total_s(&self) -> u32 {
        let ramp_s = self.budget.ramp_deg * self.seconds_per_degree();
        self.budget.hold_s.saturating_add(ramp_s as u32)
    }

    /// Refresh the estimate given the time since the program started
    pub fn update(&mut self, elapsed_s: u32) -> u32 {
        self.remaining_s = self.estimated_total_s().saturating_sub(elapsed_s);
        self.remaining_s
    }

    /// The run is over; nothing remains
    pub fn finish(&mut self) {
        self.remaining_s = 0;
    }

    /// Seconds remaining as of the last update
    pub fn remaining_s(&self) -> u32 {
        self.remaining_s
    }

    pub fn has_cooled(&self) -> bool {
        self.has_cooled
    }
}
