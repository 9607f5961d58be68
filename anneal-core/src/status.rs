//! Status snapshot handed to the display each tick

use core::fmt::Write;

use heapless::String;

use crate::command::MAX_NAME_LEN;
use crate::program::MAX_STEP_LABEL_LEN;
use crate::state::ProgramState;
use crate::traits::ThermalDirection;

/// Externally reported plate activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ThermalState {
    #[default]
    Idle,
    Heating,
    Cooling,
    Holding,
}

impl ThermalState {
    /// Combine the drive direction with the ramp/hold phase
    pub fn derive(direction: ThermalDirection, ramping: bool) -> Self {
        match (direction, ramping) {
            (ThermalDirection::Off, _) => ThermalState::Idle,
            (ThermalDirection::Heat, true) => ThermalState::Heating,
            (ThermalDirection::Cool, true) => ThermalState::Cooling,
            (_, false) => ThermalState::Holding,
        }
    }
}

/// Repeat progress of the display cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleProgress {
    /// 1-based current repeat, never above `total`
    pub current: u16,
    pub total: u16,
}

/// Snapshot of the control loop for display and reporting
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status {
    pub state: ProgramState,
    pub thermal_state: ThermalState,
    pub program_name: String<MAX_NAME_LEN>,
    /// Label of the current step (may be empty)
    pub step_label: String<MAX_STEP_LABEL_LEN>,
    pub plate_temp_c: f32,
    pub plate_target_c: Option<f32>,
    pub lid_temp_c: f32,
    pub lid_target_c: f32,
    pub cycle: Option<CycleProgress>,
    /// Estimated seconds remaining, while running
    pub eta_s: Option<u32>,
    /// Seconds since the program started running
    pub elapsed_s: u32,
    /// Last plate read failed; temperature is the previous reading
    pub plate_stale: bool,
    /// Last lid read failed; temperature is the previous reading
    pub lid_stale: bool,
}

impl Status {
    /// Headline for the current state
    pub fn label(&self) -> &str {
        match self.state {
            ProgramState::Off => "Powered Off",
            ProgramState::Startup | ProgramState::Stopped => "Ready",
            ProgramState::LidWait => "Heating Lid",
            ProgramState::Complete => "Run Complete",
            ProgramState::Running => match self.thermal_state {
                ThermalState::Heating => "Heating",
                ThermalState::Cooling => "Cooling",
                ThermalState::Holding if !self.step_label.is_empty() => &self.step_label,
                ThermalState::Holding => "Holding",
                ThermalState::Idle => "Idle",
            },
        }
    }

    /// `ETA: ...` text while an estimate is available
    pub fn eta_text(&self) -> Option<String<16>> {
        self.eta_s.map(format_eta)
    }

    /// `current of total` text for the display cycle
    pub fn cycle_text(&self) -> Option<String<16>> {
        let progress = self.cycle?;
        let mut out = String::new();
        write!(out, "{} of {}", progress.current, progress.total).ok()?;
        Some(out)
    }
}

/// Format remaining seconds for a 20-column display
pub fn format_eta(remaining_s: u32) -> String<16> {
    let hours = remaining_s / 3600;
    let minutes = (remaining_s % 3600) / 60;
    let seconds = remaining_s % 60;

    let mut out = String::new();
    // 16 bytes always fits the longest form
    let _ = if hours >= 10 {
        write!(out, "ETA: >10h")
    } else if hours > 0 || minutes > 0 {
        write!(out, "ETA: {}:{:02}", hours, minutes)
    } else {
        write!(out, "ETA: {}s", seconds)
    };
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thermal_state_derivation() {
        assert_eq!(
            ThermalState::derive(ThermalDirection::Off, true),
            ThermalState::Idle
        );
        assert_eq!(
            ThermalState::derive(ThermalDirection::Heat, true),
            ThermalState::Heating
        );
        assert_eq!(
            ThermalState::derive(ThermalDirection::Cool, true),
            ThermalState::Cooling
        );
        assert_eq!(
            ThermalState::derive(ThermalDirection::Cool, false),
            ThermalState::Holding
        );
    }

    #[test]
    fn test_format_eta() {
        assert_eq!(format_eta(0).as_str(), "ETA: 0s");
        assert_eq!(format_eta(42).as_str(), "ETA: 42s");
        assert_eq!(format_eta(60).as_str(), "ETA: 0:01");
        assert_eq!(format_eta(3 * 3600 + 5 * 60 + 59).as_str(), "ETA: 3:05");
        assert_eq!(format_eta(10 * 3600).as_str(), "ETA: >10h");
        assert_eq!(format_eta(u32::MAX).as_str(), "ETA: >10h");
    }

    #[test]
    fn test_labels() {
        let mut status = Status::default();
        assert_eq!(status.label(), "Powered Off");

        status.state = ProgramState::Stopped;
        assert_eq!(status.label(), "Ready");

        status.state = ProgramState::LidWait;
        assert_eq!(status.label(), "Heating Lid");

        status.state = ProgramState::Running;
        status.thermal_state = ThermalState::Cooling;
        assert_eq!(status.label(), "Cooling");

        status.thermal_state = ThermalState::Holding;
        assert_eq!(status.label(), "Holding");
        status.step_label = String::try_from("Anneal").unwrap();
        assert_eq!(status.label(), "Anneal");

        status.state = ProgramState::Complete;
        assert_eq!(status.label(), "Run Complete");
    }

    #[test]
    fn test_cycle_text() {
        let mut status = Status::default();
        assert!(status.cycle_text().is_none());
        status.cycle = Some(CycleProgress {
            current: 3,
            total: 35,
        });
        assert_eq!(status.cycle_text().unwrap().as_str(), "3 of 35");
    }
}
