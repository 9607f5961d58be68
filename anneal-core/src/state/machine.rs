//! Program state machine definition

use super::events::Event;

/// Program execution states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProgramState {
    /// No external power; actuators unpowered
    #[default]
    Off,
    /// Power applied, waiting out the startup delay
    Startup,
    /// Idle with power, ready to start
    Stopped,
    /// Heating the lid before the program starts
    LidWait,
    /// Executing program steps
    Running,
    /// Program finished; plate settles at the final step
    Complete,
}

impl ProgramState {
    /// Check if the plate is under program control
    pub fn plate_active(&self) -> bool {
        matches!(self, ProgramState::Running | ProgramState::Complete)
    }

    /// Check if the lid heater is allowed to run
    pub fn lid_active(&self) -> bool {
        matches!(self, ProgramState::Running | ProgramState::LidWait)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use ProgramState::*;

        match (self, event) {
            (Off, PowerApplied) => Startup,
            (Off, _) => Off,

            // Power loss and stop apply from every powered state
            (_, PowerLost) => Off,
            (_, Stop) => Stopped,

            (Startup, StartupElapsed) => Stopped,
            (Stopped, Start) => LidWait,
            (LidWait, LidReady) => Running,
            (Running, ProgramExhausted) => Complete,

            // Default: stay in current state
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ProgramState; 6] = [
        ProgramState::Off,
        ProgramState::Startup,
        ProgramState::Stopped,
        ProgramState::LidWait,
        ProgramState::Running,
        ProgramState::Complete,
    ];

    #[test]
    fn test_power_up_sequence() {
        let state = ProgramState::Off.transition(Event::PowerApplied);
        assert_eq!(state, ProgramState::Startup);
        assert_eq!(state.transition(Event::StartupElapsed), ProgramState::Stopped);
    }

    #[test]
    fn test_run_sequence() {
        let mut state = ProgramState::Stopped;
        state = state.transition(Event::Start);
        assert_eq!(state, ProgramState::LidWait);
        state = state.transition(Event::LidReady);
        assert_eq!(state, ProgramState::Running);
        state = state.transition(Event::ProgramExhausted);
        assert_eq!(state, ProgramState::Complete);
    }

    #[test]
    fn test_power_lost_from_any_state() {
        for state in ALL {
            assert_eq!(state.transition(Event::PowerLost), ProgramState::Off);
        }
    }

    #[test]
    fn test_stop_from_powered_states() {
        for state in ALL {
            let next = state.transition(Event::Stop);
            if state == ProgramState::Off {
                assert_eq!(next, ProgramState::Off);
            } else {
                assert_eq!(next, ProgramState::Stopped);
            }
        }
    }

    #[test]
    fn test_off_ignores_everything_but_power() {
        for event in [
            Event::StartupElapsed,
            Event::Start,
            Event::LidReady,
            Event::ProgramExhausted,
            Event::Stop,
        ] {
            assert_eq!(ProgramState::Off.transition(event), ProgramState::Off);
        }
    }

    #[test]
    fn test_start_only_from_stopped() {
        for state in ALL {
            let next = state.transition(Event::Start);
            if state == ProgramState::Stopped {
                assert_eq!(next, ProgramState::LidWait);
            } else {
                assert_eq!(next, state);
            }
        }
    }

    #[test]
    fn test_invalid_events_ignored() {
        assert_eq!(
            ProgramState::Running.transition(Event::LidReady),
            ProgramState::Running
        );
        assert_eq!(
            ProgramState::Stopped.transition(Event::ProgramExhausted),
            ProgramState::Stopped
        );
        assert_eq!(
            ProgramState::Complete.transition(Event::PowerApplied),
            ProgramState::Complete
        );
    }

    #[test]
    fn test_activity_flags() {
        assert!(ProgramState::Running.plate_active());
        assert!(ProgramState::Complete.plate_active());
        assert!(!ProgramState::LidWait.plate_active());
        assert!(ProgramState::LidWait.lid_active());
        assert!(!ProgramState::Complete.lid_active());
    }
}
