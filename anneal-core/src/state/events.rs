//! Events that trigger program state transitions

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// External actuator power became present
    PowerApplied,
    /// External actuator power was removed
    PowerLost,
    /// Startup delay elapsed
    StartupElapsed,
    /// Start requested with a program loaded
    Start,
    /// Lid reached its target
    LidReady,
    /// Program iterator yielded no further step, or a zero-length one
    ProgramExhausted,
    /// Stop requested
    Stop,
}
