//! Thermal actuator and controller implementations

pub mod lid;
pub mod peltier;
pub mod pid;

pub use lid::PwmLidHeater;
pub use peltier::PeltierBridge;
pub use pid::PidController;
