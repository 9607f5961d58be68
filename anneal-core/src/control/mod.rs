//! Dual-mode temperature control
//!
//! Each thermal axis drives full power while far from its target and
//! hands over to a PID loop once inside the bang-bang threshold. The
//! plate adds direction- and band-dependent gains and cooling anti-windup.

pub mod axis;
pub mod plate;
pub mod tuning;

pub use axis::{bang_bang_drive, select_mode, AxisController, ControlMode};
pub use plate::PlateController;
pub use tuning::{select_plate_tuning, RampDirection};
