//! State machine for program execution
//!
//! The program state is explicit, finite, and deterministic. The control
//! loop feeds it events; every other transition is ignored.

pub mod events;
pub mod machine;

pub use events::Event;
pub use machine::ProgramState;
