//! Persistent storage trait

use crate::command::Command;

/// Non-volatile storage for the last program and display settings
///
/// Only used at startup and on configuration commands.
pub trait ProgramStore {
    /// Load the persisted start command, decoding through `scratch`
    fn retrieve_program(&mut self, scratch: &mut [u8]) -> Option<Command>;

    /// Persist display contrast
    fn store_contrast(&mut self, level: u8);

    /// Load display contrast
    fn retrieve_contrast(&mut self) -> u8;
}
