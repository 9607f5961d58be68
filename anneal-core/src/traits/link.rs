//! Host command link trait

use crate::command::Command;

/// Source of operator commands (serial link)
pub trait CommandSource {
    /// Take the next pending command, if any
    ///
    /// Called repeatedly each tick until it returns `None`.
    fn process(&mut self) -> Option<Command>;

    /// True once any command has arrived since boot
    fn command_received(&self) -> bool;

    /// Raw receive buffer, reused as scratch during startup recovery
    fn buffer(&mut self) -> &mut [u8];
}
