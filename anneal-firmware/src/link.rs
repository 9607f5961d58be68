//! Host command link
//!
//! The serial receive task decodes frames into the command channel; the
//! control loop drains it here once per tick.

use defmt::*;

use anneal_core::command::Command;
use anneal_core::traits::CommandSource;

use crate::channels::{COMMAND_CHANNEL, MAX_FRAME_LEN};

pub struct SerialLink {
    received: bool,
    scratch: [u8; MAX_FRAME_LEN],
}

impl SerialLink {
    pub fn new() -> Self {
        Self {
            received: false,
            scratch: [0u8; MAX_FRAME_LEN],
        }
    }
}

impl CommandSource for SerialLink {
    fn process(&mut self) -> Option<Command> {
        loop {
            let record = COMMAND_CHANNEL.try_receive().ok()?;
            self.received = true;
            match record.into_command() {
                Ok(command) => return Some(command),
                Err(e) => warn!("Host program rejected: {:?}", e),
            }
        }
    }

    fn command_received(&self) -> bool {
        self.received || !COMMAND_CHANNEL.is_empty()
    }

    fn buffer(&mut self) -> &mut [u8] {
        &mut self.scratch
    }
}
