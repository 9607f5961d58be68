//! Program store backed by the boot-time flash snapshot
//!
//! Reads come from values loaded before the control loop starts; writes
//! update the snapshot and are queued for the persist task.

use defmt::*;

use anneal_core::command::Command;
use anneal_core::program::CommandRecord;
use anneal_core::traits::ProgramStore;

use crate::channels::{Frame, PersistRequest, PERSIST_CHANNEL};
use crate::flash::BootState;

pub struct CachedStore {
    contrast: u8,
    program: Option<Frame>,
}

impl CachedStore {
    pub fn new(boot: BootState) -> Self {
        Self {
            contrast: boot.contrast,
            program: boot.program,
        }
    }
}

impl ProgramStore for CachedStore {
    fn retrieve_program(&mut self, scratch: &mut [u8]) -> Option<Command> {
        let frame = self.program.as_ref()?;
        let scratch = scratch.get_mut(..frame.len())?;
        scratch.copy_from_slice(frame);

        match CommandRecord::decode_frame(scratch).and_then(CommandRecord::into_command) {
            Ok(command) => Some(command),
            Err(e) => {
                warn!("Stored program rejected: {:?}", e);
                None
            }
        }
    }

    fn store_contrast(&mut self, level: u8) {
        self.contrast = level;
        if PERSIST_CHANNEL
            .try_send(PersistRequest::Contrast(level))
            .is_err()
        {
            warn!("Persist queue full, contrast not saved");
        }
    }

    fn retrieve_contrast(&mut self) -> u8 {
        self.contrast
    }
}
