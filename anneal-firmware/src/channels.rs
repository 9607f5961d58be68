//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::Vec;

use anneal_core::program::CommandRecord;

/// Largest COBS frame accepted from the host, terminator included
pub const MAX_FRAME_LEN: usize = 1280;

/// Raw host frame
pub type Frame = Vec<u8, MAX_FRAME_LEN>;

/// Channel capacity for decoded host commands
const COMMAND_CHANNEL_SIZE: usize = 2;

/// Channel capacity for flash writes
const PERSIST_CHANNEL_SIZE: usize = 2;

/// Flash write requests from the control loop and serial link
pub enum PersistRequest {
    /// Last accepted start frame, replayed after power-up
    Program(Frame),
    /// Display contrast
    Contrast(u8),
}

/// Decoded commands from the host link, drained by the control loop
pub static COMMAND_CHANNEL: Channel<CriticalSectionRawMutex, CommandRecord, COMMAND_CHANNEL_SIZE> =
    Channel::new();

/// Pending flash writes
pub static PERSIST_CHANNEL: Channel<CriticalSectionRawMutex, PersistRequest, PERSIST_CHANNEL_SIZE> =
    Channel::new();
