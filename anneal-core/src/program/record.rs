//! Serialized program and command records
//!
//! Programs travel over the serial link and sit in flash as a flat
//! pre-order list of nodes. Frames are postcard-encoded with COBS framing
//! so a zero byte always terminates a frame.

use heapless::{String, Vec};
use serde::{Deserialize, Serialize};

use super::tree::{Component, CycleId, ProgramError, ProgramTree, Step, MAX_STEP_LABEL_LEN};
use super::CYCLE_POOL_CAPACITY;
use crate::command::{Command, StartCommand, MAX_NAME_LEN};

/// Maximum nodes in a serialized program
pub const MAX_PROGRAM_NODES: usize = 48;

/// Record decoding and building errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecordError {
    /// Frame is not a valid postcard/COBS record
    Decode,
    /// Output buffer too small
    Encode,
    /// `Begin`/`End` markers do not pair up
    Unbalanced,
    /// Tree could not be built
    Program(ProgramError),
}

impl From<ProgramError> for RecordError {
    fn from(e: ProgramError) -> Self {
        RecordError::Program(e)
    }
}

/// One program node in pre-order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NodeRecord {
    /// Hold a temperature
    Step {
        label: String<MAX_STEP_LABEL_LEN>,
        temp_c: f32,
        duration_s: u32,
    },
    /// Terminal step
    Final { temp_c: f32 },
    /// Open a nested cycle
    Begin { repeats: u16 },
    /// Close the innermost open cycle
    End,
}

/// A complete program as sent by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProgramRecord {
    /// Program name
    pub name: String<MAX_NAME_LEN>,
    /// Heated lid target in °C
    pub lid_temp_c: f32,
    /// Nodes of the implicit single-repeat root cycle
    pub nodes: Vec<NodeRecord, MAX_PROGRAM_NODES>,
}

impl ProgramRecord {
    /// Allocate the program into a fresh tree
    pub fn build(&self) -> Result<ProgramTree, RecordError> {
        let mut tree = ProgramTree::new();
        let root = tree.add_cycle(1)?;
        let mut open: Vec<CycleId, CYCLE_POOL_CAPACITY> = Vec::new();
        open.push(root).map_err(|_| RecordError::Unbalanced)?;

        for node in &self.nodes {
            let parent = *open.last().ok_or(RecordError::Unbalanced)?;
            match node {
                NodeRecord::Step {
                    label,
                    temp_c,
                    duration_s,
                } => {
                    let step = tree.add_step(Step::new(*temp_c, *duration_s).with_label(label))?;
                    tree.push(parent, Component::Step(step))?;
                }
                NodeRecord::Final { temp_c } => {
                    let step = tree.add_step(Step::final_step(*temp_c))?;
                    tree.push(parent, Component::Step(step))?;
                }
                NodeRecord::Begin { repeats } => {
                    let cycle = tree.add_cycle(*repeats)?;
                    tree.push(parent, Component::Cycle(cycle))?;
                    open.push(cycle).map_err(|_| RecordError::Unbalanced)?;
                }
                NodeRecord::End => {
                    if open.len() <= 1 {
                        return Err(RecordError::Unbalanced);
                    }
                    open.pop();
                }
            }
        }

        if open.len() != 1 {
            return Err(RecordError::Unbalanced);
        }
        tree.set_root(root)?;
        Ok(tree)
    }
}

/// A command as sent by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandRecord {
    Start(ProgramRecord),
    Stop,
    Config { contrast: u8 },
}

impl CommandRecord {
    /// Decode a COBS frame in place
    pub fn decode_frame(frame: &mut [u8]) -> Result<Self, RecordError> {
        postcard::from_bytes_cobs(frame).map_err(|_| RecordError::Decode)
    }

    /// Encode as a COBS frame, returning the used part of `buf`
    pub fn encode_frame<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], RecordError> {
        postcard::to_slice_cobs(self, buf).map_err(|_| RecordError::Encode)
    }

    /// Check that any program carried would build
    pub fn validate(&self) -> Result<(), RecordError> {
        if let CommandRecord::Start(record) = self {
            record.build()?;
        }
        Ok(())
    }

    /// Turn the record into a command, building any program it carries
    pub fn into_command(self) -> Result<Command, RecordError> {
        match self {
            CommandRecord::Start(record) => {
                let program = record.build()?;
                Ok(Command::Start(StartCommand {
                    program,
                    display_cycle: None,
                    name: record.name,
                    lid_temp_c: record.lid_temp_c,
                }))
            }
            CommandRecord::Stop => Ok(Command::Stop),
            CommandRecord::Config { contrast } => Ok(Command::Config { contrast }),
        }
    }
}
