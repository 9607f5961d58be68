//! Thermal program model
//!
//! A program is a tree of steps grouped into repeated cycles, allocated
//! from fixed-capacity pools and walked depth-first one step at a time.

pub mod pool;
#[cfg(feature = "serde")]
pub mod record;
pub mod tree;

pub use pool::{Handle, Pool, PoolError};
#[cfg(feature = "serde")]
pub use record::{CommandRecord, NodeRecord, ProgramRecord, RecordError};
pub use tree::{
    truncated, Component, Cycle, CycleId, ProgramError, ProgramTree, Step, StepId,
    CYCLE_POOL_CAPACITY, MAX_CYCLE_CHILDREN, MAX_STEP_LABEL_LEN, STEP_POOL_CAPACITY,
};
