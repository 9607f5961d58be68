//! Flash storage
//!
//! Uses sequential-storage for wear-leveled key-value storage in the
//! last 64KB of flash. Holds the last start frame and display contrast.

use defmt::*;
use embassy_rp::flash::{Async, Flash};
use embassy_rp::peripherals::{DMA_CH0, FLASH};
use embassy_rp::Peri;
use sequential_storage::cache::NoCache;
use sequential_storage::map::{self, SerializationError};

use crate::channels::{Frame, MAX_FRAME_LEN};

pub const FLASH_SIZE: usize = 2 * 1024 * 1024;
pub const STORE_PARTITION_SIZE: usize = 64 * 1024;
pub const STORE_PARTITION_START: usize = FLASH_SIZE - STORE_PARTITION_SIZE;

/// Flash range for the store partition
pub const STORE_RANGE: core::ops::Range<u32> = (STORE_PARTITION_START as u32)..(FLASH_SIZE as u32);

/// Contrast used until one is configured
pub const DEFAULT_CONTRAST: u8 = 100;

/// Item buffer: a full frame plus item header
const ITEM_BUF_LEN: usize = MAX_FRAME_LEN + 32;

/// Storage keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum StorageKey {
    /// Last start frame (COBS, terminator included)
    Program = 0,
    /// Display contrast byte
    Contrast = 1,
}

impl map::Key for StorageKey {
    fn serialize_into(&self, buffer: &mut [u8]) -> Result<usize, SerializationError> {
        let slot = buffer.first_mut().ok_or(SerializationError::BufferTooSmall)?;
        *slot = *self as u8;
        Ok(1)
    }

    fn deserialize_from(buffer: &[u8]) -> Result<(Self, usize), SerializationError> {
        let key = match buffer.first() {
            Some(0) => StorageKey::Program,
            Some(1) => StorageKey::Contrast,
            Some(_) => return Err(SerializationError::InvalidFormat),
            None => return Err(SerializationError::BufferTooSmall),
        };
        Ok((key, 1))
    }
}

/// Errors from flash operations
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// Storage operation failed
    Storage,
    /// Key not found
    NotFound,
    /// Stored item larger than a frame
    TooLarge,
}

/// Values read once at boot
pub struct BootState {
    pub contrast: u8,
    pub program: Option<Frame>,
}

/// Wear-leveled key-value flash storage
pub struct FlashStorage<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
    buffer: [u8; ITEM_BUF_LEN],
}

impl<'d> FlashStorage<'d> {
    pub fn new(flash: Peri<'d, FLASH>, dma: Peri<'d, DMA_CH0>) -> Self {
        Self {
            flash: Flash::new(flash, dma),
            buffer: [0u8; ITEM_BUF_LEN],
        }
    }

    /// Read the stored frame and contrast
    pub async fn load(&mut self) -> BootState {
        let contrast = match self.read_contrast().await {
            Ok(level) => level,
            Err(_) => {
                info!("No stored contrast, using {}", DEFAULT_CONTRAST);
                DEFAULT_CONTRAST
            }
        };

        let program = match self.read_program().await {
            Ok(frame) => {
                info!("Stored program frame: {} bytes", frame.len());
                Some(frame)
            }
            Err(FlashError::NotFound) => None,
            Err(e) => {
                warn!("Stored program unreadable: {:?}", e);
                None
            }
        };

        BootState { contrast, program }
    }

    pub async fn read_contrast(&mut self) -> Result<u8, FlashError> {
        map::fetch_item::<StorageKey, u8, _>(
            &mut self.flash,
            STORE_RANGE,
            &mut NoCache::new(),
            &mut self.buffer,
            &StorageKey::Contrast,
        )
        .await
        .map_err(|_| FlashError::Storage)?
        .ok_or(FlashError::NotFound)
    }

    pub async fn read_program(&mut self) -> Result<Frame, FlashError> {
        let data = map::fetch_item::<StorageKey, &[u8], _>(
            &mut self.flash,
            STORE_RANGE,
            &mut NoCache::new(),
            &mut self.buffer,
            &StorageKey::Program,
        )
        .await
        .map_err(|_| FlashError::Storage)?
        .ok_or(FlashError::NotFound)?;

        Frame::from_slice(data).map_err(|_| FlashError::TooLarge)
    }

    pub async fn write_contrast(&mut self, level: u8) -> Result<(), FlashError> {
        map::store_item(
            &mut self.flash,
            STORE_RANGE,
            &mut NoCache::new(),
            &mut self.buffer,
            &StorageKey::Contrast,
            &level,
        )
        .await
        .map_err(|_| FlashError::Storage)
    }

    pub async fn write_program(&mut self, frame: &[u8]) -> Result<(), FlashError> {
        map::store_item(
            &mut self.flash,
            STORE_RANGE,
            &mut NoCache::new(),
            &mut self.buffer,
            &StorageKey::Program,
            &frame,
        )
        .await
        .map_err(|_| FlashError::Storage)
    }
}
