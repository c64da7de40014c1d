//! NVS-backed settings storage.
//!
//! The ESP32 has no EEPROM, so a small byte image is kept in RAM and stored
//! as one NVS blob. Reads come from the image; a write that changes a byte
//! updates the image and rewrites the blob.

use esp_idf_hal::sys::EspError;
use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs, NvsDefault};
use log::debug;

use crate::traits::SettingsStorage;

/// Size of the emulated EEPROM in bytes.
pub const EEPROM_SIZE: usize = 16;

const NAMESPACE: &str = "sounder";
const BLOB_KEY: &str = "eeprom";

/// Failure of [`Esp32Eeprom`].
#[derive(Debug)]
pub enum NvsEepromError {
    /// Offset past [`EEPROM_SIZE`].
    OutOfRange(usize),
    /// The NVS driver failed.
    Nvs(EspError),
}

impl From<EspError> for NvsEepromError {
    fn from(e: EspError) -> Self {
        NvsEepromError::Nvs(e)
    }
}

impl core::fmt::Display for NvsEepromError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            NvsEepromError::OutOfRange(offset) => write!(f, "offset {} out of range", offset),
            NvsEepromError::Nvs(e) => write!(f, "nvs: {}", e),
        }
    }
}

impl std::error::Error for NvsEepromError {}

/// EEPROM-style byte storage in the default NVS partition.
pub struct Esp32Eeprom {
    nvs: EspNvs<NvsDefault>,
    image: [u8; EEPROM_SIZE],
}

impl Esp32Eeprom {
    /// Open the namespace and load the stored image (erased bytes read `0xFF`).
    pub fn new(partition: EspDefaultNvsPartition) -> Result<Self, NvsEepromError> {
        let nvs = EspNvs::new(partition, NAMESPACE, true)?;
        let mut image = [0xFF; EEPROM_SIZE];
        let mut buf = [0u8; EEPROM_SIZE];
        if let Some(stored) = nvs.get_blob(BLOB_KEY, &mut buf)? {
            let n = stored.len().min(EEPROM_SIZE);
            image[..n].copy_from_slice(&stored[..n]);
        }
        debug!("nvs: loaded {:02x?}", image);
        Ok(Self { nvs, image })
    }
}

impl SettingsStorage for Esp32Eeprom {
    type Error = NvsEepromError;

    fn read(&mut self, offset: usize) -> Result<u8, NvsEepromError> {
        self.image
            .get(offset)
            .copied()
            .ok_or(NvsEepromError::OutOfRange(offset))
    }

    fn write(&mut self, offset: usize, value: u8) -> Result<(), NvsEepromError> {
        let cell = self
            .image
            .get_mut(offset)
            .ok_or(NvsEepromError::OutOfRange(offset))?;
        if *cell != value {
            *cell = value;
            self.nvs.set_blob(BLOB_KEY, &self.image)?;
        }
        Ok(())
    }
}
