//! Checksum-protected station settings.
//!
//! The configured station index lives in a four byte record at the start of
//! non-volatile storage:
//!
//! ```text
//! offset  0        1          2          3
//!       [ 0x23 ] [ station ] [ crc hi ] [ crc lo ]
//! ```
//!
//! The checksum is CRC-16/CCITT (poly `0x1021`, preset `0xFFFF`, augmented
//! with two zero bytes) over the marker and station bytes, which is the
//! `CRC_16_SPI_FUJITSU` catalogue entry. A record is valid only when the
//! marker matches and the checksum over all four bytes folds to zero.
//!
//! # Example
//!
//! ```rust
//! use rs_sounder::hal::MockEeprom;
//! use rs_sounder::settings::SettingsStore;
//!
//! let mut store = SettingsStore::new(MockEeprom::new(16));
//! assert!(!store.load().unwrap().valid); // erased EEPROM
//!
//! store.save(3).unwrap();
//! let settings = store.load().unwrap();
//! assert!(settings.valid);
//! assert_eq!(settings.station, 3);
//! ```

use crc::{Crc, CRC_16_SPI_FUJITSU};
use log::{debug, info, warn};

use crate::traits::SettingsStorage;

/// Marker byte of a written record.
pub const SETTINGS_MAGIC: u8 = 0x23;

/// Size of the settings record in bytes.
pub const RECORD_LEN: usize = 4;

const CCITT: Crc<u16> = Crc::<u16>::new(&CRC_16_SPI_FUJITSU);

/// Persisted station configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StationSettings {
    /// Index of this station in the configured station list.
    pub station: u8,
    /// Whether the record passed its checksum when it was loaded.
    pub valid: bool,
}

impl StationSettings {
    /// Settings for a freshly configured station.
    pub fn configured(station: u8) -> Self {
        Self {
            station,
            valid: true,
        }
    }
}

/// Build the on-storage record for `station`.
///
/// ```
/// use rs_sounder::settings::{encode_record, decode_record};
///
/// let record = encode_record(2);
/// assert_eq!(record[0], 0x23);
/// assert_eq!(decode_record(&record), Some(2));
/// ```
pub fn encode_record(station: u8) -> [u8; RECORD_LEN] {
    let crc = CCITT.checksum(&[SETTINGS_MAGIC, station]).to_be_bytes();
    [SETTINGS_MAGIC, station, crc[0], crc[1]]
}

/// Validate a record, returning the station index it holds.
pub fn decode_record(record: &[u8; RECORD_LEN]) -> Option<u8> {
    if record[0] != SETTINGS_MAGIC || CCITT.checksum(record) != 0 {
        return None;
    }
    Some(record[1])
}

/// Settings record stored at a fixed offset of a [`SettingsStorage`].
#[derive(Debug)]
pub struct SettingsStore<S: SettingsStorage> {
    storage: S,
    base: usize,
}

impl<S: SettingsStorage> SettingsStore<S> {
    /// Store the record at offset 0.
    pub fn new(storage: S) -> Self {
        Self::with_base(storage, 0)
    }

    /// Store the record at `base`.
    pub fn with_base(storage: S, base: usize) -> Self {
        Self { storage, base }
    }

    /// Read and validate the record.
    ///
    /// A missing or corrupt record is not an error: it loads as invalid
    /// settings for station 0. Only storage failures are reported.
    pub fn load(&mut self) -> Result<StationSettings, S::Error> {
        let mut record = [0u8; RECORD_LEN];
        for (i, byte) in record.iter_mut().enumerate() {
            *byte = self.storage.read(self.base + i)?;
        }

        match decode_record(&record) {
            Some(station) => {
                info!("settings: station {} loaded", station);
                Ok(StationSettings::configured(station))
            }
            None => {
                warn!("settings: no valid record ({:02x?})", record);
                Ok(StationSettings::default())
            }
        }
    }

    /// Persist `station`.
    ///
    /// The marker is cleared first and written last, so a write interrupted
    /// part way never leaves a record that validates with mixed contents.
    pub fn save(&mut self, station: u8) -> Result<(), S::Error> {
        let record = encode_record(station);
        debug!("settings: writing {:02x?}", record);

        self.storage.write(self.base, 0)?;
        for (i, byte) in record.iter().enumerate().skip(1) {
            self.storage.write(self.base + i, *byte)?;
        }
        self.storage.write(self.base, SETTINGS_MAGIC)?;

        info!("settings: station {} saved", station);
        Ok(())
    }

    /// Mutable access to the underlying storage.
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Give back the underlying storage.
    pub fn into_inner(self) -> S {
        self.storage
    }
}
