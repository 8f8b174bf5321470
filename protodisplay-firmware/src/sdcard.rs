//! SD card storage
//!
//! FAT volume 0 of an SPI SD card, opened once at boot. Files are looked up
//! in the root directory by their 8.3 name (see [`short_name`]). Names that
//! do not fit 8.3 are matched against the directory's long filename entries
//! to find the short name the card gave them. One file at a time can be
//! streamed to the frame decoder.

use core::fmt::Debug;

use embedded_sdmmc::{
    BlockDevice, LfnBuffer, Mode, RawDirectory, RawFile, ShortFileName, TimeSource, Timestamp,
    VolumeIdx, VolumeManager,
};
use protodisplay_hal::{short_name, FileStorage, StorageError, StreamSource};

/// Room for one long filename entry, UTF-8 encoded
const LFN_BUFFER_LEN: usize = 256;

/// The board has no RTC; files are never written, so any timestamp will do
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedTime;

impl TimeSource for FixedTime {
    fn get_timestamp(&self) -> Timestamp {
        Timestamp {
            year_since_1970: 0,
            zero_indexed_month: 0,
            zero_indexed_day: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }
}

fn map_error<E: Debug>(e: embedded_sdmmc::Error<E>) -> StorageError {
    match e {
        embedded_sdmmc::Error::NotFound => StorageError::NotFound,
        embedded_sdmmc::Error::FilenameError(_) => StorageError::InvalidName,
        _ => StorageError::Io,
    }
}

/// Read-only view of the card's root directory
pub struct SdStorage<D: BlockDevice, T: TimeSource> {
    volumes: VolumeManager<D, T>,
    root: Option<RawDirectory>,
    stream: Option<RawFile>,
}

impl<D: BlockDevice, T: TimeSource> SdStorage<D, T> {
    pub fn new(volumes: VolumeManager<D, T>) -> Self {
        Self {
            volumes,
            root: None,
            stream: None,
        }
    }

    /// Open the root directory of the first FAT volume
    ///
    /// Until this succeeds every lookup fails, and the display runs with
    /// what it can do without files.
    pub fn mount(&mut self) -> Result<(), StorageError> {
        let volume = self
            .volumes
            .open_raw_volume(VolumeIdx(0))
            .map_err(map_error)?;
        let root = self.volumes.open_root_dir(volume).map_err(map_error)?;
        self.root = Some(root);
        Ok(())
    }

    /// Short name of `name` in the root directory
    fn resolve(&mut self, root: RawDirectory, name: &str) -> Result<ShortFileName, StorageError> {
        if name.is_empty() {
            return Err(StorageError::InvalidName);
        }
        match short_name(name) {
            Ok(short) => {
                ShortFileName::create_from_str(&short).map_err(|_| StorageError::InvalidName)
            }
            Err(_) => self.find_long_name(root, name),
        }
    }

    /// Scan the directory for an entry whose long name is `name`
    fn find_long_name(
        &mut self,
        root: RawDirectory,
        name: &str,
    ) -> Result<ShortFileName, StorageError> {
        let mut storage = [0u8; LFN_BUFFER_LEN];
        let mut lfn = LfnBuffer::new(&mut storage);
        let mut found = None;
        self.volumes
            .iterate_dir_lfn(root, &mut lfn, |entry, long_name| {
                // FAT compares long names without regard to case
                if found.is_none()
                    && long_name.is_some_and(|long| long.eq_ignore_ascii_case(name))
                {
                    found = Some(entry.name.clone());
                }
            })
            .map_err(map_error)?;
        found.ok_or(StorageError::NotFound)
    }

    fn open_file(&mut self, name: &str) -> Result<RawFile, StorageError> {
        let root = self.root.ok_or(StorageError::Io)?;
        let short = self.resolve(root, name)?;
        self.volumes
            .open_file_in_dir(root, short, Mode::ReadOnly)
            .map_err(map_error)
    }

    fn close_after<R>(&mut self, file: RawFile, result: R) -> R {
        let _ = self.volumes.close_file(file);
        result
    }

    fn read_some(&mut self, file: RawFile, buf: &mut [u8]) -> Result<usize, StorageError> {
        match self.volumes.read(file, buf) {
            Ok(n) => Ok(n),
            Err(embedded_sdmmc::Error::EndOfFile) => Ok(0),
            Err(e) => Err(map_error(e)),
        }
    }
}

impl<D: BlockDevice, T: TimeSource> FileStorage for SdStorage<D, T> {
    fn exists(&mut self, name: &str) -> bool {
        let Some(root) = self.root else {
            return false;
        };
        let Ok(short) = self.resolve(root, name) else {
            return false;
        };
        self.volumes.find_directory_entry(root, short).is_ok()
    }

    fn read_file(&mut self, name: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        let file = self.open_file(name)?;

        let result = match self.volumes.file_length(file) {
            Ok(len) if len as usize > buf.len() => Err(StorageError::BufferTooSmall),
            Ok(len) => {
                let len = len as usize;
                let mut filled = 0;
                while filled < len {
                    match self.read_some(file, &mut buf[filled..len]) {
                        Ok(0) => break,
                        Ok(n) => filled += n,
                        Err(e) => return self.close_after(file, Err(e)),
                    }
                }
                Ok(filled)
            }
            Err(e) => Err(map_error(e)),
        };
        self.close_after(file, result)
    }
}

impl<D: BlockDevice, T: TimeSource> StreamSource for SdStorage<D, T> {
    fn open(&mut self, name: &str) -> Result<u32, StorageError> {
        self.close();
        let file = self.open_file(name)?;
        match self.volumes.file_length(file) {
            Ok(len) => {
                self.stream = Some(file);
                Ok(len)
            }
            Err(e) => self.close_after(file, Err(map_error(e))),
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, StorageError> {
        let file = self.stream.ok_or(StorageError::NotOpen)?;
        self.read_some(file, buf)
    }

    fn seek(&mut self, position: u32) -> Result<(), StorageError> {
        let file = self.stream.ok_or(StorageError::NotOpen)?;
        self.volumes
            .file_seek_from_start(file, position)
            .map_err(map_error)
    }

    fn close(&mut self) {
        if let Some(file) = self.stream.take() {
            let _ = self.volumes.close_file(file);
        }
    }
}
