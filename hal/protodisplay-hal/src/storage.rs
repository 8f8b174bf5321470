//! Removable storage abstractions
//!
//! Playback configs and video frames live as plain files on an SD card.
//! Two views of the card are exposed:
//!
//! - [`FileStorage`] reads a small file (a playback config) in one go
//! - [`StreamSource`] is the open/read/seek/close capability an image decoder
//!   pulls frame data through
//!
//! FAT directories index files by 8.3 name. [`short_name`] gives that name
//! for files whose name already fits; longer names have to be resolved
//! against the directory's long filename entries by the implementation.

use heapless::String;

/// Errors from storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// No file with that name
    NotFound,
    /// Name cannot be represented on the medium
    InvalidName,
    /// Card or filesystem operation failed
    Io,
    /// Buffer too small for the file
    BufferTooSmall,
    /// Stream operation without an open file
    NotOpen,
}

/// Whole-file storage access
pub trait FileStorage {
    /// Check whether a file exists
    fn exists(&mut self, name: &str) -> bool;

    /// Read an entire file into `buf`
    ///
    /// # Returns
    /// The number of bytes read. Fails with [`StorageError::BufferTooSmall`]
    /// if the file does not fit.
    fn read_file(&mut self, name: &str, buf: &mut [u8]) -> Result<usize, StorageError>;
}

/// Sequential stream over one open file
///
/// At most one file is open at a time. Implementations must tolerate
/// `close` being called without a successful `open`.
pub trait StreamSource {
    /// Open a file for reading
    ///
    /// # Returns
    /// The file size in bytes.
    fn open(&mut self, name: &str) -> Result<u32, StorageError>;

    /// Read from the current position
    ///
    /// Returns the number of bytes read; `0` at end of file.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Move the read position to an absolute byte offset
    fn seek(&mut self, position: u32) -> Result<(), StorageError>;

    /// Close the open file, if any
    fn close(&mut self);
}

impl<T: FileStorage + ?Sized> FileStorage for &mut T {
    fn exists(&mut self, name: &str) -> bool {
        (**self).exists(name)
    }

    fn read_file(&mut self, name: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        (**self).read_file(name, buf)
    }
}

impl<T: StreamSource + ?Sized> StreamSource for &mut T {
    fn open(&mut self, name: &str) -> Result<u32, StorageError> {
        (**self).open(name)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, StorageError> {
        (**self).read(buf)
    }

    fn seek(&mut self, position: u32) -> Result<(), StorageError> {
        (**self).seek(position)
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// An 8.3 filename, e.g. `CLIP_006.PNG`
pub type ShortName = String<12>;

fn fat_char(ch: char) -> Option<char> {
    match ch {
        'a'..='z' => Some(ch.to_ascii_uppercase()),
        'A'..='Z' | '0'..='9' => Some(ch),
        '!' | '#' | '$' | '%' | '&' | '\'' | '(' | ')' | '-' | '@' | '^' | '_' | '`' | '{'
        | '}' | '~' => Some(ch),
        _ => None,
    }
}

/// Upper-case one name part; `None` if it holds a character 8.3 names lack
fn short_part<const N: usize>(part: &str) -> Option<String<N>> {
    let mut out = String::new();
    for ch in part.chars() {
        out.push(fat_char(ch)?).ok()?;
    }
    Some(out)
}

/// FAT 8.3 form of `name`, if it has one
///
/// Names that fit (`clip_006.png`) are upper-cased (`CLIP_006.PNG`). Names
/// that do not fit return [`StorageError::InvalidName`]: their alias on the
/// card depends on what else is in the directory, so it has to be looked up
/// there rather than guessed.
pub fn short_name(name: &str) -> Result<ShortName, StorageError> {
    let (base, ext) = match name.rfind('.') {
        Some(dot) if dot > 0 && dot + 1 < name.len() => (&name[..dot], &name[dot + 1..]),
        Some(_) => return Err(StorageError::InvalidName),
        None => (name, ""),
    };

    let base = short_part::<8>(base).ok_or(StorageError::InvalidName)?;
    let ext = short_part::<3>(ext).ok_or(StorageError::InvalidName)?;
    if base.is_empty() {
        return Err(StorageError::InvalidName);
    }

    let mut out = ShortName::new();
    let overflow = |_| StorageError::InvalidName;
    out.push_str(&base).map_err(overflow)?;
    if !ext.is_empty() {
        out.push('.').map_err(overflow)?;
        out.push_str(&ext).map_err(overflow)?;
    }
    Ok(out)
}
