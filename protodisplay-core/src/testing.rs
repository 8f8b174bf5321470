//! In-memory test doubles shared by the core tests

use std::collections::{BTreeMap, VecDeque};
use std::string::String;
use std::vec::Vec;

use protodisplay_hal::{FileStorage, SerialRx, StorageError, StreamSource};

use crate::timing::CycleGate;

pub use protodisplay_display::testing::{raw_image, RawDecoder};

/// Serial link backed by a byte queue
#[derive(Default)]
pub struct MemLink {
    pub rx: VecDeque<u8>,
}

impl MemLink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().copied());
    }
}

impl SerialRx for MemLink {
    fn available(&mut self) -> usize {
        self.rx.len()
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }
}

/// File storage backed by a map, with one open stream at a time
#[derive(Default)]
pub struct MemStorage {
    pub files: BTreeMap<String, Vec<u8>>,
    pub open: Option<(String, usize)>,
    pub opens: Vec<String>,
    pub closes: u32,
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, name: &str, data: &[u8]) -> Self {
        self.files.insert(name.into(), data.to_vec());
        self
    }
}

impl FileStorage for MemStorage {
    fn exists(&mut self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    fn read_file(&mut self, name: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        let data = self.files.get(name).ok_or(StorageError::NotFound)?;
        if data.len() > buf.len() {
            return Err(StorageError::BufferTooSmall);
        }
        buf[..data.len()].copy_from_slice(data);
        Ok(data.len())
    }
}

impl StreamSource for MemStorage {
    fn open(&mut self, name: &str) -> Result<u32, StorageError> {
        self.opens.push(name.into());
        let len = self.files.get(name).ok_or(StorageError::NotFound)?.len();
        self.open = Some((name.into(), 0));
        Ok(len as u32)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, StorageError> {
        let (name, pos) = self.open.as_mut().ok_or(StorageError::NotOpen)?;
        let data = self.files.get(name.as_str()).ok_or(StorageError::Io)?;
        let n = buf.len().min(data.len() - *pos);
        buf[..n].copy_from_slice(&data[*pos..*pos + n]);
        *pos += n;
        Ok(n)
    }

    fn seek(&mut self, position: u32) -> Result<(), StorageError> {
        let (_, pos) = self.open.as_mut().ok_or(StorageError::NotOpen)?;
        *pos = position as usize;
        Ok(())
    }

    fn close(&mut self) {
        self.open = None;
        self.closes += 1;
    }
}

/// Gate over a simulated clock
///
/// Waiting jumps the clock straight to the deadline; render time is
/// simulated with [`SimGate::advance`].
#[derive(Default)]
pub struct SimGate {
    pub now: u32,
    pub waits: Vec<(u32, u32)>,
}

impl SimGate {
    pub fn new(now: u32) -> Self {
        Self {
            now,
            waits: Vec::new(),
        }
    }

    /// Let time pass outside a wait
    pub fn advance(&mut self, ms: u32) {
        self.now = self.now.wrapping_add(ms);
    }
}

impl CycleGate for SimGate {
    fn now_ms(&self) -> u32 {
        self.now
    }

    fn wait_until_elapsed(&mut self, since_ms: u32, budget_ms: u32) {
        self.waits.push((since_ms, budget_ms));
        if self.now.wrapping_sub(since_ms) < budget_ms {
            self.now = since_ms.wrapping_add(budget_ms);
        }
    }
}
