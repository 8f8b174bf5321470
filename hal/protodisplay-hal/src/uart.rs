//! UART serial communication abstractions
//!
//! Both input links of the display controller are polled once per render
//! cycle, so the receive trait is non-blocking and exposes how many bytes are
//! currently buffered. The sensor protocol relies on that count for framing.

/// UART receiver
///
/// Non-blocking view of a buffered serial link.
pub trait SerialRx {
    /// Number of bytes currently buffered and ready to read
    fn available(&mut self) -> usize;

    /// Read one buffered byte, or `None` if the buffer is empty
    fn read_byte(&mut self) -> Option<u8>;

    /// Read up to `buf.len()` buffered bytes
    ///
    /// Returns the number of bytes written into `buf`.
    fn read_into(&mut self, buf: &mut [u8]) -> usize {
        let mut n = 0;
        while n < buf.len() {
            match self.read_byte() {
                Some(byte) => {
                    buf[n] = byte;
                    n += 1;
                }
                None => break,
            }
        }
        n
    }

    /// Discard everything currently buffered
    ///
    /// Returns the number of bytes dropped.
    fn discard_all(&mut self) -> usize {
        let mut n = 0;
        while self.read_byte().is_some() {
            n += 1;
        }
        n
    }
}

impl<T: SerialRx + ?Sized> SerialRx for &mut T {
    fn available(&mut self) -> usize {
        (**self).available()
    }

    fn read_byte(&mut self) -> Option<u8> {
        (**self).read_byte()
    }
}

/// UART configuration
#[derive(Debug, Clone, Copy)]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl UartConfig {
    /// 8N1 at the given baud rate
    pub const fn with_baudrate(baudrate: u32) -> Self {
        Self {
            baudrate,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

impl Default for UartConfig {
    fn default() -> Self {
        // Both the Bluetooth module and the tracker host talk 9600 8N1
        Self::with_baudrate(9600)
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataBits {
    Seven,
    Eight,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBits {
    One,
    Two,
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bytes<'a> {
        data: &'a [u8],
        pos: usize,
    }

    impl SerialRx for Bytes<'_> {
        fn available(&mut self) -> usize {
            self.data.len() - self.pos
        }

        fn read_byte(&mut self) -> Option<u8> {
            let byte = self.data.get(self.pos).copied()?;
            self.pos += 1;
            Some(byte)
        }
    }

    #[test]
    fn test_read_into_stops_at_empty_buffer() {
        let mut rx = Bytes { data: b"abc", pos: 0 };
        let mut buf = [0u8; 8];
        assert_eq!(rx.read_into(&mut buf), 3);
        assert_eq!(&buf[..3], b"abc");
        assert_eq!(rx.available(), 0);
    }

    #[test]
    fn test_discard_all_empties_link() {
        let mut rx = Bytes {
            data: &[1, 2, 3, 4, 5, 6, 7, 8, 9],
            pos: 2,
        };
        assert_eq!(rx.discard_all(), 7);
        assert_eq!(rx.available(), 0);
        assert_eq!(rx.read_byte(), None);
    }

    #[test]
    fn test_default_config_is_9600_8n1() {
        let config = UartConfig::default();
        assert_eq!(config.baudrate, 9600);
        assert_eq!(config.data_bits, DataBits::Eight);
        assert_eq!(config.parity, Parity::None);
        assert_eq!(config.stop_bits, StopBits::One);
    }
}
