//! Serial links
//!
//! Adapts an embassy buffered UART receiver to the HAL's [`SerialRx`]. The
//! HAL needs an exact buffered byte count, which the UART ring buffer does
//! not expose, so ready bytes are pulled into a local queue first.

use embassy_rp::uart::{BufferedUartRx, Config, DataBits, Parity, StopBits};
use embedded_io::{Read, ReadReady};
use heapless::Deque;
use protodisplay_hal::{uart, SerialRx, UartConfig};

/// Bytes held locally per link
pub const LINK_QUEUE_LEN: usize = 256;

/// embassy-rp UART config for a HAL link config
pub fn uart_config(config: &UartConfig) -> Config {
    let mut out = Config::default();
    out.baudrate = config.baudrate;
    out.data_bits = match config.data_bits {
        uart::DataBits::Seven => DataBits::DataBits7,
        uart::DataBits::Eight => DataBits::DataBits8,
    };
    out.parity = match config.parity {
        uart::Parity::None => Parity::ParityNone,
        uart::Parity::Even => Parity::ParityEven,
        uart::Parity::Odd => Parity::ParityOdd,
    };
    out.stop_bits = match config.stop_bits {
        uart::StopBits::One => StopBits::STOP1,
        uart::StopBits::Two => StopBits::STOP2,
    };
    out
}

/// Receive side of one UART link
pub struct UartLink {
    rx: BufferedUartRx,
    queue: Deque<u8, LINK_QUEUE_LEN>,
}

impl UartLink {
    pub fn new(rx: BufferedUartRx) -> Self {
        Self {
            rx,
            queue: Deque::new(),
        }
    }

    /// Move everything the UART has received into the local queue
    fn pull(&mut self) {
        let mut chunk = [0u8; 32];
        while !self.queue.is_full() && matches!(self.rx.read_ready(), Ok(true)) {
            let space = (LINK_QUEUE_LEN - self.queue.len()).min(chunk.len());
            let n = match self.rx.read(&mut chunk[..space]) {
                Ok(n) => n,
                Err(_) => break,
            };
            for &byte in &chunk[..n] {
                // Cannot fail, `space` bounds the read
                let _ = self.queue.push_back(byte);
            }
            if n == 0 {
                break;
            }
        }
    }
}

impl SerialRx for UartLink {
    fn available(&mut self) -> usize {
        self.pull();
        self.queue.len()
    }

    fn read_byte(&mut self) -> Option<u8> {
        if self.queue.is_empty() {
            self.pull();
        }
        self.queue.pop_front()
    }
}
