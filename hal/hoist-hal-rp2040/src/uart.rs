//! UART for the control box link
//!
//! The link runs on the buffered driver: the interrupt handler fills the
//! receive ring and the desk task drains it without waiting.

use embassy_rp::uart::{self, BufferedUartRx, BufferedUartTx};
use embedded_io::{Read, ReadReady, Write};
use hoist_hal::uart::{DataBits, Parity, StopBits, UartConfig};
use hoist_hal::{UartRx, UartTx};

/// Translate link settings into the embassy-rp driver config
pub fn to_rp_config(config: &UartConfig) -> uart::Config {
    let mut rp = uart::Config::default();
    rp.baudrate = config.baudrate;
    rp.data_bits = match config.data_bits {
        DataBits::Seven => uart::DataBits::DataBits7,
        DataBits::Eight => uart::DataBits::DataBits8,
    };
    rp.parity = match config.parity {
        Parity::None => uart::Parity::ParityNone,
        Parity::Even => uart::Parity::ParityEven,
        Parity::Odd => uart::Parity::ParityOdd,
    };
    rp.stop_bits = match config.stop_bits {
        StopBits::One => uart::StopBits::STOP1,
        StopBits::Two => uart::StopBits::STOP2,
    };
    rp
}

/// Error from UART operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartBusError {
    /// Receive FIFO overrun
    Overrun,
    /// Line held low for longer than a character
    Break,
    /// Parity error
    Parity,
    /// Framing error
    Framing,
    /// Other error
    Other,
}

impl From<uart::Error> for UartBusError {
    fn from(e: uart::Error) -> Self {
        match e {
            uart::Error::Overrun => UartBusError::Overrun,
            uart::Error::Break => UartBusError::Break,
            uart::Error::Parity => UartBusError::Parity,
            uart::Error::Framing => UartBusError::Framing,
            _ => UartBusError::Other,
        }
    }
}

/// Transmit half of a buffered UART
pub struct RpUartTx {
    tx: BufferedUartTx,
}

impl RpUartTx {
    pub fn new(tx: BufferedUartTx) -> Self {
        Self { tx }
    }
}

impl UartTx for RpUartTx {
    type Error = UartBusError;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), UartBusError> {
        self.tx.write_all(data).map_err(UartBusError::from)
    }

    fn flush(&mut self) -> Result<(), UartBusError> {
        Write::flush(&mut self.tx).map_err(UartBusError::from)
    }
}

/// Receive half of a buffered UART
pub struct RpUartRx {
    rx: BufferedUartRx,
}

impl RpUartRx {
    pub fn new(rx: BufferedUartRx) -> Self {
        Self { rx }
    }
}

impl UartRx for RpUartRx {
    type Error = UartBusError;

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, UartBusError> {
        if buf.is_empty() || !self.rx.read_ready().map_err(UartBusError::from)? {
            return Ok(0);
        }
        self.rx.read(buf).map_err(UartBusError::from)
    }
}

