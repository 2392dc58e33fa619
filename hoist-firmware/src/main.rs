//! Hoist - Standing Desk Controller Firmware
//!
//! Main firmware binary for RP2040 boards wired to a desk control box.
//! UART1 talks to the control box, UART0 to the network bridge, and two
//! GPIOs drive the up/down relays on relay-wired desks.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::{UART0, UART1};
use embassy_rp::uart::{BufferedInterruptHandler, Config as RpUartConfig, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use hoist_core::config::{parse_config, DeskConfig};
use hoist_core::session::DeskSession;
use hoist_drivers::actuator::AnyActuator;
use hoist_drivers::link::SerialLink;
use hoist_hal::UartConfig;
use hoist_hal_rp2040::uart::to_rp_config;
use hoist_hal_rp2040::{RpOutputPin, RpUartRx, RpUartTx};

mod channels;
mod tasks;

/// Embedded configuration (compiled into firmware)
/// Edit desk.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../desk.toml");

/// Bridge link speed
const BRIDGE_BAUDRATE: u32 = 115_200;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    UART1_IRQ => BufferedInterruptHandler<UART1>;
});

// Static cells for UART buffers (must live forever)
static DESK_TX_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static DESK_RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static BRIDGE_TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static BRIDGE_RX_BUF: StaticCell<[u8; 128]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Hoist firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = load_config();

    // Control box link: UART1, TX=GPIO4, RX=GPIO5
    let link_config = to_rp_config(&UartConfig::with_baudrate(config.link.baudrate));
    let uart = Uart::new_blocking(p.UART1, p.PIN_4, p.PIN_5, link_config);
    let uart = uart.into_buffered(
        Irqs,
        DESK_TX_BUF.init([0u8; 64]),
        DESK_RX_BUF.init([0u8; 256]),
    );
    let (tx, rx) = uart.split();
    let link = SerialLink::new(RpUartTx::new(tx), RpUartRx::new(rx));
    info!("Desk link on UART1 at {} baud", config.link.baudrate);

    // Network bridge: UART0, TX=GPIO0, RX=GPIO1
    let mut bridge_config = RpUartConfig::default();
    bridge_config.baudrate = BRIDGE_BAUDRATE;
    let bridge = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, bridge_config);
    let bridge = bridge.into_buffered(
        Irqs,
        BRIDGE_TX_BUF.init([0u8; 256]),
        BRIDGE_RX_BUF.init([0u8; 128]),
    );
    let (bridge_tx, bridge_rx) = bridge.split();

    // Relay lines: up=GPIO15, down=GPIO14. Unused on serial-driven desks.
    // Both start at their released level so neither is ever active at boot.
    let released = if config.actuator.relay_released_high() {
        Level::High
    } else {
        Level::Low
    };
    let up = RpOutputPin::new(Output::new(p.PIN_15, released));
    let down = RpOutputPin::new(Output::new(p.PIN_14, released));
    let actuator = AnyActuator::from_kind(config.actuator, up, down);
    info!("Actuation: {}", config.actuator);

    let session = DeskSession::new(actuator, &config);

    spawner.spawn(tasks::publish_task(bridge_tx)).unwrap();
    spawner.spawn(tasks::bridge_rx_task(bridge_rx)).unwrap();
    spawner.spawn(tasks::desk_task(link, session)).unwrap();

    info!("All tasks spawned");
}

/// Parse the embedded configuration, falling back to defaults
fn load_config() -> DeskConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Configuration loaded");
            config
        }
        Err(e) => {
            warn!("Invalid desk.toml ({}), using defaults", e);
            DeskConfig::default()
        }
    }
}
