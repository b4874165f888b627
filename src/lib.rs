#![doc = include_str!("../README.md")]
mod assigned;
mod bridge;
mod btle;
mod format;
mod listener;
mod registry;
mod result;
mod serial;
mod types;
mod utils;

pub mod commands;
pub mod gatt;
pub mod uuids;

#[cfg(any(test, feature = "fake"))]
pub mod fake;

use tracing as log;

pub use bridge::{Bridge, STOP_POLL};
pub use btle::{BtleBackend, BtleCharacteristic, BtleConnection, BtleDevice, BtleService};
pub use format::{Format, Text};
pub use listener::{Listener, ListenerId, Listeners};
pub use macaddr::MacAddr6 as MacAddr;
pub use registry::{RegisteredCharacteristic, RegisteredService};
pub use result::{Error, Result};
pub use serial::{Parity, Port, SerialConfig, SerialPort, StopBits, DEFAULT_REFRESH};
pub use types::{
    Address, CharacteristicReport, DeviceList, DeviceReport, DeviceSummary, ServiceReport,
};
pub use utils::hex_to_id;
