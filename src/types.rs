use crate::{Error, MacAddr, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Bluetooth device address
///
/// Holds the 48-bit address in the low bits of an integer, so `AA:BB:CC:DD:EE:FF`
/// is `0xAABBCCDDEEFF`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(u64);

impl Address {
    const MASK: u64 = (1 << 48) - 1;

    /// Create address from integer (bits above 48 are dropped)
    pub const fn new(value: u64) -> Self {
        Self(value & Self::MASK)
    }

    /// Get address as integer
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Get address bytes, most significant first
    pub fn octets(&self) -> [u8; 6] {
        let raw = self.0.to_be_bytes();
        let mut octets = [0; 6];
        octets.copy_from_slice(&raw[2..]);
        octets
    }
}

impl From<u64> for Address {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl From<Address> for u64 {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl From<[u8; 6]> for Address {
    fn from(octets: [u8; 6]) -> Self {
        Self(
            octets
                .iter()
                .fold(0, |value, octet| (value << 8) | *octet as u64),
        )
    }
}

impl From<MacAddr> for Address {
    fn from(mac: MacAddr) -> Self {
        mac.into_array().into()
    }
}

impl From<Address> for MacAddr {
    fn from(address: Address) -> Self {
        address.octets().into()
    }
}

impl core::str::FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(s.trim().parse::<MacAddr>()?.into())
    }
}

impl core::fmt::Display for Address {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let [a, b, c, d, e, g] = self.octets();
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

/// Device found while scanning
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceSummary {
    /// Position in scan results (starting from 1)
    pub index: usize,
    /// Advertised name
    pub name: String,
    /// Device address
    pub address: String,
}

/// Scan results
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceList {
    pub devices: Vec<DeviceSummary>,
}

/// Queried device information
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceReport {
    /// Device address
    pub address: String,
    /// Advertised name
    pub name: String,
    /// Primary services
    pub services: Vec<ServiceReport>,
}

/// Queried service information
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ServiceReport {
    /// Short service identifier
    pub id: String,
    /// Registered service name
    pub name: Option<String>,
    /// Characteristics of service
    pub characteristics: Vec<CharacteristicReport>,
}

/// Queried characteristic information
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CharacteristicReport {
    /// Short characteristic identifier
    pub id: String,
    /// Registered characteristic name
    pub name: Option<String>,
    /// Decoded value (device name only)
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub value: Option<String>,
}
