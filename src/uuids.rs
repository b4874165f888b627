//! Bluetooth UUID helpers
//!
//! Identifiers registered by the Bluetooth SIG share a fixed 96-bit base and
//! only differ in the leading 32 bits.

use crate::{Error, Result};
use uuid::Uuid;

/// Bluetooth base UUID `00000000-0000-1000-8000-00805F9B34FB`
pub const BASE_UUID: Uuid = Uuid::from_u128(0x00000000_0000_1000_8000_00805f9b34fb);

const CUSTOM_SHIFT: u32 = 96;
const BASE_MASK: u128 = (1 << CUSTOM_SHIFT) - 1;

/// Expand a short identifier into a full UUID
pub const fn short_to_full(custom: u32) -> Uuid {
    Uuid::from_u128(((custom as u128) << CUSTOM_SHIFT) | BASE_UUID.as_u128())
}

/// Extract the leading 32 bits of UUID
///
/// Meaningful only when [`is_short`] holds for the UUID.
pub const fn custom_field(uuid: &Uuid) -> u32 {
    (uuid.as_u128() >> CUSTOM_SHIFT) as u32
}

/// Check that UUID is derived from the Bluetooth base UUID
pub const fn is_short(uuid: &Uuid) -> bool {
    uuid.as_u128() & BASE_MASK == BASE_UUID.as_u128()
}

/// Parse UUID in `XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX` form, optionally in braces
pub fn parse(s: &str) -> Result<Uuid> {
    let s = s.trim();
    let inner = match (s.strip_prefix('{'), s.strip_suffix('}')) {
        (Some(_), Some(_)) => &s[1..s.len() - 1],
        (None, None) => s,
        _ => return Err(Error::Format(format!("Unbalanced braces in UUID: {s}"))),
    };

    let groups: Vec<&str> = inner.split('-').collect();
    let valid = groups.len() == 5
        && groups
            .iter()
            .zip([8, 4, 4, 4, 12])
            .all(|(group, len)| {
                group.len() == len && group.chars().all(|c| c.is_ascii_hexdigit())
            });

    if !valid {
        return Err(Error::Format(format!("Bad UUID layout: {s}")));
    }

    Ok(Uuid::try_parse(inner)?)
}

/// Format UUID in upper-case hyphenated form
pub fn format(uuid: &Uuid) -> String {
    format!("{uuid:X}")
}

/// Format the leading 32 bits of UUID as hex
pub fn format_short(uuid: &Uuid) -> String {
    format!("{:08X}", custom_field(uuid))
}

pub mod service {
    use super::*;

    pub const GENERIC_ACCESS: Uuid = short_to_full(0x1800);
    pub const DEVICE_INFORMATION: Uuid = short_to_full(0x180a);
}

pub mod characteristic {
    use super::*;

    pub const DEVICE_NAME: Uuid = short_to_full(0x2a00);
}
