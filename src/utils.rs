use crate::{log, Error, Result};
use pretty_hex::PrettyHex;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock mutex, ignoring poisoning
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn ascii_to_string(ascii: impl AsRef<[u8]>) -> Result<String> {
    Ok(core::str::from_utf8(ascii.as_ref())?
        .trim_matches(|c| c == '\0')
        .into())
}

/// Like [`ascii_to_string`] but replaces invalid sequences instead of failing
pub fn ascii_to_string_safe(field: &str, ascii: impl AsRef<[u8]>) -> String {
    let ascii = ascii.as_ref();
    ascii_to_string(ascii).unwrap_or_else(|error| {
        log::warn!("Bad string at '{field}': {error:?}");
        log::trace!("{:?}", ascii.hex_dump());
        String::from_utf8_lossy(ascii)
            .trim_matches(|c| c == '\0')
            .into()
    })
}

/// Parse hexadecimal identifier with optional `0x` prefix
pub fn hex_to_id(s: &str) -> Result<u32> {
    let s = s.trim();
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u32::from_str_radix(digits, 16)
        .map_err(|error| Error::InvalidArgument(format!("Bad hex identifier '{s}': {error}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_trims_nuls() {
        assert_eq!(ascii_to_string(b"HMSoft\0\0").unwrap(), "HMSoft");
    }

    #[test]
    fn ascii_safe_keeps_invalid_bytes_visible() {
        assert_eq!(ascii_to_string_safe("name", b"HM\xffSoft\0"), "HM\u{fffd}Soft");
        assert_eq!(ascii_to_string_safe("name", [0xff, 0xfe]), "\u{fffd}\u{fffd}");
    }

    #[test]
    fn hex_ids() {
        assert_eq!(hex_to_id("ffe0").unwrap(), 0xffe0);
        assert_eq!(hex_to_id("0xFFE1").unwrap(), 0xffe1);
        assert!(matches!(hex_to_id("xyz"), Err(Error::InvalidArgument(_))));
        assert!(matches!(hex_to_id(""), Err(Error::InvalidArgument(_))));
    }
}
