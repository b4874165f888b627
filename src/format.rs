use crate::{DeviceList, DeviceReport, Result};
use core::fmt::Debug;
use std::io::Write;

#[cfg(feature = "serde")]
use serde::Serialize;

const UNKNOWN: &str = "unknown";

#[derive(Clone, Copy, Debug, Default)]
pub enum Format {
    #[default]
    Text,
    Rust,
    RustPretty,
    #[cfg(feature = "json")]
    Json,
    #[cfg(feature = "json")]
    JsonPretty,
    #[cfg(feature = "yaml")]
    Yaml,
    #[cfg(feature = "toml")]
    Toml,
    #[cfg(feature = "toml")]
    TomlPretty,
}

impl core::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        Ok(match s {
            "x" | "text" => Self::Text,
            "r" | "rust" => Self::Rust,
            "R" | "rust-pretty" => Self::RustPretty,
            #[cfg(feature = "json")]
            "j" | "json" => Self::Json,
            #[cfg(feature = "json")]
            "J" | "json-pretty" => Self::JsonPretty,
            #[cfg(feature = "yaml")]
            "y" | "yaml" => Self::Yaml,
            #[cfg(feature = "toml")]
            "t" | "toml" => Self::Toml,
            #[cfg(feature = "toml")]
            "T" | "toml-pretty" => Self::TomlPretty,
            _ => return Err(format!("Unknown data format: {s}")),
        })
    }
}

/// Human-readable output
pub trait Text {
    fn write_text(&self, output: &mut dyn Write) -> Result<()>;
}

impl Text for DeviceList {
    fn write_text(&self, output: &mut dyn Write) -> Result<()> {
        writeln!(output, "Found {} devices", self.devices.len())?;
        for device in &self.devices {
            writeln!(
                output,
                "\t{}. {} [Addr: {}]",
                device.index, device.name, device.address
            )?;
        }
        Ok(())
    }
}

impl Text for DeviceReport {
    fn write_text(&self, output: &mut dyn Write) -> Result<()> {
        writeln!(output, "Device information.")?;
        writeln!(output, "\tDevice address: {}", self.address)?;
        writeln!(output, "\tDevice name: {}", self.name)?;
        writeln!(output, "\t{} services found:", self.services.len())?;

        for service in &self.services {
            writeln!(
                output,
                "\t\t{} (Service type: {}) with {} characteristics",
                service.id,
                service.name.as_deref().unwrap_or(UNKNOWN),
                service.characteristics.len()
            )?;

            for characteristic in &service.characteristics {
                writeln!(
                    output,
                    "\t\t\t{} (Characteristic type: {})",
                    characteristic.id,
                    characteristic.name.as_deref().unwrap_or(UNKNOWN)
                )?;
                if let Some(value) = &characteristic.value {
                    writeln!(output, "\t\t\t\tValue: {value}")?;
                }
            }
        }

        Ok(())
    }
}

impl Format {
    #[cfg(not(feature = "serde"))]
    pub fn format_value<T: Debug + Text + ?Sized>(
        &self,
        value: &T,
        output: &mut dyn Write,
    ) -> Result<()> {
        match self {
            Self::Text => value.write_text(output)?,
            Self::Rust => writeln!(output, "{value:?}")?,
            Self::RustPretty => writeln!(output, "{value:#?}")?,
        }
        Ok(())
    }

    #[cfg(feature = "serde")]
    pub fn format_value<T: Debug + Text + Serialize + ?Sized>(
        &self,
        value: &T,
        output: &mut dyn Write,
    ) -> Result<()> {
        match self {
            Self::Text => value.write_text(output)?,
            Self::Rust => writeln!(output, "{value:?}")?,
            Self::RustPretty => writeln!(output, "{value:#?}")?,
            #[cfg(feature = "json")]
            Self::Json => serde_json::to_writer(&mut *output, value)?,
            #[cfg(feature = "json")]
            Self::JsonPretty => serde_json::to_writer_pretty(&mut *output, value)?,
            #[cfg(feature = "yaml")]
            Self::Yaml => serde_yaml::to_writer(&mut *output, value)?,
            #[cfg(feature = "toml")]
            Self::Toml => write!(output, "{}", serde_toml::to_string(value)?)?,
            #[cfg(feature = "toml")]
            Self::TomlPretty => write!(output, "{}", serde_toml::to_string_pretty(value)?)?,
        }
        Ok(())
    }
}
