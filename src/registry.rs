use crate::{assigned, uuids};
use uuid::Uuid;

fn lookup(table: &'static [(u32, &'static str)], id: u32) -> Option<&'static str> {
    table
        .binary_search_by_key(&id, |(id, _)| *id)
        .ok()
        .map(|index| table[index].1)
}

macro_rules! registered {
    ($(#[$meta:meta])* $type:ident, $table:path { $($name:ident = $id:literal,)* }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $type(pub u32);

        impl $type {
            $(pub const $name: Self = Self($id);)*

            /// Short identifier
            pub const fn id(&self) -> u32 {
                self.0
            }

            /// Full UUID
            pub const fn uuid(&self) -> Uuid {
                uuids::short_to_full(self.0)
            }

            /// Registered name (none for unregistered identifiers)
            pub fn name(&self) -> Option<&'static str> {
                lookup($table, self.0)
            }
        }

        impl From<u32> for $type {
            fn from(id: u32) -> Self {
                Self(id)
            }
        }

        impl From<&Uuid> for $type {
            fn from(uuid: &Uuid) -> Self {
                Self(uuids::custom_field(uuid))
            }
        }

        impl core::fmt::Display for $type {
            fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
                match self.name() {
                    Some(name) => f.write_str(name),
                    None => write!(f, "0x{:04X}", self.0),
                }
            }
        }
    };
}

registered! {
    /// GATT service identifier
    RegisteredService, assigned::SERVICES {
        GENERIC_ACCESS = 0x1800,
        GENERIC_ATTRIBUTE = 0x1801,
        DEVICE_INFORMATION = 0x180a,
        BATTERY = 0x180f,
        HM10 = 0xffe0,
    }
}

registered! {
    /// GATT characteristic identifier
    RegisteredCharacteristic, assigned::CHARACTERISTICS {
        DEVICE_NAME = 0x2a00,
        APPEARANCE = 0x2a01,
        BATTERY_LEVEL = 0x2a19,
        MANUFACTURER_NAME_STRING = 0x2a29,
        HM10 = 0xffe1,
    }
}
