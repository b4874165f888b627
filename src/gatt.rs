//! GATT client contract
//!
//! Every call here blocks the calling thread for at most its stated timeout.
//! Change notifications are delivered from a backend-managed thread.

use crate::{
    uuids, Address, Listener, ListenerId, RegisteredCharacteristic, RegisteredService, Result,
};
use core::time::Duration;
use uuid::Uuid;

/// Default timeout for connection handshake
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Bluetooth backend
pub trait Backend {
    type Device: Device;

    /// Prepare backend, must be called once before anything else
    fn initialize(&mut self) -> Result<()>;

    /// Scan for exactly `timeout`, returning every device seen (first-seen name wins)
    fn scan_devices(&self, timeout: Duration) -> Result<Vec<Self::Device>>;

    /// Scan until device with `address` advertises or `timelimit` elapses
    fn find_device(&self, address: Address, timelimit: Duration) -> Result<Option<Self::Device>>;

    fn uuid_from_string(&self, s: &str) -> Result<Uuid> {
        uuids::parse(s)
    }

    fn uuid_to_string(&self, uuid: &Uuid) -> String {
        uuids::format(uuid)
    }

    fn uuid_to_short_string(&self, uuid: &Uuid) -> String {
        uuids::format_short(uuid)
    }
}

/// Discovered device
pub trait Device {
    type Connection: Connection;

    fn address(&self) -> Address;

    fn name(&self) -> &str;

    /// Cached connection, only when it still reports itself open
    fn connection(&mut self) -> Option<&mut Self::Connection>;

    /// Reuse open connection or establish new one within `timeout`
    fn open_connection(&mut self, timeout: Duration) -> Result<&mut Self::Connection>;

    /// Same as [`Device::open_connection`] with [`DEFAULT_TIMEOUT`]
    fn open_connection_default(&mut self) -> Result<&mut Self::Connection> {
        self.open_connection(DEFAULT_TIMEOUT)
    }
}

/// Open connection to device
///
/// State: `Disconnected → Opening → Open → Closing → Disconnected`. Peer drop is
/// observed lazily through [`Connection::is_open`].
pub trait Connection {
    type Service: Service;

    fn is_open(&self) -> bool;

    /// Release all services and disconnect (idempotent)
    fn close(&mut self) -> Result<()>;

    /// Services enumerated when connection was opened
    fn services(&self) -> &[Self::Service];

    fn services_mut(&mut self) -> &mut [Self::Service];

    fn service(&self, uuid: &Uuid) -> Option<&Self::Service> {
        self.services().iter().find(|service| &service.uuid() == uuid)
    }

    fn service_mut(&mut self, uuid: &Uuid) -> Option<&mut Self::Service> {
        self.services_mut()
            .iter_mut()
            .find(|service| &service.uuid() == uuid)
    }
}

/// GATT service
pub trait Service {
    type Characteristic: Characteristic;

    fn uuid(&self) -> Uuid;

    fn registered(&self) -> RegisteredService {
        RegisteredService::from(&self.uuid())
    }

    /// Replace cached characteristics with fresh enumeration from peer
    fn fetch_characteristics(&mut self) -> Result<()>;

    /// Characteristics from last fetch (empty before any fetch)
    fn cached_characteristics(&self) -> &[Self::Characteristic];

    fn characteristic(&self, uuid: &Uuid) -> Option<&Self::Characteristic> {
        self.cached_characteristics()
            .iter()
            .find(|characteristic| &characteristic.uuid() == uuid)
    }
}

/// GATT characteristic
///
/// Implementations are cheap handles: clones refer to the same characteristic
/// and share its listeners.
pub trait Characteristic: Clone + Send + Sync + 'static {
    fn uuid(&self) -> Uuid;

    fn registered(&self) -> RegisteredCharacteristic {
        RegisteredCharacteristic::from(&self.uuid())
    }

    fn read(&self) -> Result<Vec<u8>>;

    fn write(&self, data: &[u8]) -> Result<()>;

    /// Add change listener, enabling peer notifications on first one
    fn subscribe(&self, listener: Listener) -> Result<ListenerId>;

    /// Remove listener, disabling peer notifications after last one
    fn unsubscribe(&self, id: ListenerId) -> Result<()>;

    /// Remove all listeners and disable peer notifications
    fn unsubscribe_all(&self) -> Result<()>;
}
