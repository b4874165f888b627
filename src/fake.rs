//! In-memory fakes of every backend role
//!
//! The fake peer is scripted up front: which devices advertise, how the
//! connection handshake behaves and which services and characteristics it
//! exposes. Tests then observe writes and inject notifications and serial data.

use crate::{gatt, log, utils::lock, Address, Error, Listener, ListenerId, Listeners, Result};
use core::time::Duration;
use std::{
    collections::VecDeque,
    io::{Read, Write},
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex, MutexGuard,
    },
    thread,
};
use uuid::Uuid;

/// Connection handshake behavior
#[derive(Clone, Debug, Default)]
pub enum Handshake {
    #[default]
    Immediate,
    /// Completes after delay
    After(Duration),
    /// Never completes
    Never,
    /// Fails with message
    Fail(String),
}

/// Fake backend
#[derive(Clone, Debug, Default)]
pub struct FakeBackend {
    initialized: bool,
    advertisements: Vec<FakeDevice>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add advertisement (devices may advertise more than once)
    pub fn advertise(&mut self, device: FakeDevice) -> &mut Self {
        self.advertisements.push(device);
        self
    }

    pub fn with(mut self, device: FakeDevice) -> Self {
        self.advertise(device);
        self
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn check(&self) -> Result<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(Error::Connection("Backend is not initialized".into()))
        }
    }
}

impl gatt::Backend for FakeBackend {
    type Device = FakeDevice;

    fn initialize(&mut self) -> Result<()> {
        self.initialized = true;
        Ok(())
    }

    fn scan_devices(&self, timeout: Duration) -> Result<Vec<FakeDevice>> {
        self.check()?;
        thread::sleep(timeout);

        let mut devices: Vec<FakeDevice> = Vec::new();
        for device in &self.advertisements {
            if !devices.iter().any(|known| known.address == device.address) {
                devices.push(device.clone());
            }
        }
        Ok(devices)
    }

    fn find_device(&self, address: Address, timelimit: Duration) -> Result<Option<FakeDevice>> {
        self.check()?;
        match self
            .advertisements
            .iter()
            .find(|device| device.address == address)
        {
            Some(device) => Ok(Some(device.clone())),
            None => {
                thread::sleep(timelimit);
                Ok(None)
            }
        }
    }
}

/// Fake device
#[derive(Clone, Debug)]
pub struct FakeDevice {
    address: Address,
    name: String,
    handshake: Handshake,
    services: Vec<FakeService>,
    connection: Option<FakeConnection>,
}

impl FakeDevice {
    pub fn new(address: impl Into<Address>, name: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: name.into(),
            handshake: Handshake::default(),
            services: Vec::new(),
            connection: None,
        }
    }

    pub fn with_handshake(mut self, handshake: Handshake) -> Self {
        self.handshake = handshake;
        self
    }

    /// Add service exposed by peer
    pub fn with_service(mut self, service: FakeService) -> Self {
        self.services.push(service);
        self
    }
}

impl gatt::Device for FakeDevice {
    type Connection = FakeConnection;

    fn address(&self) -> Address {
        self.address
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn connection(&mut self) -> Option<&mut FakeConnection> {
        self.connection
            .as_mut()
            .filter(|connection| gatt::Connection::is_open(&**connection))
    }

    fn open_connection(&mut self, timeout: Duration) -> Result<&mut FakeConnection> {
        let connection = match self.connection.take() {
            Some(connection) if gatt::Connection::is_open(&connection) => connection,
            _ => {
                match &self.handshake {
                    Handshake::Immediate => {}
                    Handshake::After(delay) if *delay <= timeout => thread::sleep(*delay),
                    Handshake::After(_) | Handshake::Never => {
                        thread::sleep(timeout);
                        return Err(Error::Timeout);
                    }
                    Handshake::Fail(message) => return Err(Error::Connection(message.clone())),
                }
                log::debug!("Fake device {} connected", self.address);
                FakeConnection::new(self.services.clone())
            }
        };

        Ok(self.connection.insert(connection))
    }
}

/// Fake connection
#[derive(Clone, Debug)]
pub struct FakeConnection {
    open: Arc<AtomicBool>,
    services: Vec<FakeService>,
}

impl FakeConnection {
    fn new(services: Vec<FakeService>) -> Self {
        Self {
            open: Arc::new(AtomicBool::new(true)),
            services,
        }
    }

    /// Simulate peer disconnect
    pub fn drop_link(&self) {
        self.open.store(false, Ordering::SeqCst);
    }
}

impl gatt::Connection for FakeConnection {
    type Service = FakeService;

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn close(&mut self) -> Result<()> {
        self.services.clear();
        self.open.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn services(&self) -> &[FakeService] {
        &self.services
    }

    fn services_mut(&mut self) -> &mut [FakeService] {
        &mut self.services
    }
}

/// Fake service
#[derive(Clone, Debug)]
pub struct FakeService {
    uuid: Uuid,
    remote: Arc<Mutex<Vec<FakeCharacteristic>>>,
    cached: Vec<FakeCharacteristic>,
    fail_fetch: bool,
}

impl FakeService {
    pub fn new(uuid: Uuid) -> Self {
        Self {
            uuid,
            remote: Arc::default(),
            cached: Vec::new(),
            fail_fetch: false,
        }
    }

    /// Add characteristic exposed by peer
    pub fn with_characteristic(self, characteristic: FakeCharacteristic) -> Self {
        self.expose(characteristic);
        self
    }

    /// Change peer characteristics (visible after next fetch)
    pub fn expose(&self, characteristic: FakeCharacteristic) {
        lock(&self.remote).push(characteristic);
    }

    pub fn with_failing_fetch(mut self) -> Self {
        self.fail_fetch = true;
        self
    }
}

impl gatt::Service for FakeService {
    type Characteristic = FakeCharacteristic;

    fn uuid(&self) -> Uuid {
        self.uuid
    }

    fn fetch_characteristics(&mut self) -> Result<()> {
        if self.fail_fetch {
            return Err(Error::Connection("Failed to fetch characteristics".into()));
        }
        self.cached = lock(&self.remote).clone();
        Ok(())
    }

    fn cached_characteristics(&self) -> &[FakeCharacteristic] {
        &self.cached
    }
}

#[derive(Default)]
struct CharacteristicState {
    value: Vec<u8>,
    writes: Vec<Vec<u8>>,
    fail_reads: bool,
    fail_writes: bool,
}

/// Fake characteristic
#[derive(Clone)]
pub struct FakeCharacteristic {
    uuid: Uuid,
    state: Arc<Mutex<CharacteristicState>>,
    listeners: Arc<Mutex<Listeners>>,
    notifying: Arc<AtomicBool>,
    handshakes: Arc<AtomicUsize>,
}

impl core::fmt::Debug for FakeCharacteristic {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("FakeCharacteristic")
            .field("uuid", &self.uuid)
            .field("notifying", &self.is_notifying())
            .finish()
    }
}

impl FakeCharacteristic {
    pub fn new(uuid: Uuid) -> Self {
        Self {
            uuid,
            state: Arc::default(),
            listeners: Arc::default(),
            notifying: Arc::default(),
            handshakes: Arc::default(),
        }
    }

    pub fn with_value(self, value: impl Into<Vec<u8>>) -> Self {
        self.state().value = value.into();
        self
    }

    pub fn with_failing_reads(self) -> Self {
        self.state().fail_reads = true;
        self
    }

    pub fn set_failing_writes(&self, fail: bool) {
        self.state().fail_writes = fail;
    }

    /// Simulate peer-initiated value change
    pub fn notify(&self, value: &[u8]) {
        self.state().value = value.to_vec();
        if self.is_notifying() {
            self.listeners().notify(value);
        }
    }

    /// Values written so far
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.state().writes.clone()
    }

    /// Whether peer notifications are enabled
    pub fn is_notifying(&self) -> bool {
        self.notifying.load(Ordering::SeqCst)
    }

    /// Number of enable/disable notification handshakes
    pub fn handshakes(&self) -> usize {
        self.handshakes.load(Ordering::SeqCst)
    }

    fn set_notifying(&self, enable: bool) {
        self.handshakes.fetch_add(1, Ordering::SeqCst);
        self.notifying.store(enable, Ordering::SeqCst);
    }

    fn state(&self) -> MutexGuard<'_, CharacteristicState> {
        lock(&self.state)
    }

    fn listeners(&self) -> MutexGuard<'_, Listeners> {
        lock(&self.listeners)
    }
}

impl gatt::Characteristic for FakeCharacteristic {
    fn uuid(&self) -> Uuid {
        self.uuid
    }

    fn read(&self) -> Result<Vec<u8>> {
        let state = self.state();
        if state.fail_reads {
            return Err(Error::Connection("Failed to read value".into()));
        }
        Ok(state.value.clone())
    }

    fn write(&self, data: &[u8]) -> Result<()> {
        let mut state = self.state();
        if state.fail_writes {
            return Err(Error::Connection("Failed to write value".into()));
        }
        state.writes.push(data.to_vec());
        Ok(())
    }

    fn subscribe(&self, listener: Listener) -> Result<ListenerId> {
        let mut listeners = self.listeners();
        if listeners.is_empty() {
            self.set_notifying(true);
        }
        Ok(listeners.insert(listener))
    }

    fn unsubscribe(&self, id: ListenerId) -> Result<()> {
        let mut listeners = self.listeners();
        if listeners.remove(id) && listeners.is_empty() {
            self.set_notifying(false);
        }
        Ok(())
    }

    fn unsubscribe_all(&self) -> Result<()> {
        self.listeners().clear();
        self.set_notifying(false);
        Ok(())
    }
}

#[derive(Default)]
struct PortState {
    incoming: VecDeque<Vec<u8>>,
    outgoing: Vec<u8>,
    unplugged: bool,
}

/// Fake serial port
///
/// Clones share the same buffers, so a test keeps one clone to observe the
/// port handed over to [`crate::SerialPort`].
#[derive(Clone, Default)]
pub struct FakePort {
    state: Arc<Mutex<PortState>>,
}

impl FakePort {
    /// Queue chunk to be returned by next read
    pub fn inject(&self, data: &[u8]) {
        self.state().incoming.push_back(data.to_vec());
    }

    /// Bytes written so far
    pub fn written(&self) -> Vec<u8> {
        self.state().outgoing.clone()
    }

    /// Make every further read fail like a removed device
    pub fn unplug(&self) {
        self.state().unplugged = true;
    }

    fn state(&self) -> MutexGuard<'_, PortState> {
        lock(&self.state)
    }
}

impl Read for FakePort {
    fn read(&mut self, buffer: &mut [u8]) -> std::io::Result<usize> {
        let mut state = self.state();
        if state.unplugged {
            return Err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "Serial device removed",
            ));
        }
        let Some(mut chunk) = state.incoming.pop_front() else {
            return Ok(0);
        };
        let read = chunk.len().min(buffer.len());
        buffer[..read].copy_from_slice(&chunk[..read]);
        if read < chunk.len() {
            state.incoming.push_front(chunk.split_off(read));
        }
        Ok(read)
    }
}

impl Write for FakePort {
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        self.state().outgoing.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        gatt::{Backend, Characteristic, Connection, Device, Service},
        uuids,
    };
    use std::time::Instant;

    const ADDRESS: u64 = 0xAABBCCDDEEFF;

    fn device() -> FakeDevice {
        FakeDevice::new(ADDRESS, "Peer").with_service(
            FakeService::new(uuids::service::GENERIC_ACCESS).with_characteristic(
                FakeCharacteristic::new(uuids::characteristic::DEVICE_NAME).with_value("Peer"),
            ),
        )
    }

    fn backend() -> FakeBackend {
        let mut backend = FakeBackend::new().with(device());
        backend.initialize().unwrap();
        backend
    }

    #[test]
    fn not_initialized() {
        let backend = FakeBackend::new().with(device());

        assert!(matches!(
            backend.find_device(Address::new(ADDRESS), Duration::ZERO),
            Err(Error::Connection(_))
        ));
    }

    #[test]
    fn scan_deduplicates_first_name_wins() {
        let mut backend = FakeBackend::new()
            .with(FakeDevice::new(1u64, "first"))
            .with(FakeDevice::new(2u64, "other"))
            .with(FakeDevice::new(1u64, "second"));
        backend.initialize().unwrap();

        let started = Instant::now();
        let devices = backend.scan_devices(Duration::from_millis(50)).unwrap();

        assert!(started.elapsed() >= Duration::from_millis(50));
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].name(), "first");
        assert_eq!(devices[1].address(), Address::new(2));
    }

    #[test]
    fn find_device_zero_timelimit() {
        let backend = backend();

        let started = Instant::now();
        let found = backend.find_device(Address::new(0x1234), Duration::ZERO).unwrap();

        assert!(found.is_none());
        assert!(started.elapsed() < Duration::from_millis(500));
    }

    #[test]
    fn find_device_returns_early() {
        let backend = backend();

        let started = Instant::now();
        let found = backend
            .find_device(Address::new(ADDRESS), Duration::from_secs(10))
            .unwrap();

        assert_eq!(found.unwrap().name(), "Peer");
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn connection_timeout() {
        let mut device = device().with_handshake(Handshake::Never);

        let started = Instant::now();
        let result = device.open_connection(Duration::from_secs(1));
        let elapsed = started.elapsed();

        assert!(matches!(result, Err(Error::Timeout)));
        assert!(elapsed >= Duration::from_secs(1));
        assert!(elapsed < Duration::from_secs(2));
        assert!(device.connection().is_none());
    }

    #[test]
    fn connection_failure() {
        let mut device = device().with_handshake(Handshake::Fail("refused".into()));

        assert!(matches!(
            device.open_connection_default(),
            Err(Error::Connection(message)) if message == "refused"
        ));
    }

    #[test]
    fn connection_cached_while_open() {
        let mut device = device();

        assert!(device.connection().is_none());

        device.open_connection_default().unwrap().drop_link();
        assert!(device.connection().is_none());

        let connection = device.open_connection_default().unwrap();
        assert!(connection.is_open());
        assert_eq!(connection.services().len(), 1);
        assert!(device.connection().is_some());

        device.connection().unwrap().close().unwrap();
        assert!(device.connection().is_none());
    }

    #[test]
    fn close_releases_services() {
        let mut device = device();
        let connection = device.open_connection_default().unwrap();

        connection.close().unwrap();
        connection.close().unwrap();

        assert!(!connection.is_open());
        assert!(connection.services().is_empty());
    }

    #[test]
    fn service_lookup() {
        let mut device = device();
        let connection = device.open_connection_default().unwrap();

        assert!(connection.service(&uuids::service::GENERIC_ACCESS).is_some());
        assert!(connection
            .service(&uuids::service::DEVICE_INFORMATION)
            .is_none());
    }

    #[test]
    fn characteristic_cache_replaced_on_fetch() {
        let mut device = device();
        let connection = device.open_connection_default().unwrap();
        let service = connection
            .service_mut(&uuids::service::GENERIC_ACCESS)
            .unwrap();

        assert!(service.cached_characteristics().is_empty());
        assert!(service
            .characteristic(&uuids::characteristic::DEVICE_NAME)
            .is_none());

        service.fetch_characteristics().unwrap();
        assert_eq!(service.cached_characteristics().len(), 1);

        let appearance = uuids::short_to_full(0x2a01);
        service.expose(FakeCharacteristic::new(appearance));
        // stale cache is not refreshed implicitly
        assert!(service.characteristic(&appearance).is_none());

        service.fetch_characteristics().unwrap();
        assert_eq!(service.cached_characteristics().len(), 2);
        assert!(service.characteristic(&appearance).is_some());
    }

    #[test]
    fn characteristic_notifications() {
        let characteristic = FakeCharacteristic::new(uuids::short_to_full(0xffe1));
        let received = Arc::new(Mutex::new(Vec::new()));

        let id = {
            let received = received.clone();
            characteristic
                .subscribe(Box::new(move |data: &[u8]| {
                    received.lock().unwrap().push(data.to_vec())
                }))
                .unwrap()
        };
        let other = characteristic.subscribe(Box::new(|_: &[u8]| {})).unwrap();

        assert!(characteristic.is_notifying());
        assert_eq!(characteristic.handshakes(), 1);

        characteristic.notify(b"ping");
        assert_eq!(*received.lock().unwrap(), vec![b"ping".to_vec()]);

        characteristic.unsubscribe(id).unwrap();
        assert!(characteristic.is_notifying());

        characteristic.unsubscribe(other).unwrap();
        assert!(!characteristic.is_notifying());

        characteristic.notify(b"lost");
        assert_eq!(received.lock().unwrap().len(), 1);
    }

    #[test]
    fn fake_port_chunks() {
        let mut port = FakePort::default();
        let mut buffer = [0; 4];

        port.inject(b"abcdef");

        assert_eq!(Read::read(&mut port, &mut buffer).unwrap(), 4);
        assert_eq!(&buffer, b"abcd");
        assert_eq!(Read::read(&mut port, &mut buffer).unwrap(), 2);
        assert_eq!(&buffer[..2], b"ef");
        assert_eq!(Read::read(&mut port, &mut buffer).unwrap(), 0);
    }
}
