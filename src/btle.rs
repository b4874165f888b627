//! Bluetooth backend over btleplug
//!
//! btleplug is asynchronous, so every blocking call of the GATT contract drives
//! its future on a tokio runtime through [`Handle::block_on`], bounded by
//! [`tokio::time::timeout`]. The runtime must be multi-threaded and the calls
//! must not be made from inside it: notifications are pumped by runtime tasks
//! while the caller is blocked.

use crate::{
    gatt::{self, DEFAULT_TIMEOUT},
    log,
    utils::lock,
    Address, Error, Listener, ListenerId, Listeners, Result,
};
use btleplug::{
    api::{
        Central, CentralEvent, CharPropFlags, Characteristic as Char, Manager as _,
        Peripheral as _, ScanFilter, WriteType,
    },
    platform::{Adapter, Manager, Peripheral},
};
use core::{future::Future, pin::Pin, time::Duration};
use futures::stream::{Stream, StreamExt};
use pretty_hex::PrettyHex;
use std::sync::{Arc, Mutex};
use tokio::{runtime::Handle, task::JoinHandle, time::timeout};
use uuid::Uuid;

const UNNAMED: &str = "(unnamed)";

type Events = Pin<Box<dyn Stream<Item = CentralEvent> + Send>>;

/// Run future on runtime, giving up after `limit`
fn wait<T>(runtime: &Handle, limit: Duration, future: impl Future<Output = Result<T>>) -> Result<T> {
    runtime.block_on(async { timeout(limit, future).await? })
}

async fn local_name(peripheral: &Peripheral) -> Result<String> {
    Ok(peripheral
        .properties()
        .await?
        .and_then(|props| props.local_name)
        .unwrap_or_else(|| UNNAMED.into()))
}

/// Backend using first Bluetooth adapter of the system
pub struct BtleBackend {
    runtime: Handle,
    _manager: Option<Manager>,
    adapter: Option<Adapter>,
}

impl BtleBackend {
    /// Create backend driven by runtime
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            _manager: None,
            adapter: None,
        }
    }

    fn adapter(&self) -> Result<&Adapter> {
        self.adapter
            .as_ref()
            .ok_or_else(|| Error::Connection("Bluetooth backend is not initialized".into()))
    }

    fn device(&self, peripheral: Peripheral, address: Address, name: String) -> BtleDevice {
        BtleDevice {
            runtime: self.runtime.clone(),
            peripheral,
            address,
            name,
            connection: None,
        }
    }

    async fn events(&self, adapter: &Adapter) -> Result<Events> {
        // subscribe before scanning to not miss early advertisements
        let events = adapter.events().await?;

        log::info!("Start scan peripherals");
        adapter.start_scan(ScanFilter::default()).await?;

        Ok(events)
    }

    async fn stop_scan(&self, adapter: &Adapter) {
        log::info!("Stop scan peripherals");
        if let Err(error) = adapter.stop_scan().await {
            log::error!("Error while stopping scan: {error}");
        }
    }

    async fn scan_all(
        &self,
        adapter: &Adapter,
        events: &mut Events,
        devices: &mut Vec<BtleDevice>,
    ) -> Result<()> {
        while let Some(event) = events.next().await {
            log::trace!("Adapter event: {event:?}");
            if let CentralEvent::DeviceDiscovered(id) | CentralEvent::DeviceUpdated(id) = event {
                let peripheral = adapter.peripheral(&id).await?;
                let address = Address::from(peripheral.address().into_inner());
                if devices.iter().any(|device| device.address == address) {
                    continue;
                }
                let name = local_name(&peripheral).await?;
                log::info!("Found peripheral: {address} '{name}'");
                devices.push(self.device(peripheral, address, name));
            }
        }

        Ok(())
    }

    async fn scan(&self, adapter: &Adapter, events: &mut Events, address: Address) -> Result<BtleDevice> {
        while let Some(event) = events.next().await {
            log::trace!("Adapter event: {event:?}");
            if let CentralEvent::DeviceDiscovered(id) | CentralEvent::DeviceUpdated(id) = event {
                let peripheral = adapter.peripheral(&id).await?;
                if Address::from(peripheral.address().into_inner()) == address {
                    let name = local_name(&peripheral).await?;
                    log::info!("Found peripheral: {address} '{name}'");
                    return Ok(self.device(peripheral, address, name));
                }
            }
        }

        Err(Error::NotFound(address.to_string()))
    }

    async fn scan_for(&self, adapter: &Adapter, duration: Duration) -> Result<Vec<BtleDevice>> {
        let mut events = self.events(adapter).await?;
        let mut devices = Vec::default();

        let scan_result = timeout(duration, self.scan_all(adapter, &mut events, &mut devices))
            .await
            .or_else(|_| Ok(Ok(()))) // scan always runs for the whole duration
            .unwrap_or_else(Err);

        self.stop_scan(adapter).await;

        if let Err(error) = &scan_result {
            log::error!("Error while scanning peripherals: {error}");
        }

        scan_result?;

        Ok(devices)
    }

    async fn search(
        &self,
        adapter: &Adapter,
        address: Address,
        timelimit: Duration,
    ) -> Result<Option<BtleDevice>> {
        let mut events = self.events(adapter).await?;

        let scan_result = timeout(timelimit, self.scan(adapter, &mut events, address))
            .await
            .map_err(Error::from)
            .unwrap_or_else(Err);

        self.stop_scan(adapter).await;

        match scan_result {
            Ok(device) => Ok(Some(device)),
            Err(Error::Timeout | Error::NotFound(_)) => {
                log::info!("Peripheral {address} not found");
                Ok(None)
            }
            Err(error) => {
                log::error!("Error while scanning peripherals: {error}");
                Err(error)
            }
        }
    }
}

impl gatt::Backend for BtleBackend {
    type Device = BtleDevice;

    fn initialize(&mut self) -> Result<()> {
        let (manager, adapter) = self.runtime.block_on(async {
            let manager = Manager::new().await?;
            let adapter = manager.adapters().await?.into_iter().next().ok_or_else(|| {
                log::error!("No Bluetooth adapters found");
                Error::NotFound("Bluetooth adapter".into())
            })?;
            log::debug!("Use adapter: {adapter:?}");
            Ok::<_, Error>((manager, adapter))
        })?;

        self._manager = Some(manager);
        self.adapter = Some(adapter);

        Ok(())
    }

    fn scan_devices(&self, duration: Duration) -> Result<Vec<BtleDevice>> {
        let adapter = self.adapter()?;

        self.runtime.block_on(self.scan_for(adapter, duration))
    }

    fn find_device(&self, address: Address, timelimit: Duration) -> Result<Option<BtleDevice>> {
        let adapter = self.adapter()?;

        self.runtime.block_on(self.search(adapter, address, timelimit))
    }
}

/// Discovered device
pub struct BtleDevice {
    runtime: Handle,
    peripheral: Peripheral,
    address: Address,
    name: String,
    connection: Option<BtleConnection>,
}

impl BtleDevice {
    fn connect(&self, limit: Duration) -> Result<BtleConnection> {
        let peripheral = &self.peripheral;

        log::debug!("Connect periphery: {peripheral:?}");

        let result = wait(&self.runtime, limit, async {
            if !peripheral.is_connected().await? {
                peripheral.connect().await?;
            }
            peripheral.discover_services().await?;
            Ok(())
        });

        if let Err(error) = result {
            log::error!("Error while connecting to device: {error}");
            if error.is_timeout() {
                // do not leave half-open link behind
                let _ = wait(&self.runtime, DEFAULT_TIMEOUT, async {
                    Ok(peripheral.disconnect().await?)
                });
            }
            return Err(error);
        }

        let services = peripheral
            .services()
            .into_iter()
            .map(|service| BtleService {
                runtime: self.runtime.clone(),
                peripheral: peripheral.clone(),
                uuid: service.uuid,
                timeout: limit,
                characteristics: Vec::default(),
            })
            .collect();

        Ok(BtleConnection {
            runtime: self.runtime.clone(),
            peripheral: peripheral.clone(),
            timeout: limit,
            services,
        })
    }
}

impl gatt::Device for BtleDevice {
    type Connection = BtleConnection;

    fn address(&self) -> Address {
        self.address
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn connection(&mut self) -> Option<&mut BtleConnection> {
        self.connection
            .as_mut()
            .filter(|connection| gatt::Connection::is_open(&**connection))
    }

    fn open_connection(&mut self, timeout: Duration) -> Result<&mut BtleConnection> {
        let connection = match self.connection.take() {
            Some(connection) if gatt::Connection::is_open(&connection) => {
                log::debug!("Periphery already connected: {:?}", self.peripheral);
                connection
            }
            _ => self.connect(timeout)?,
        };

        Ok(self.connection.insert(connection))
    }
}

/// Connection to device
pub struct BtleConnection {
    runtime: Handle,
    peripheral: Peripheral,
    timeout: Duration,
    services: Vec<BtleService>,
}

impl gatt::Connection for BtleConnection {
    type Service = BtleService;

    fn is_open(&self) -> bool {
        wait(&self.runtime, DEFAULT_TIMEOUT, async {
            Ok(self.peripheral.is_connected().await?)
        })
        .unwrap_or_else(|error| {
            log::warn!("Unable to get connection state: {error}");
            false
        })
    }

    fn close(&mut self) -> Result<()> {
        self.services.clear();

        if self.is_open() {
            log::debug!("Disconnect periphery: {:?}", self.peripheral);
            wait(&self.runtime, self.timeout, async {
                Ok(self.peripheral.disconnect().await?)
            })?;
        }

        Ok(())
    }

    fn services(&self) -> &[BtleService] {
        &self.services
    }

    fn services_mut(&mut self) -> &mut [BtleService] {
        &mut self.services
    }
}

/// GATT service
pub struct BtleService {
    runtime: Handle,
    peripheral: Peripheral,
    uuid: Uuid,
    timeout: Duration,
    characteristics: Vec<BtleCharacteristic>,
}

impl gatt::Service for BtleService {
    type Characteristic = BtleCharacteristic;

    fn uuid(&self) -> Uuid {
        self.uuid
    }

    fn fetch_characteristics(&mut self) -> Result<()> {
        let peripheral = &self.peripheral;

        wait(&self.runtime, self.timeout, async {
            Ok(peripheral.discover_services().await?)
        })?;

        let service = peripheral
            .services()
            .into_iter()
            .find(|service| service.uuid == self.uuid)
            .ok_or_else(|| Error::Connection(format!("Service {} disappeared", self.uuid)))?;

        log::trace!("Characteristics: {:?}", service.characteristics);

        self.characteristics = service
            .characteristics
            .into_iter()
            .map(|characteristic| {
                BtleCharacteristic::new(
                    self.runtime.clone(),
                    peripheral.clone(),
                    characteristic,
                    self.timeout,
                )
            })
            .collect();

        Ok(())
    }

    fn cached_characteristics(&self) -> &[BtleCharacteristic] {
        &self.characteristics
    }
}

struct CharacteristicInner {
    runtime: Handle,
    peripheral: Peripheral,
    characteristic: Char,
    timeout: Duration,
    listeners: Arc<Mutex<Listeners>>,
    pump: Mutex<Option<JoinHandle<()>>>,
}

/// GATT characteristic
#[derive(Clone)]
pub struct BtleCharacteristic {
    inner: Arc<CharacteristicInner>,
}

impl BtleCharacteristic {
    fn new(runtime: Handle, peripheral: Peripheral, characteristic: Char, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(CharacteristicInner {
                runtime,
                peripheral,
                characteristic,
                timeout,
                listeners: Arc::default(),
                pump: Mutex::default(),
            }),
        }
    }

    fn wait<T>(&self, future: impl Future<Output = Result<T>>) -> Result<T> {
        wait(&self.inner.runtime, self.inner.timeout, future)
    }

    fn enable_notifications(&self) -> Result<JoinHandle<()>> {
        let CharacteristicInner {
            peripheral,
            characteristic,
            ..
        } = &*self.inner;

        log::debug!("Enable notifications: {}", characteristic.uuid);

        let mut notifications = self.wait(async { Ok(peripheral.notifications().await?) })?;
        self.wait(async { Ok(peripheral.subscribe(characteristic).await?) })?;

        let uuid = characteristic.uuid;
        let listeners = self.inner.listeners.clone();

        Ok(self.inner.runtime.spawn(async move {
            while let Some(data) = notifications.next().await {
                if data.uuid != uuid {
                    continue;
                }
                log::trace!("Received notification");
                log::trace!("{:?}", data.value.hex_dump());
                lock(&listeners).notify(&data.value);
            }
            log::debug!("Notification stream ended: {uuid}");
        }))
    }

    fn disable_notifications(&self) -> Result<()> {
        let CharacteristicInner {
            peripheral,
            characteristic,
            ..
        } = &*self.inner;

        log::debug!("Disable notifications: {}", characteristic.uuid);

        self.wait(async { Ok(peripheral.unsubscribe(characteristic).await?) })
    }
}

impl gatt::Characteristic for BtleCharacteristic {
    fn uuid(&self) -> Uuid {
        self.inner.characteristic.uuid
    }

    fn read(&self) -> Result<Vec<u8>> {
        let CharacteristicInner {
            peripheral,
            characteristic,
            ..
        } = &*self.inner;

        self.wait(async { Ok(peripheral.read(characteristic).await?) })
    }

    fn write(&self, data: &[u8]) -> Result<()> {
        let CharacteristicInner {
            peripheral,
            characteristic,
            ..
        } = &*self.inner;

        let write_type = if characteristic.properties.contains(CharPropFlags::WRITE) {
            WriteType::WithResponse
        } else {
            WriteType::WithoutResponse
        };

        log::trace!("Write characteristic {}", characteristic.uuid);
        log::trace!("{:?}", data.hex_dump());

        self.wait(async { Ok(peripheral.write(characteristic, data, write_type).await?) })
    }

    fn subscribe(&self, listener: Listener) -> Result<ListenerId> {
        let mut pump = lock(&self.inner.pump);

        if pump.is_none() {
            *pump = Some(self.enable_notifications()?);
        }

        Ok(lock(&self.inner.listeners).insert(listener))
    }

    fn unsubscribe(&self, id: ListenerId) -> Result<()> {
        let mut pump = lock(&self.inner.pump);

        let last = {
            let mut listeners = lock(&self.inner.listeners);
            listeners.remove(id) && listeners.is_empty()
        };

        if last {
            if let Some(pump) = pump.take() {
                pump.abort();
                self.disable_notifications()?;
            }
        }

        Ok(())
    }

    fn unsubscribe_all(&self) -> Result<()> {
        let mut pump = lock(&self.inner.pump);

        lock(&self.inner.listeners).clear();

        match pump.take() {
            Some(pump) => {
                pump.abort();
                self.disable_notifications()
            }
            None => {
                if let Err(error) = self.disable_notifications() {
                    log::debug!("Notifications were not enabled: {error}");
                }
                Ok(())
            }
        }
    }
}
