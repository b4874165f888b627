//! Operator flows over any backend

use crate::{
    gatt::{Backend, Characteristic, Connection, Device, Service},
    log, utils, uuids, Address, Bridge, CharacteristicReport, DeviceList, DeviceReport,
    DeviceSummary, Error, Port, RegisteredCharacteristic, RegisteredService, Result, SerialPort,
    ServiceReport,
};
use core::time::Duration;
use tokio::sync::watch;
use uuid::Uuid;

/// Bridge session options
#[derive(Clone, Debug)]
pub struct Options {
    /// Time limit to find device
    pub scan_timeout: Duration,
    /// Serial poll interval
    pub refresh: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            scan_timeout: Duration::from_secs(5),
            refresh: crate::serial::DEFAULT_REFRESH,
        }
    }
}

/// Scan for devices
pub fn list_devices<B: Backend>(backend: &B, timeout: Duration) -> Result<DeviceList> {
    log::info!("Starting scan with timeout of {}s", timeout.as_secs_f32());

    let devices = backend.scan_devices(timeout)?;

    log::info!("Found {} devices", devices.len());

    let devices = devices
        .iter()
        .enumerate()
        .map(|(index, device)| DeviceSummary {
            index: index + 1,
            name: device.name().into(),
            address: device.address().to_string(),
        })
        .collect();

    Ok(DeviceList { devices })
}

fn find_device<B: Backend>(backend: &B, address: Address, timelimit: Duration) -> Result<B::Device> {
    log::info!("Searching for device {address}");

    backend.find_device(address, timelimit)?.ok_or_else(|| {
        log::error!("Device with address {address} couldn't be found");
        Error::NotFound(format!("Device {address}"))
    })
}

fn registered_name(uuid: &Uuid, name: Option<&'static str>) -> Option<String> {
    name.filter(|_| uuids::is_short(uuid)).map(Into::into)
}

fn read_device_name(characteristic: &impl Characteristic) -> Option<String> {
    match characteristic.read() {
        Ok(value) => Some(utils::ascii_to_string_safe("device name", value)),
        Err(error) => {
            log::warn!("Unable to read device name: {error}");
            None
        }
    }
}

fn describe_service<B: Backend, S: Service>(backend: &B, service: &S) -> ServiceReport {
    let uuid = service.uuid();
    let is_generic_access = uuid == uuids::service::GENERIC_ACCESS;

    let characteristics = service
        .cached_characteristics()
        .iter()
        .map(|characteristic| {
            let id = characteristic.uuid();
            let value = if is_generic_access && id == uuids::characteristic::DEVICE_NAME {
                read_device_name(characteristic)
            } else {
                None
            };

            CharacteristicReport {
                id: backend.uuid_to_short_string(&id),
                name: registered_name(&id, characteristic.registered().name()),
                value,
            }
        })
        .collect();

    ServiceReport {
        id: backend.uuid_to_short_string(&uuid),
        name: registered_name(&uuid, service.registered().name()),
        characteristics,
    }
}

fn describe_services<B: Backend, C: Connection>(
    backend: &B,
    connection: &mut C,
) -> Result<Vec<ServiceReport>> {
    log::info!("{} services found", connection.services().len());

    connection
        .services_mut()
        .iter_mut()
        .map(|service| -> Result<ServiceReport> {
            log::debug!("Fetch characteristics of {}", service.registered());
            service.fetch_characteristics()?;
            Ok(describe_service(backend, service))
        })
        .collect()
}

/// Connect to device and describe its services
///
/// The Device Name of the Generic Access service is read on the way, failing
/// to read it only drops the value from the report.
pub fn query_device<B: Backend>(
    backend: &B,
    address: Address,
    timelimit: Duration,
) -> Result<DeviceReport> {
    let mut device = find_device(backend, address, timelimit)?;

    log::info!("Device found, connecting");
    let connection = device.open_connection_default()?;
    log::info!("Connected");

    let services = describe_services(backend, connection);

    log::info!("Disconnecting");
    let closed = connection.close();

    let services = services?;
    closed?;

    Ok(DeviceReport {
        address: device.address().to_string(),
        name: device.name().into(),
        services,
    })
}

fn locate<C: Connection>(
    connection: &mut C,
    service_id: RegisteredService,
    characteristic_id: RegisteredCharacteristic,
) -> Result<<C::Service as Service>::Characteristic> {
    log::info!("Searching for service 0x{:04X}", service_id.id());
    let service = connection
        .service_mut(&service_id.uuid())
        .ok_or_else(|| Error::NotFound(format!("Service {service_id}")))?;

    log::info!("Querying characteristics");
    service.fetch_characteristics()?;

    log::info!("Searching for characteristic 0x{:04X}", characteristic_id.id());
    service
        .characteristic(&characteristic_id.uuid())
        .cloned()
        .ok_or_else(|| Error::NotFound(format!("Characteristic {characteristic_id}")))
}

/// Bridge characteristic of device with serial port until stop is requested
///
/// The port is opened only after the characteristic was found.
pub fn connect_device<B: Backend, P: Port>(
    backend: &B,
    address: Address,
    service_id: RegisteredService,
    characteristic_id: RegisteredCharacteristic,
    options: &Options,
    open_port: impl FnOnce() -> Result<P>,
    stop: watch::Receiver<bool>,
) -> Result<()> {
    let mut device = find_device(backend, address, options.scan_timeout)?;

    log::info!("Device found, connecting");
    let connection = device.open_connection_default()?;
    log::info!("Connected");

    let found = locate(connection, service_id, characteristic_id).and_then(|characteristic| {
        log::info!("Opening serial port");
        Ok((characteristic, open_port()?))
    });

    let (characteristic, port) = match found {
        Ok(found) => found,
        Err(error) => {
            log::error!("Unable to start bridge: {error}");
            if let Err(error) = connection.close() {
                log::error!("Error while closing connection: {error}");
            }
            return Err(error);
        }
    };

    let serial = SerialPort::new(port);
    serial.set_refresh_rate(options.refresh);

    Bridge::new(characteristic, serial).run(connection, stop)?;

    log::info!("Good bye");

    Ok(())
}
