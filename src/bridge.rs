//! Bidirectional relay between characteristic and serial port

use crate::{
    gatt::{Characteristic, Connection},
    log,
    utils::lock,
    Error, Port, Result, SerialPort,
};
use core::time::Duration;
use pretty_hex::PrettyHex;
use std::{
    sync::{Arc, Mutex},
    thread,
};
use tokio::sync::watch;

/// Interval of stop signal checks
pub const STOP_POLL: Duration = Duration::from_millis(100);

type Failure = Arc<Mutex<Option<Error>>>;

/// Keep first relay failure, later ones are only logged
fn fail(failure: &Failure, direction: &str, error: Error) {
    log::error!("Error while relaying {direction}: {error}");
    lock(failure).get_or_insert(error);
}

fn write_all<P: Port>(serial: &SerialPort<P>, mut data: &[u8]) -> Result<()> {
    while !data.is_empty() {
        let written = serial.write(data)?;
        if written == 0 {
            return Err(Error::Connection("Serial port accepts no data".into()));
        }
        data = &data[written..];
    }
    Ok(())
}

/// Whether stop was requested (dropped sender counts as request)
fn stopped(stop: &watch::Receiver<bool>) -> bool {
    *stop.borrow() || stop.has_changed().is_err()
}

/// Bridge session
///
/// Relays every characteristic value change to the serial port and every
/// chunk received from the serial port to the characteristic.
pub struct Bridge<C: Characteristic, P: Port> {
    characteristic: C,
    serial: Arc<SerialPort<P>>,
    failure: Failure,
}

impl<C: Characteristic, P: Port> Bridge<C, P> {
    pub fn new(characteristic: C, serial: SerialPort<P>) -> Self {
        Self {
            characteristic,
            serial: Arc::new(serial),
            failure: Failure::default(),
        }
    }

    fn start(&self) -> Result<()> {
        let serial = self.serial.clone();
        let failure = self.failure.clone();

        log::debug!("Subscribe characteristic {}", self.characteristic.uuid());
        self.characteristic.subscribe(Box::new(move |data: &[u8]| {
            if lock(&failure).is_some() {
                return;
            }
            log::trace!("Characteristic -> serial: {} bytes", data.len());
            log::trace!("{:?}", data.hex_dump());
            if let Err(error) = write_all(&serial, data) {
                fail(&failure, "to serial port", error);
            }
        }))?;

        let characteristic = self.characteristic.clone();
        let failure = self.failure.clone();

        log::debug!("Subscribe serial port");
        self.serial.subscribe(Box::new(move |data: &[u8]| {
            if lock(&failure).is_some() {
                return;
            }
            log::trace!("Serial -> characteristic: {} bytes", data.len());
            log::trace!("{:?}", data.hex_dump());
            if let Err(error) = characteristic.write(data) {
                fail(&failure, "to characteristic", error);
            }
        }))?;

        Ok(())
    }

    fn relay(&self, stop: &watch::Receiver<bool>) -> Result<()> {
        loop {
            if let Some(error) = lock(&self.failure).take() {
                return Err(error);
            }
            if let Some(error) = self.serial.take_error() {
                log::error!("Serial port failed, stop relaying");
                return Err(error);
            }
            if stopped(stop) {
                log::info!("Stop requested");
                return Ok(());
            }
            thread::sleep(STOP_POLL);
        }
    }

    fn teardown(&self, connection: &mut impl Connection) -> Result<()> {
        let mut first = None;

        log::debug!("Close serial port");
        self.serial.close();

        log::debug!("Unsubscribe characteristic");
        if let Err(error) = self.characteristic.unsubscribe_all() {
            log::error!("Error while unsubscribing characteristic: {error}");
            first.get_or_insert(error);
        }

        log::debug!("Close connection");
        if let Err(error) = connection.close() {
            log::error!("Error while closing connection: {error}");
            first.get_or_insert(error);
        }

        first.map_or(Ok(()), Err)
    }

    /// Relay data until stop is requested or relaying fails
    ///
    /// Teardown always runs: serial port first, then characteristic
    /// subscription, then the connection itself.
    pub fn run(self, connection: &mut impl Connection, stop: watch::Receiver<bool>) -> Result<()> {
        let session = self.start().and_then(|_| {
            log::info!("Bridge working");
            self.relay(&stop)
        });

        log::info!("Bridge exiting");

        let teardown = self.teardown(connection);

        session.and(teardown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        fake::{FakeCharacteristic, FakeConnection, FakeDevice, FakePort, FakeService},
        gatt::{self, Device, Service},
        uuids,
    };
    use std::{thread::JoinHandle, time::Instant};
    use uuid::Uuid;

    const SERVICE: Uuid = uuids::short_to_full(0xffe0);
    const CHARACTERISTIC: Uuid = uuids::short_to_full(0xffe1);

    fn wait_until(what: impl Fn() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if what() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        what()
    }

    struct Session {
        characteristic: FakeCharacteristic,
        connection: FakeConnection,
        port: FakePort,
        stop: watch::Sender<bool>,
        thread: JoinHandle<Result<()>>,
    }

    fn start() -> Session {
        let session = start_with(FakePort::default());
        assert!(wait_until(|| session.characteristic.is_notifying()));
        session
    }

    fn start_with(port: FakePort) -> Session {
        let characteristic = FakeCharacteristic::new(CHARACTERISTIC);
        let mut device = FakeDevice::new(0x001122334455u64, "HMSoft").with_service(
            FakeService::new(SERVICE).with_characteristic(characteristic.clone()),
        );

        let connection = device.open_connection_default().unwrap();
        let service = gatt::Connection::service_mut(connection, &SERVICE).unwrap();
        service.fetch_characteristics().unwrap();
        let remote = service.characteristic(&CHARACTERISTIC).unwrap().clone();
        let connection = connection.clone();

        let serial = SerialPort::new(port.clone());
        serial.set_refresh_rate(Duration::from_millis(5));

        let (stop, stopped) = watch::channel(false);
        let bridge = Bridge::new(remote, serial);
        let mut link = connection.clone();
        let thread = thread::spawn(move || bridge.run(&mut link, stopped));

        Session {
            characteristic,
            connection,
            port,
            stop,
            thread,
        }
    }

    #[test]
    fn relay_both_ways_and_stop() {
        let session = start();

        session.characteristic.notify(b"ping");
        assert!(wait_until(|| session.port.written() == b"ping"));

        session.port.inject(b"pong");
        assert!(wait_until(|| session.characteristic.writes() == [b"pong".to_vec()]));

        session.stop.send(true).unwrap();
        session.thread.join().unwrap().unwrap();

        assert!(!session.characteristic.is_notifying());
        assert!(!gatt::Connection::is_open(&session.connection));
    }

    #[test]
    fn dropped_sender_stops() {
        let Session {
            characteristic,
            connection,
            stop,
            thread,
            ..
        } = start();

        drop(stop);
        thread.join().unwrap().unwrap();

        assert!(!characteristic.is_notifying());
        assert!(!gatt::Connection::is_open(&connection));
    }

    #[test]
    fn write_failure_ends_session() {
        let session = start();

        session.characteristic.set_failing_writes(true);
        session.port.inject(b"data");

        let result = session.thread.join().unwrap();
        assert!(matches!(result, Err(Error::Connection(_))));

        assert!(!session.characteristic.is_notifying());
        assert!(!gatt::Connection::is_open(&session.connection));

        // data arriving after teardown goes nowhere
        session.characteristic.notify(b"late");
        assert!(session.port.written().is_empty());
    }

    #[test]
    fn serial_read_failure_ends_session() {
        let port = FakePort::default();
        port.unplug();

        // stop is never requested
        let session = start_with(port);

        let result = session.thread.join().unwrap();
        assert!(matches!(result, Err(Error::Io(_))));

        // subscribed once, then unsubscribed by teardown
        assert_eq!(session.characteristic.handshakes(), 2);
        assert!(!session.characteristic.is_notifying());
        assert!(!gatt::Connection::is_open(&session.connection));
        drop(session.stop);
    }
}
