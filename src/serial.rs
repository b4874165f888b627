//! Serial port with fan-out of received data
//!
//! One dispatch thread per port polls the device and hands every chunk read to
//! all subscribed listeners in registration order. The thread starts with the
//! first subscription and is joined by [`SerialPort::unsubscribe_all`].

use crate::{log, utils::lock, Error, Listener, ListenerId, Listeners, Result};
use core::time::Duration;
use pretty_hex::PrettyHex;
use std::{
    io::{ErrorKind, Read, Write},
    sync::{
        atomic::{AtomicU64, Ordering},
        mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError},
        Arc, Mutex,
    },
    thread::{self, JoinHandle},
};

/// Default poll interval used when nothing was read
pub const DEFAULT_REFRESH: Duration = Duration::from_millis(100);

const READ_CHUNK: usize = 128;

/// Byte-oriented port
pub trait Port: Send + 'static {
    /// Read available bytes (zero when nothing arrived in time)
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize>;

    fn write(&mut self, data: &[u8]) -> Result<usize>;
}

impl<T: Read + Write + Send + 'static> Port for T {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        match Read::read(self, buffer) {
            Ok(read) => Ok(read),
            Err(error) if matches!(error.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                Ok(0)
            }
            Err(error) => Err(error.into()),
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        let written = Write::write(self, data)?;
        self.flush()?;
        Ok(written)
    }
}

/// Stop bits
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StopBits {
    #[default]
    One,
    OneAndHalf,
    Two,
}

impl core::str::FromStr for StopBits {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "1" => Self::One,
            "1.5" => Self::OneAndHalf,
            "2" => Self::Two,
            _ => {
                return Err(Error::InvalidArgument(format!(
                    "Valid stop bits are: 1, 1.5, 2 (got '{s}')"
                )))
            }
        })
    }
}

/// Parity
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Parity {
    #[default]
    None,
    Odd,
    Even,
    Mark,
    Space,
}

impl core::str::FromStr for Parity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "none" => Self::None,
            "odd" => Self::Odd,
            "even" => Self::Even,
            "mark" => Self::Mark,
            "space" => Self::Space,
            _ => {
                return Err(Error::InvalidArgument(format!(
                    "Valid parity values are: none, odd, even, mark, space (got '{s}')"
                )))
            }
        })
    }
}

/// Serial port framing and timing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SerialConfig {
    /// Device path or port name
    pub port: String,
    pub baud: u32,
    pub data_bits: u8,
    pub stop_bits: StopBits,
    pub parity: Parity,
    /// Maximum time a single read may block
    pub read_timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: String::default(),
            baud: 9600,
            data_bits: 8,
            stop_bits: StopBits::One,
            parity: Parity::None,
            read_timeout: Duration::from_millis(10),
        }
    }
}

impl SerialConfig {
    /// Turn port number into platform port name, other strings are kept as is
    pub fn port_name(port: &str) -> String {
        match port.parse::<u32>() {
            Ok(number) if cfg!(windows) => format!("COM{number}"),
            Ok(number) => format!("/dev/ttyS{number}"),
            Err(_) => port.into(),
        }
    }

    /// Open port using system serial driver
    pub fn open(&self) -> Result<Box<dyn serialport::SerialPort>> {
        use serialport::{DataBits, Parity as P, StopBits as S};

        let data_bits = match self.data_bits {
            5 => DataBits::Five,
            6 => DataBits::Six,
            7 => DataBits::Seven,
            8 => DataBits::Eight,
            bits => {
                return Err(Error::InvalidArgument(format!(
                    "Valid data bits are: 5, 6, 7, 8 (got {bits})"
                )))
            }
        };

        let stop_bits = match self.stop_bits {
            StopBits::One => S::One,
            StopBits::Two => S::Two,
            StopBits::OneAndHalf => {
                return Err(Error::Connection(
                    "1.5 stop bits are not supported by serial driver".into(),
                ))
            }
        };

        let parity = match self.parity {
            Parity::None => P::None,
            Parity::Odd => P::Odd,
            Parity::Even => P::Even,
            Parity::Mark | Parity::Space => {
                return Err(Error::Connection(format!(
                    "{:?} parity is not supported by serial driver",
                    self.parity
                )))
            }
        };

        log::debug!("Open serial port: {self:?}");

        Ok(serialport::new(&self.port, self.baud)
            .data_bits(data_bits)
            .stop_bits(stop_bits)
            .parity(parity)
            .timeout(self.read_timeout)
            .open()?)
    }
}

enum Control {
    Wake,
    Shutdown,
}

struct Dispatcher {
    control: Sender<Control>,
    thread: JoinHandle<()>,
}

struct Shared<P> {
    port: Mutex<Option<P>>,
    listeners: Mutex<Listeners>,
    refresh: AtomicU64,
    error: Mutex<Option<Error>>,
}

impl<P: Port> Shared<P> {
    fn refresh(&self) -> Duration {
        Duration::from_nanos(self.refresh.load(Ordering::Relaxed))
    }

    fn read(&self, buffer: &mut [u8]) -> Result<usize> {
        lock(&self.port)
            .as_mut()
            .ok_or_else(|| Error::closed("Serial port"))?
            .read(buffer)
    }

    fn dispatch(&self, control: Receiver<Control>) {
        let mut buffer = [0u8; READ_CHUNK];

        log::debug!("Serial dispatch started");

        loop {
            let message = if lock(&self.listeners).is_empty() {
                control.recv().map_err(|_| TryRecvError::Disconnected)
            } else {
                control.try_recv()
            };

            match message {
                Ok(Control::Shutdown) | Err(TryRecvError::Disconnected) => break,
                Ok(Control::Wake) => continue,
                Err(TryRecvError::Empty) => {}
            }

            let read = match self.read(&mut buffer) {
                Ok(read) => read,
                Err(error) if error.is_timeout() => 0,
                Err(error) => {
                    log::error!("Error while reading serial port: {error}");
                    *lock(&self.error) = Some(error);
                    break;
                }
            };

            if read == 0 {
                match control.recv_timeout(self.refresh()) {
                    Ok(Control::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
                    Ok(Control::Wake) | Err(RecvTimeoutError::Timeout) => continue,
                }
            }

            let data = &buffer[..read];
            log::trace!("Serial received {read} bytes");
            log::trace!("{:?}", data.hex_dump());

            lock(&self.listeners).notify(data);
        }

        log::debug!("Serial dispatch stopped");
    }
}

/// Serial port shared between a reader thread and any number of listeners
pub struct SerialPort<P: Port> {
    shared: Arc<Shared<P>>,
    dispatcher: Mutex<Option<Dispatcher>>,
}

impl<P: Port> SerialPort<P> {
    /// Wrap opened port
    pub fn new(port: P) -> Self {
        let shared = Arc::new(Shared {
            port: Mutex::new(Some(port)),
            listeners: Mutex::default(),
            refresh: AtomicU64::new(DEFAULT_REFRESH.as_nanos() as u64),
            error: Mutex::default(),
        });

        Self {
            shared,
            dispatcher: Mutex::default(),
        }
    }

    /// Write data directly to port
    pub fn write(&self, data: &[u8]) -> Result<usize> {
        lock(&self.shared.port)
            .as_mut()
            .ok_or_else(|| Error::closed("Serial port"))?
            .write(data)
    }

    /// Read data directly from port
    pub fn read(&self, buffer: &mut [u8]) -> Result<usize> {
        self.shared.read(buffer)
    }

    /// Add listener, starting dispatch thread if it is not running
    ///
    /// Listeners are called from the dispatch thread and must not subscribe
    /// or unsubscribe themselves.
    pub fn subscribe(&self, listener: Listener) -> Result<ListenerId> {
        let mut dispatcher = lock(&self.dispatcher);

        if lock(&self.shared.port).is_none() {
            return Err(Error::closed("Serial port"));
        }

        let id = lock(&self.shared.listeners).insert(listener);

        match dispatcher.as_ref() {
            Some(dispatcher) => {
                let _ = dispatcher.control.send(Control::Wake);
            }
            None => {
                let (control, receiver) = mpsc::channel();
                let shared = self.shared.clone();
                let thread = thread::Builder::new()
                    .name("serial-dispatch".into())
                    .spawn(move || shared.dispatch(receiver))
                    .map_err(|error| {
                        lock(&self.shared.listeners).remove(id);
                        Error::from(error)
                    })?;
                *dispatcher = Some(Dispatcher { control, thread });
            }
        }

        log::debug!("Serial listener {id} subscribed");

        Ok(id)
    }

    /// Remove listener
    pub fn unsubscribe(&self, id: ListenerId) {
        if lock(&self.shared.listeners).remove(id) {
            log::debug!("Serial listener {id} unsubscribed");
        }
    }

    /// Stop dispatch thread and remove all listeners
    pub fn unsubscribe_all(&self) {
        let dispatcher = lock(&self.dispatcher).take();

        if let Some(Dispatcher { control, thread }) = dispatcher {
            let _ = control.send(Control::Shutdown);
            if thread.join().is_err() {
                log::error!("Serial dispatch thread panicked");
            }
        }

        lock(&self.shared.listeners).clear();
    }

    /// Whether dispatch thread was started and not yet stopped
    ///
    /// Stays true after the thread ended on a read failure, see [`Self::take_error`].
    pub fn is_dispatching(&self) -> bool {
        lock(&self.dispatcher).is_some()
    }

    /// Take read failure which ended dispatching
    pub fn take_error(&self) -> Option<Error> {
        lock(&self.shared.error).take()
    }

    /// Change poll interval, the running dispatch loop picks it up immediately
    pub fn set_refresh_rate(&self, refresh: Duration) {
        self.shared
            .refresh
            .store(refresh.as_nanos() as u64, Ordering::Relaxed);

        if let Some(dispatcher) = lock(&self.dispatcher).as_ref() {
            let _ = dispatcher.control.send(Control::Wake);
        }
    }

    pub fn refresh_rate(&self) -> Duration {
        self.shared.refresh()
    }

    /// Stop dispatching and release port (idempotent)
    pub fn close(&self) {
        self.unsubscribe_all();
        if lock(&self.shared.port).take().is_some() {
            log::debug!("Serial port closed");
        }
    }

    pub fn is_open(&self) -> bool {
        lock(&self.shared.port).is_some()
    }
}

impl<P: Port> Drop for SerialPort<P> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakePort;
    use std::time::Instant;

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

    fn fast_port(fake: &FakePort) -> SerialPort<FakePort> {
        let port = SerialPort::new(fake.clone());
        port.set_refresh_rate(Duration::from_millis(5));
        port
    }

    #[test]
    fn fan_out_in_order() {
        let fake = FakePort::default();
        let port = fast_port(&fake);
        let log = Arc::new(Mutex::new(Vec::new()));

        for tag in 0..3 {
            let log = log.clone();
            port.subscribe(Box::new(move |data: &[u8]| {
                log.lock().unwrap().push((tag, data.to_vec()))
            }))
            .unwrap();
        }

        fake.inject(b"hello");

        assert!(wait_until(|| log.lock().unwrap().len() >= 3));
        thread::sleep(Duration::from_millis(30));

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                (0, b"hello".to_vec()),
                (1, b"hello".to_vec()),
                (2, b"hello".to_vec())
            ]
        );

        port.close();
    }

    #[test]
    fn chunks_keep_order() {
        let fake = FakePort::default();
        let port = fast_port(&fake);
        let log = Arc::new(Mutex::new(Vec::new()));

        {
            let log = log.clone();
            port.subscribe(Box::new(move |data: &[u8]| log.lock().unwrap().push(data.to_vec())))
                .unwrap();
        }

        fake.inject(b"one");
        fake.inject(b"two");
        fake.inject(b"three");

        assert!(wait_until(|| log.lock().unwrap().len() >= 3));
        assert_eq!(
            *log.lock().unwrap(),
            vec![b"one".to_vec(), b"two".to_vec(), b"three".to_vec()]
        );
    }

    #[test]
    fn unsubscribe_keeps_other_handles() {
        let fake = FakePort::default();
        let port = fast_port(&fake);
        let log = Arc::new(Mutex::new(Vec::new()));

        let ids: Vec<_> = (0..3)
            .map(|tag| {
                let log = log.clone();
                port.subscribe(Box::new(move |_: &[u8]| log.lock().unwrap().push(tag)))
                    .unwrap()
            })
            .collect();

        port.unsubscribe(ids[0]);
        port.unsubscribe(ids[2]);

        fake.inject(b"x");

        assert!(wait_until(|| !log.lock().unwrap().is_empty()));
        thread::sleep(Duration::from_millis(30));
        assert_eq!(*log.lock().unwrap(), vec![1]);
    }

    #[test]
    fn unsubscribe_all_without_subscriptions() {
        let port = SerialPort::new(FakePort::default());

        port.unsubscribe_all();
        port.unsubscribe_all();

        assert!(!port.is_dispatching());
        assert!(port.is_open());
    }

    #[test]
    fn unsubscribe_all_joins_thread() {
        let fake = FakePort::default();
        let port = fast_port(&fake);

        port.subscribe(Box::new(|_: &[u8]| {})).unwrap();
        assert!(port.is_dispatching());

        port.unsubscribe_all();
        assert!(!port.is_dispatching());

        port.unsubscribe_all();
        assert!(!port.is_dispatching());
    }

    #[test]
    fn unsubscribe_all_while_idle() {
        let fake = FakePort::default();
        let port = SerialPort::new(fake.clone());
        let id = port.subscribe(Box::new(|_: &[u8]| {})).unwrap();

        // dispatch thread is now waiting for listeners
        port.unsubscribe(id);
        thread::sleep(Duration::from_millis(20));

        let started = Instant::now();
        port.unsubscribe_all();

        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(!port.is_dispatching());
    }

    #[test]
    fn resubscribe_after_unsubscribe_all() {
        let fake = FakePort::default();
        let port = fast_port(&fake);
        let log = Arc::new(Mutex::new(Vec::new()));

        port.subscribe(Box::new(|_: &[u8]| {})).unwrap();
        port.unsubscribe_all();

        {
            let log = log.clone();
            port.subscribe(Box::new(move |data: &[u8]| log.lock().unwrap().push(data.to_vec())))
                .unwrap();
        }
        fake.inject(b"again");

        assert!(wait_until(|| log.lock().unwrap().len() == 1));
        assert_eq!(log.lock().unwrap()[0], b"again");
    }

    #[test]
    fn refresh_rate() {
        let port = SerialPort::new(FakePort::default());

        assert_eq!(port.refresh_rate(), DEFAULT_REFRESH);

        port.subscribe(Box::new(|_: &[u8]| {})).unwrap();
        port.set_refresh_rate(Duration::from_millis(250));

        assert_eq!(port.refresh_rate(), Duration::from_millis(250));
        assert!(port.is_dispatching());
    }

    #[test]
    fn refresh_rate_applies_to_running_loop() {
        let fake = FakePort::default();
        let port = SerialPort::new(fake.clone());
        let log = Arc::new(Mutex::new(Vec::new()));

        port.set_refresh_rate(Duration::from_secs(30));
        {
            let log = log.clone();
            port.subscribe(Box::new(move |data: &[u8]| log.lock().unwrap().push(data.to_vec())))
                .unwrap();
        }

        // loop is now idle after an empty read
        thread::sleep(Duration::from_millis(50));

        port.set_refresh_rate(Duration::from_millis(5));
        let started = Instant::now();
        fake.inject(b"fast");

        assert!(wait_until(|| log.lock().unwrap().len() == 1));
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(log.lock().unwrap()[0], b"fast");
        assert!(port.is_dispatching());

        fake.inject(b"again");
        assert!(wait_until(|| log.lock().unwrap().len() == 2));
        assert!(port.is_dispatching());
    }

    #[test]
    fn read_failure_stops_dispatch() {
        let fake = FakePort::default();
        let port = fast_port(&fake);
        let calls = Arc::new(AtomicU64::new(0));

        {
            let calls = calls.clone();
            port.subscribe(Box::new(move |_: &[u8]| {
                calls.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();
        }

        fake.unplug();

        assert!(wait_until(|| lock(&port.shared.error).is_some()));
        assert!(matches!(port.take_error(), Some(Error::Io(_))));
        assert!(port.take_error().is_none());

        // no more reads after failure
        fake.inject(b"lost");
        thread::sleep(Duration::from_millis(30));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        port.unsubscribe_all();
        assert!(!port.is_dispatching());
    }

    #[test]
    fn write_and_read() {
        let fake = FakePort::default();
        let port = SerialPort::new(fake.clone());

        assert_eq!(port.write(b"abc").unwrap(), 3);
        assert_eq!(fake.written(), b"abc");

        let mut buffer = [0; 8];
        assert_eq!(port.read(&mut buffer).unwrap(), 0);

        fake.inject(b"xy");
        assert_eq!(port.read(&mut buffer).unwrap(), 2);
        assert_eq!(&buffer[..2], b"xy");
    }

    #[test]
    fn closed_port() {
        let port = SerialPort::new(FakePort::default());

        port.close();
        port.close();

        assert!(!port.is_open());
        assert!(matches!(port.write(b"a"), Err(Error::Connection(_))));
        assert!(matches!(
            port.subscribe(Box::new(|_: &[u8]| {})),
            Err(Error::Connection(_))
        ));
    }

    #[test]
    fn framing_values() {
        assert_eq!("1".parse::<StopBits>().unwrap(), StopBits::One);
        assert_eq!("1.5".parse::<StopBits>().unwrap(), StopBits::OneAndHalf);
        assert_eq!("2".parse::<StopBits>().unwrap(), StopBits::Two);
        assert!(matches!(
            "3".parse::<StopBits>(),
            Err(Error::InvalidArgument(_))
        ));

        assert_eq!("mark".parse::<Parity>().unwrap(), Parity::Mark);
        assert_eq!("space".parse::<Parity>().unwrap(), Parity::Space);
        assert!(matches!(
            "NONE".parse::<Parity>(),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn port_names() {
        if cfg!(windows) {
            assert_eq!(SerialConfig::port_name("3"), "COM3");
        } else {
            assert_eq!(SerialConfig::port_name("3"), "/dev/ttyS3");
        }
        assert_eq!(SerialConfig::port_name("/dev/ttyUSB0"), "/dev/ttyUSB0");
    }

    #[test]
    fn unsupported_framing() {
        let config = SerialConfig {
            port: "unused".into(),
            parity: Parity::Mark,
            ..Default::default()
        };
        assert!(matches!(config.open(), Err(Error::Connection(_))));

        let config = SerialConfig {
            port: "unused".into(),
            data_bits: 9,
            ..Default::default()
        };
        assert!(matches!(config.open(), Err(Error::InvalidArgument(_))));
    }
}
