use argp::FromArgs;
use bleserial::{
    commands::Options, hex_to_id, Address, Format, Parity, RegisteredCharacteristic,
    RegisteredService, SerialConfig, StopBits,
};
use core::time::Duration;

#[cfg(feature = "tracing-subscriber")]
use tracing_subscriber::EnvFilter;

/// Bridge between a Bluetooth LE GATT characteristic and a serial port.
#[derive(FromArgs, Debug)]
pub struct Args {
    /// Show version and exit
    #[argp(switch, short = 'v')]
    pub version: bool,

    /// Logging filter (example: bleserial=debug)
    #[cfg(feature = "tracing-subscriber")]
    #[argp(
        option,
        short = 'l',
        arg_name = "filter",
        from_str_fn(Args::parse_env_filter)
    )]
    pub log: Option<EnvFilter>,

    /// Enable log to journald (log to stderr by default)
    #[cfg(feature = "journal")]
    #[argp(switch, short = 'j')]
    pub journal: bool,

    /// Output format: text(x) (by default) rust(r) rust-pretty(R)
    #[cfg_attr(feature = "json", doc = "json(j) json-pretty(J)")]
    #[cfg_attr(feature = "yaml", doc = "yaml(y)")]
    #[cfg_attr(feature = "toml", doc = "toml(t) toml-pretty(T)")]
    #[argp(
        option,
        short = 'f',
        arg_name = "format",
        default = "Format::Text",
        from_str_fn(core::str::FromStr::from_str)
    )]
    pub format: Format,

    #[argp(subcommand)]
    pub command: Option<Command>,
}

#[derive(FromArgs, Debug)]
#[argp(subcommand)]
pub enum Command {
    List(ListArgs),
    Query(QueryArgs),
    Connect(ConnectArgs),
}

/// Scan for devices and print the results.
#[derive(FromArgs, Debug)]
#[argp(subcommand, name = "ls")]
pub struct ListArgs {
    /// Scan duration in seconds (5 by default)
    #[argp(
        positional,
        arg_name = "timeout",
        default = "Duration::from_secs(5)",
        from_str_fn(parse_seconds)
    )]
    pub timeout: Duration,
}

/// Connect to device and print its services and characteristics.
#[derive(FromArgs, Debug)]
#[argp(subcommand, name = "query")]
pub struct QueryArgs {
    /// Device address (XX:XX:XX:XX:XX:XX)
    #[argp(positional, arg_name = "address", from_str_fn(parse_address))]
    pub address: Address,

    /// Time limit to find device in seconds (5 by default)
    #[argp(
        positional,
        arg_name = "timeout",
        default = "Duration::from_secs(5)",
        from_str_fn(parse_seconds)
    )]
    pub timeout: Duration,
}

/// Bridge characteristic of device with serial port until interrupted.
#[derive(FromArgs, Debug)]
#[argp(subcommand, name = "connect")]
pub struct ConnectArgs {
    /// Device address (XX:XX:XX:XX:XX:XX)
    #[argp(positional, arg_name = "address", from_str_fn(parse_address))]
    pub address: Address,

    /// Service identifier in hex (example: ffe0)
    #[argp(positional, arg_name = "service_id", from_str_fn(parse_service))]
    pub service: RegisteredService,

    /// Characteristic identifier in hex (example: ffe1)
    #[argp(
        positional,
        arg_name = "characteristic_id",
        from_str_fn(parse_characteristic)
    )]
    pub characteristic: RegisteredCharacteristic,

    /// Serial port number or device path
    #[argp(positional, arg_name = "port", from_str_fn(parse_port))]
    pub port: String,

    /// Time limit to find device in seconds (5 by default)
    #[argp(
        positional,
        arg_name = "timeout",
        default = "Duration::from_secs(5)",
        from_str_fn(parse_seconds)
    )]
    pub timeout: Duration,

    /// Baud rate (9600 by default)
    #[argp(positional, arg_name = "baud", default = "9600")]
    pub baud: u32,

    /// Data bits: 5, 6, 7, 8 (8 by default)
    #[argp(
        positional,
        arg_name = "data_bits",
        default = "8",
        from_str_fn(parse_data_bits)
    )]
    pub data_bits: u8,

    /// Stop bits: 1, 1.5, 2 (1 by default, 1.5 fails on open)
    #[argp(
        positional,
        arg_name = "stop_bits",
        default = "StopBits::One",
        from_str_fn(parse_enum)
    )]
    pub stop_bits: StopBits,

    /// Parity: none, odd, even, mark, space (none by default, mark and space fail on open)
    #[argp(
        positional,
        arg_name = "parity",
        default = "Parity::None",
        from_str_fn(parse_enum)
    )]
    pub parity: Parity,

    /// Serial poll interval in milliseconds (100 by default)
    #[argp(
        positional,
        arg_name = "refresh_ms",
        default = "Duration::from_millis(100)",
        from_str_fn(parse_millis)
    )]
    pub refresh: Duration,
}

impl ConnectArgs {
    /// Serial port settings
    pub fn serial_config(&self) -> SerialConfig {
        SerialConfig {
            port: self.port.clone(),
            baud: self.baud,
            data_bits: self.data_bits,
            stop_bits: self.stop_bits,
            parity: self.parity,
            ..SerialConfig::default()
        }
    }

    /// Bridge session options
    pub fn options(&self) -> Options {
        Options {
            scan_timeout: self.timeout,
            refresh: self.refresh,
        }
    }
}

impl Args {
    /// Create args from command-line
    pub fn from_cmdline() -> Self {
        argp::parse_args_or_exit(argp::DEFAULT)
    }

    /// Get log filter
    #[cfg(feature = "tracing-subscriber")]
    pub fn log_filter(&self) -> Option<EnvFilter> {
        self.log
            .as_ref()
            .and_then(|log| log.to_string().parse().ok())
    }

    #[cfg(feature = "tracing-subscriber")]
    fn parse_env_filter(s: &str) -> Result<EnvFilter, String> {
        s.parse()
            .map_err(|error| format!("Bad tracing filter: {error}"))
    }
}

fn parse_seconds(s: &str) -> Result<Duration, String> {
    s.parse::<u32>()
        .map(|seconds| Duration::from_secs(seconds as _))
        .map_err(|error| format!("Bad timeout value: {error}"))
}

fn parse_millis(s: &str) -> Result<Duration, String> {
    s.parse::<u32>()
        .map(|millis| Duration::from_millis(millis as _))
        .map_err(|error| format!("Bad refresh value: {error}"))
}

fn parse_address(s: &str) -> Result<Address, String> {
    s.parse().map_err(|error| format!("Bad device address: {error}"))
}

fn parse_service(s: &str) -> Result<RegisteredService, String> {
    hex_to_id(s)
        .map(RegisteredService::from)
        .map_err(|error| error.to_string())
}

fn parse_characteristic(s: &str) -> Result<RegisteredCharacteristic, String> {
    hex_to_id(s)
        .map(RegisteredCharacteristic::from)
        .map_err(|error| error.to_string())
}

fn parse_port(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        return Err("Empty serial port name".into());
    }
    Ok(SerialConfig::port_name(s.trim()))
}

fn parse_data_bits(s: &str) -> Result<u8, String> {
    match s.parse::<u8>() {
        Ok(bits @ 5..=8) => Ok(bits),
        _ => Err(format!("Valid data bits are: 5, 6, 7, 8 (got '{s}')")),
    }
}

fn parse_enum<T: core::str::FromStr<Err = bleserial::Error>>(s: &str) -> Result<T, String> {
    s.parse().map_err(|error: bleserial::Error| error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, argp::EarlyExit> {
        Args::from_args(&["bleserial"], args)
    }

    fn connect(args: &[&str]) -> ConnectArgs {
        match parse(args).unwrap().command {
            Some(Command::Connect(args)) => args,
            command => panic!("Unexpected command: {command:?}"),
        }
    }

    #[test]
    fn no_command() {
        let args = parse(&[]).unwrap();

        assert!(args.command.is_none());
        assert!(matches!(args.format, Format::Text));
    }

    #[test]
    fn list_defaults() {
        match parse(&["ls"]).unwrap().command {
            Some(Command::List(args)) => assert_eq!(args.timeout, Duration::from_secs(5)),
            command => panic!("Unexpected command: {command:?}"),
        }
        match parse(&["ls", "10"]).unwrap().command {
            Some(Command::List(args)) => assert_eq!(args.timeout, Duration::from_secs(10)),
            command => panic!("Unexpected command: {command:?}"),
        }
    }

    #[test]
    fn query_address() {
        match parse(&["-f", "rust", "query", "AA:BB:CC:DD:EE:FF"]).unwrap().command {
            Some(Command::Query(args)) => {
                assert_eq!(args.address, Address::new(0xAABBCCDDEEFF));
                assert_eq!(args.timeout, Duration::from_secs(5));
            }
            command => panic!("Unexpected command: {command:?}"),
        }

        assert!(parse(&["query", "AA:BB:CC"]).is_err());
        assert!(parse(&["query"]).is_err());
    }

    #[test]
    fn connect_defaults() {
        let args = connect(&["connect", "AA:BB:CC:DD:EE:FF", "ffe0", "ffe1", "3"]);

        assert_eq!(args.service, RegisteredService::HM10);
        assert_eq!(args.characteristic, RegisteredCharacteristic::HM10);
        assert_eq!(args.port, SerialConfig::port_name("3"));

        let config = args.serial_config();
        assert_eq!(config.baud, 9600);
        assert_eq!(config.data_bits, 8);
        assert_eq!(config.stop_bits, StopBits::One);
        assert_eq!(config.parity, Parity::None);

        let options = args.options();
        assert_eq!(options.scan_timeout, Duration::from_secs(5));
        assert_eq!(options.refresh, Duration::from_millis(100));
    }

    #[test]
    fn connect_all_parameters() {
        let args = connect(&[
            "connect",
            "AA:BB:CC:DD:EE:FF",
            "0x180F",
            "2a19",
            "/dev/ttyUSB0",
            "10",
            "115200",
            "7",
            "1.5",
            "mark",
            "20",
        ]);

        assert_eq!(args.service, RegisteredService::BATTERY);
        assert_eq!(args.characteristic, RegisteredCharacteristic::BATTERY_LEVEL);
        assert_eq!(args.port, "/dev/ttyUSB0");
        assert_eq!(args.timeout, Duration::from_secs(10));
        assert_eq!(args.baud, 115200);
        assert_eq!(args.data_bits, 7);
        assert_eq!(args.stop_bits, StopBits::OneAndHalf);
        assert_eq!(args.parity, Parity::Mark);
        assert_eq!(args.refresh, Duration::from_millis(20));
    }

    #[test]
    fn connect_bad_parameters() {
        let base = ["connect", "AA:BB:CC:DD:EE:FF", "ffe0", "ffe1", "3", "5", "9600"];

        for tail in [
            &["9"][..],
            &["8", "3"][..],
            &["8", "1", "high"][..],
            &["8", "1", "none", "fast"][..],
        ] {
            let args: Vec<&str> = base.iter().chain(tail).copied().collect();
            assert!(parse(&args).is_err(), "{args:?}");
        }

        assert!(parse(&["connect", "AA:BB:CC:DD:EE:FF", "zz", "ffe1", "3"]).is_err());
    }
}
