use crate::{
    args::{ConnectArgs, ListArgs, QueryArgs},
    log, Main,
};
use bleserial::{commands, Result};

impl Main {
    pub fn list(&self, args: &ListArgs) -> Result<()> {
        let devices = commands::list_devices(&self.backend, args.timeout)?;

        self.format.format_value(&devices, &mut std::io::stdout())
    }

    pub fn query(&self, args: &QueryArgs) -> Result<()> {
        let report = commands::query_device(&self.backend, args.address, args.timeout)?;

        self.format.format_value(&report, &mut std::io::stdout())
    }

    pub fn connect(&self, args: &ConnectArgs) -> Result<()> {
        let config = args.serial_config();

        log::info!(
            "Bridge {} {}/{} with {}",
            args.address,
            args.service,
            args.characteristic,
            config.port
        );

        commands::connect_device(
            &self.backend,
            args.address,
            args.service,
            args.characteristic,
            &args.options(),
            || config.open(),
            self.intr_signal(),
        )
    }
}
