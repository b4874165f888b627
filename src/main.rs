mod args;
mod cmdline;

use args::{Args, Command};
use bleserial::{gatt::Backend as _, BtleBackend, Result};
use std::process::ExitCode;
use tokio::{
    runtime::{Builder, Runtime},
    signal::ctrl_c,
    sync::watch,
};
use tracing as log;

fn main() -> ExitCode {
    let args = Args::from_cmdline();

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        if !env!("CARGO_PKG_DESCRIPTION").is_empty() {
            println!("{}", env!("CARGO_PKG_DESCRIPTION"));
        }
        return ExitCode::SUCCESS;
    }

    if let Err(error) = init_logging(&args) {
        eprintln!("Unable to initialize logging: {error}");
        return ExitCode::FAILURE;
    }

    log::info!("Start...");
    log::trace!("{args:?}");

    if args.command.is_none() {
        eprintln!("Please specify the command: ls, query, connect (try 'help')");
        return ExitCode::FAILURE;
    }

    match Main::new(args).and_then(|mut main| main.run()) {
        Ok(()) => {
            log::info!("Stop...");
            ExitCode::SUCCESS
        }
        Err(error) => {
            log::error!("Exit with error: {error}");
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(feature = "tracing-subscriber")]
fn init_logging(args: &Args) -> Result<()> {
    if let Some(log) = args.log_filter() {
        use tracing_subscriber::prelude::*;

        let registry = tracing_subscriber::registry().with(log);

        #[cfg(all(feature = "stderr", feature = "journal"))]
        let registry = registry.with(if !args.journal {
            Some(tracing_subscriber::fmt::Layer::default().with_writer(std::io::stderr))
        } else {
            None
        });

        #[cfg(all(feature = "stderr", not(feature = "journal")))]
        let registry =
            registry.with(tracing_subscriber::fmt::Layer::default().with_writer(std::io::stderr));

        #[cfg(feature = "journal")]
        let registry = registry.with(if args.journal {
            Some(tracing_journald::Layer::new()?)
        } else {
            None
        });

        registry.init();
    }

    Ok(())
}

#[cfg(not(feature = "tracing-subscriber"))]
fn init_logging(_args: &Args) -> Result<()> {
    Ok(())
}

pub struct Main {
    args: Args,
    backend: BtleBackend,
    runtime: Runtime,
}

impl core::ops::Deref for Main {
    type Target = Args;
    fn deref(&self) -> &Self::Target {
        &self.args
    }
}

impl Main {
    pub fn new(args: Args) -> Result<Self> {
        let runtime = Builder::new_multi_thread().enable_all().build()?;
        let backend = BtleBackend::new(runtime.handle().clone());

        Ok(Self {
            args,
            backend,
            runtime,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        self.backend.initialize()?;

        match &self.args.command {
            Some(Command::List(args)) => self.list(args),
            Some(Command::Query(args)) => self.query(args),
            Some(Command::Connect(args)) => self.connect(args),
            None => Ok(()),
        }
    }

    /// Stop signal raised on ctrl-c
    fn intr_signal(&self) -> watch::Receiver<bool> {
        let (sender, receiver) = watch::channel(false);

        self.runtime.spawn(async move {
            log::debug!("Await ctrl-c signal");
            if let Err(error) = ctrl_c().await {
                log::error!("Error while processing ctrl-c: {error}");
            }
            let _ = sender.send(true);
        });

        receiver
    }
}
