//! Temperature display for a Raspberry Pi with a TM1637 4 digit LED module.
//!
//! Every interval, runs the sensor program, and shows what it printed (in degrees Celsius, one
//! decimal place) on the display.  Runs until interrupted with Ctrl+C.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod display;
mod run;
mod sensor;

use cli::Cli;
use sensor::CommandSource;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    log::info!("TM1637 temperature display");
    log::info!("measurement interval: {} s", cli.interval);
    log::info!("press Ctrl+C to quit");

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))
            .context("cannot install the Ctrl+C handler")?;
    }

    let mut display =
        display::init(cli.dio, cli.clk).context("cannot initialize the display")?;

    let mut source = CommandSource::new(&cli.sensor, &cli.sensor_args);

    run::run(
        &mut source,
        |reading| display.show(reading),
        &running,
        cli.interval(),
        thread::sleep,
    );

    log::info!("shutting down");
    display::shutdown(display);

    Ok(())
}
