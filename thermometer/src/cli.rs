use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Show the temperature on a TM1637 4 digit LED display wired to a Raspberry Pi.
///
/// Both bus lines need external pull-up resistors (4.7k to 3.3V).
#[derive(Debug, Parser)]
#[command(version)]
pub struct Cli {
    /// Measurement interval in seconds
    #[arg(short, long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,

    /// GPIO (BCM numbering) connected to the display's DIO pin
    #[arg(long, default_value_t = 24)]
    pub dio: u8,

    /// GPIO (BCM numbering) connected to the display's CLK pin
    #[arg(long, default_value_t = 23)]
    pub clk: u8,

    /// Program that prints the temperature in degrees Celsius on the first line of its output
    #[arg(long, default_value = "./r4dcb08")]
    pub sensor: PathBuf,

    /// Argument to pass to the sensor program; repeat for more than one
    #[arg(long = "sensor-arg", default_values_t = [String::from("-f")], allow_hyphen_values = true)]
    pub sensor_args: Vec<String>,
}

impl Cli {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }
}
