//! Bringing the display up on the Raspberry Pi GPIO, and shutting it down again.

use std::time::{Duration, Instant};

use rppal::gpio::{Bias, Gpio, IoPin, Mode};
use tm1637::{ConfigError, DelayTimer, Tm1637};

/// The driver as wired on the Pi
pub type Display = Tm1637<IoPin, IoPin, DelayTimer<SpinDelay>>;

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("cannot initialize GPIO: {0}")]
    Gpio(#[from] rppal::gpio::Error),

    #[error(transparent)]
    PullUps(#[from] ConfigError),
}

/// Busy-waiting delay.
///
/// The bus needs delays of tens of microseconds between edges.  A thread sleep that short
/// usually oversleeps by a scheduler tick or more, so we spin on the monotonic clock instead.
/// The wait is never shorter than requested.
#[derive(Copy, Clone, Debug, Default)]
pub struct SpinDelay;

impl embedded_hal_1::delay::DelayNs for SpinDelay {
    fn delay_ns(&mut self, ns: u32) {
        let deadline = Instant::now() + Duration::from_nanos(u64::from(ns));

        while Instant::now() < deadline {
            std::hint::spin_loop();
        }
    }
}

/// Open the GPIO, claim the two bus lines, and validate the wiring.
///
/// Both pins start out as inputs with the internal pull resistors off, so the check sees only
/// the external pull-ups.  If validation fails the pins and the GPIO handle are dropped, which
/// hands them back to the system.
pub fn init(dio: u8, clk: u8) -> Result<Display, InitError> {
    let gpio = Gpio::new()?;

    let dio = claim(&gpio, dio)?;
    let clk = claim(&gpio, clk)?;

    let display = Tm1637::new(dio, clk, DelayTimer::new(SpinDelay))?;

    Ok(display)
}

fn claim(gpio: &Gpio, pin: u8) -> Result<IoPin, InitError> {
    let mut pin = gpio.get(pin)?.into_io(Mode::Input);
    pin.set_bias(Bias::Off);

    Ok(pin)
}

/// Leave both lines released and let go of the GPIO.  Call once, at exit.
pub fn shutdown(display: Display) {
    let (dio, clk) = display.release();

    log::debug!("released GPIO {} (DIO) and GPIO {} (CLK)", dio.pin(), clk.pin());
}
