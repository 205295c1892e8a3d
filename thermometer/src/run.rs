//! The measurement loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tm1637::{ProtocolError, Reading};

use crate::sensor::TemperatureSource;

/// How often the running flag is checked while waiting for the next measurement
pub const POLL_STEP: Duration = Duration::from_secs(1);

/// Measure and show the temperature every `interval`, until `running` is cleared.
///
/// A reading that can't be shown is logged and the loop carries on; the next cycle rewrites the
/// whole display anyway.  `sleep` is called with [`POLL_STEP`] (or less, for the remainder of an
/// interval that isn't a whole number of steps), so a cleared flag is noticed within one step.
///
/// Returns the number of measurements taken.
pub fn run<S, F, Z>(
    source: &mut S,
    mut show: F,
    running: &AtomicBool,
    interval: Duration,
    mut sleep: Z,
) -> usize
where
    S: TemperatureSource + ?Sized,
    F: FnMut(Reading) -> Result<(), ProtocolError>,
    Z: FnMut(Duration),
{
    let mut cycles = 0;

    while running.load(Ordering::SeqCst) {
        let reading = source.read();
        log::debug!("temperature {}", reading);

        if let Err(e) = show(reading) {
            log::error!("failed to show {}: {}", reading, e);
        }
        cycles += 1;

        wait(interval, running, &mut sleep);
    }

    cycles
}

/// Sleep for `interval` in steps of at most [`POLL_STEP`], returning early once `running` is
/// cleared
pub fn wait(interval: Duration, running: &AtomicBool, mut sleep: impl FnMut(Duration)) {
    let mut remaining = interval;

    while !remaining.is_zero() && running.load(Ordering::SeqCst) {
        let step = remaining.min(POLL_STEP);
        sleep(step);
        remaining -= step;
    }
}
