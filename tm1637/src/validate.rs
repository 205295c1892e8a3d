//! Startup check that the bus has its pull-up resistors.
//!
//! Without pull-ups a released line floats, or reads LOW, and the controller never sees a HIGH
//! level.  Nothing on the bus would work, and the failure would look like a dead display, so we
//! refuse to start instead.

use crate::bus::Timer;
use crate::line::{Line, LineId};

/// The bus is not wired the way the driver needs it to be
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    #[error("{line} (GPIO {pin}) reads LOW after release; check its 4.7k pull-up resistor")]
    PullUpMissing { line: LineId, pin: u8 },

    #[error(
        "DIO (GPIO {dio}) and CLK (GPIO {clk}) read LOW after release; check the 4.7k pull-up resistors"
    )]
    PullUpsMissing { dio: u8, clk: u8 },
}

/// Release both lines, give them time to settle, and make sure both read HIGH.
///
/// Must run before any other traffic on the bus.  There is no point retrying a failure: wiring
/// doesn't fix itself.
pub fn validate<Dio: Line, Clk: Line, T: Timer>(
    dio: &mut Dio,
    clk: &mut Clk,
    timer: &mut T,
) -> Result<(), ConfigError> {
    dio.release();
    clk.release();

    timer.wait_settle();

    let dio_high = dio.is_high();
    let clk_high = clk.is_high();

    log::debug!(
        "line levels after release: DIO={} CLK={}",
        level_name(dio_high),
        level_name(clk_high)
    );

    match (dio_high, clk_high) {
        (true, true) => Ok(()),
        (false, true) => Err(ConfigError::PullUpMissing {
            line: LineId::Dio,
            pin: dio.pin(),
        }),
        (true, false) => Err(ConfigError::PullUpMissing {
            line: LineId::Clk,
            pin: clk.pin(),
        }),
        (false, false) => Err(ConfigError::PullUpsMissing {
            dio: dio.pin(),
            clk: clk.pin(),
        }),
    }
}

fn level_name(high: bool) -> &'static str {
    if high {
        "HIGH"
    } else {
        "LOW"
    }
}
