#![cfg_attr(not(test), no_std)]

mod bus;
mod font;
mod frame;
mod line;
mod validate;

#[cfg(test)]
mod testing;

pub use bus::*;
pub use frame::*;
pub use line::*;
pub use validate::*;

/// The controller did not acknowledge part of a frame.
///
/// The write was abandoned and the bus released, so the next write starts from a clean idle
/// state.  Nothing about the driver needs resetting after this.  The pull-up check is run again
/// before the error is returned, and a wiring fault it finds is logged.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolError {
    #[error("display did not acknowledge frame byte {index} ({byte:#04x})")]
    Nack {
        /// Position in the frame, the address byte being 0
        index: usize,
        byte: u8,
    },
}

/// Driver for a TM1637 LED controller with a 4 digit 7 segment display, used as a thermometer.
///
/// The driver is generic over the two bus lines and the timer that paces the bus.  Build one with
/// [`Self::new`], which checks the wiring before anything is sent.  Each call to
/// [`Self::write_frame`] (or [`Self::show`]) replaces the whole display and turns it on; there is
/// no other state kept between calls.
pub struct Tm1637<Dio, Clk, T> {
    bus: Bus<Dio, Clk, T>,
}

impl<Dio: Line, Clk: Line, T: Timer> Tm1637<Dio, Clk, T> {
    /// Take ownership of the lines, and make sure the pull-up resistors are there.
    ///
    /// On failure the lines are dropped, released.
    pub fn new(mut dio: Dio, mut clk: Clk, mut timer: T) -> Result<Self, ConfigError> {
        validate(&mut dio, &mut clk, &mut timer)?;

        log::info!(
            "TM1637 lines validated (GPIO {}=DIO, GPIO {}=CLK)",
            dio.pin(),
            clk.pin()
        );

        Ok(Self {
            bus: Bus::new(dio, clk, timer),
        })
    }

    /// Show a reading: the temperature, or `Err` if it is unavailable
    pub fn show(&mut self, reading: Reading) -> Result<(), ProtocolError> {
        self.write_frame(&encode_reading(reading))
    }

    /// Write a frame to the display and turn the display on.
    ///
    /// The frame's bytes go out in one START..STOP burst, after the command that puts the
    /// controller in auto-increment mode.  If the controller refuses a byte the burst is cut
    /// short, STOP is still sent, and the display is not turned on.
    pub fn write_frame(&mut self, frame: &Frame) -> Result<(), ProtocolError> {
        log::debug!("writing {:?} frame {:02x?}", frame.kind(), frame.segments());

        self.send_command(Command::AutoIncrementWrite);

        self.bus.start();
        for (index, byte) in frame.as_bytes().iter().copied().enumerate() {
            if !self.bus.write_byte(byte) {
                self.bus.stop();
                log::warn!("NACK sending frame byte {} ({:#04x})", index, byte);

                if let Err(e) = self.validate_lines() {
                    log::error!("{}", e);
                }

                return Err(ProtocolError::Nack { index, byte });
            }
        }
        self.bus.stop();

        self.send_command(Command::DisplayOn {
            brightness: DEFAULT_BRIGHTNESS,
        });

        Ok(())
    }

    /// Run the pull-up check again, to tell a display that stopped answering from a broken wire
    fn validate_lines(&mut self) -> Result<(), ConfigError> {
        let (dio, clk, timer) = self.bus.parts();
        validate(dio, clk, timer)
    }

    /// Release both lines and give them back, for example so the GPIO backend can be shut down.
    ///
    /// Whatever is on the display stays there; the controller keeps showing it without us.
    pub fn release(mut self) -> (Dio, Clk) {
        self.bus.release_lines();
        let (dio, clk, _timer) = self.bus.into_inner();

        (dio, clk)
    }

    /// Single byte commands.  The controller acknowledges these too, but a lost command only
    /// matters if the data that follows is also lost, which is reported then.
    fn send_command(&mut self, command: Command) {
        let byte = command.encode();

        log::trace!("command byte = {:#04x}", byte);

        if !self.bus.send_command(byte) {
            log::warn!("NACK on command {:#04x}", byte);
        }
    }
}

/// Display brightness, from 0 (dimmest) to 7
const DEFAULT_BRIGHTNESS: u8 = 0;

/// Represents the commands sent to the TM1637 as Rust enums for greater readability.
#[derive(Copy, Clone, Debug)]
enum Command {
    /// Following data bytes are written to consecutive digits, starting from the address byte
    /// that leads the data.
    AutoIncrementWrite,

    /// Turn on the display at the given brightness.
    DisplayOn {
        /// Brightness, in a range from 0 to 7.  If `brightness` is larger than this range it will
        /// be set to the value `brightness` mod 8.
        brightness: u8,
    },
}

impl Command {
    fn encode(self) -> u8 {
        match self {
            // Data command, write to display register, automatic address increment, normal mode
            Command::AutoIncrementWrite => 0b0100_0000,
            // Display control command, display on, lowest three bits are the pulse width
            Command::DisplayOn { brightness } => 0b1000_1000 | (brightness & 0b0000_0111),
        }
    }
}
