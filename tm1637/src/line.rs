//! The two wires of the TM1637 bus, modelled as open-drain lines.
//!
//! The TM1637 expects both CLK and DIO to be open-drain with external pull-up resistors: either
//! side may pull a line LOW, and a line is HIGH only when nobody pulls it.  The controller ACKs a
//! byte by pulling DIO LOW, which we could never observe if we were driving DIO HIGH ourselves.
//!
//! Plenty of GPIO hardware (the Raspberry Pi included) has no open-drain output mode, only
//! push-pull output and pure input.  We get open-drain behavior anyway by switching the pin
//! direction: input (high impedance) lets the pull-up win, output with a LOW level pulls the line
//! down.  [`Line`] exposes only those two states, so there is no way to drive a line HIGH.

/// The role a line plays on the bus.
#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineId {
    Dio,
    Clk,
}

/// One open-drain (or emulated open-drain) GPIO line.
///
/// Implementations must never drive the pin HIGH.  Physical failures are not reported; GPIO
/// backends that can fail here have already failed during initialization.
///
/// Ideally this would be expressed in terms of Embedded HAL traits, but [there is no pin
/// abstraction that can switch direction](https://github.com/rust-embedded/embedded-hal/issues/397),
/// so each platform gets its own small implementation.
pub trait Line {
    /// Stop driving the line, letting the pull-up present a HIGH level.
    fn release(&mut self);

    /// Drive the line LOW.
    fn pull(&mut self);

    /// Sample the level currently on the line.
    ///
    /// Only meaningful while the line is released, since a pulled line always reads LOW.
    fn is_high(&mut self) -> bool;

    fn is_low(&mut self) -> bool {
        !self.is_high()
    }

    /// The GPIO number of this line, for diagnostics.
    fn pin(&self) -> u8;
}

impl<L: Line + ?Sized> Line for &mut L {
    fn release(&mut self) {
        (**self).release()
    }

    fn pull(&mut self) {
        (**self).pull()
    }

    fn is_high(&mut self) -> bool {
        (**self).is_high()
    }

    fn pin(&self) -> u8 {
        (**self).pin()
    }
}

#[cfg(feature = "rppal")]
mod rppal_line {
    use rppal::gpio::{IoPin, Mode};

    /// Raspberry Pi pins only do push-pull output or input, so this is the direction-switching
    /// emulation described in the module docs.
    impl super::Line for IoPin {
        fn release(&mut self) {
            self.set_mode(Mode::Input);
        }

        fn pull(&mut self) {
            // Latch LOW before switching to output, otherwise the pin could briefly drive
            // whatever level was latched last.
            self.set_low();
            self.set_mode(Mode::Output);
        }

        fn is_high(&mut self) -> bool {
            IoPin::is_high(self)
        }

        fn pin(&self) -> u8 {
            IoPin::pin(self)
        }
    }
}
