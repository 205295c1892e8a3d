//! The TM1637 bus protocol, bit-banged on two [`Line`]s, and the [`Timer`] trait that paces it.
//!
//! The TM1637 uses a two-wire bus that borrows START/STOP framing and the ACK bit from I2C, but
//! has no device address, shifts bytes out LSB first, and is not electrically identical to I2C.
//! So an I2C peripheral can't be used; we clock the bits out by hand.

use crate::line::Line;

/// Delay after every edge on the bus, in microseconds.
///
/// This is half of the bus clock period, so the bus runs at roughly 10kHz.  The controller samples
/// DIO on the rising edge of CLK and needs the line stable well before that, so this is a minimum.
pub const HALF_PERIOD_US: u32 = 50;

/// How long released lines are given to float up to the pull-up level before they're sampled
pub const SETTLE_US: u32 = 1_000;

/// Abstraction on platform-specific delays to pace the bus.
///
/// Implementations may wait longer than asked, never shorter.  A sleep with millisecond
/// granularity is far too coarse for [`Self::wait_half_period`]; it would still work, but it
/// would make each frame take a noticeable fraction of a second.
pub trait Timer {
    /// Wait at least [`HALF_PERIOD_US`]
    fn wait_half_period(&mut self);

    /// Wait at least [`SETTLE_US`].  By default it is implemented in terms of
    /// `wait_half_period`.
    fn wait_settle(&mut self) {
        for _ in 0..SETTLE_US.div_ceil(HALF_PERIOD_US) {
            self.wait_half_period();
        }
    }
}

/// [`Timer`] built on any Embedded HAL delay provider
pub struct DelayTimer<D> {
    delay: D,
}

impl<D: embedded_hal_1::delay::DelayNs> DelayTimer<D> {
    pub fn new(delay: D) -> Self {
        Self { delay }
    }
}

impl<D: embedded_hal_1::delay::DelayNs> Timer for DelayTimer<D> {
    fn wait_half_period(&mut self) {
        self.delay.delay_us(HALF_PERIOD_US);
    }

    fn wait_settle(&mut self) {
        self.delay.delay_us(SETTLE_US);
    }
}

impl<T: Timer + ?Sized> Timer for &mut T {
    fn wait_half_period(&mut self) {
        (**self).wait_half_period()
    }

    fn wait_settle(&mut self) {
        (**self).wait_settle()
    }
}

/// Bit-banging implementation of the TM1637 bus.
///
/// Owns both lines for as long as it lives.  Between calls both lines are left released, which is
/// the idle state of the bus; inside a START..STOP bracket CLK is left LOW between bytes.
pub struct Bus<Dio, Clk, T> {
    dio: Dio,
    clk: Clk,
    timer: T,
}

impl<Dio: Line, Clk: Line, T: Timer> Bus<Dio, Clk, T> {
    pub fn new(dio: Dio, clk: Clk, timer: T) -> Self {
        Self { dio, clk, timer }
    }

    /// START condition: DIO falls while CLK is HIGH
    pub fn start(&mut self) {
        self.dio.release();
        self.clk.release();
        self.timer.wait_half_period();
        self.dio.pull();
        self.timer.wait_half_period();
        self.clk.pull();
    }

    /// STOP condition: DIO rises while CLK is HIGH.  Leaves both lines released.
    pub fn stop(&mut self) {
        self.dio.pull();
        self.clk.release();
        self.timer.wait_half_period();
        self.dio.release();
        self.timer.wait_half_period();
    }

    /// Shift a byte out on DIO, LSB first, then clock in the controller's acknowledgement.
    ///
    /// Returns `true` if the controller ACKed the byte by holding DIO LOW during the ninth clock
    /// pulse.  A controller that isn't there simply leaves DIO HIGH, so this never blocks for
    /// longer than the nine clock pulses.
    ///
    /// Assumes CLK is LOW, which is how [`Self::start`] and the previous `write_byte` leave it.
    pub fn write_byte(&mut self, byte: u8) -> bool {
        let mut bits = byte;

        for _ in 0..8 {
            if bits & 0x01 != 0 {
                self.dio.release();
            } else {
                self.dio.pull();
            }
            self.timer.wait_half_period();

            // The controller reads DIO on the rising edge
            self.clk.release();
            self.timer.wait_half_period();
            self.clk.pull();

            bits >>= 1;
        }

        // Hand DIO over to the controller for the ACK bit
        self.dio.release();
        self.timer.wait_half_period();
        self.clk.release();
        self.timer.wait_half_period();

        let acked = self.dio.is_low();

        self.clk.pull();

        log::trace!("byte {:#04x} {}", byte, if acked { "ACK" } else { "NACK" });

        acked
    }

    /// Send a single command byte in its own START..STOP bracket.
    ///
    /// Returns whether the command was ACKed.
    pub fn send_command(&mut self, command: u8) -> bool {
        self.start();
        let acked = self.write_byte(command);
        self.stop();

        acked
    }

    /// Release both lines, returning the bus to its idle state
    pub fn release_lines(&mut self) {
        self.dio.release();
        self.clk.release();
    }

    pub(crate) fn parts(&mut self) -> (&mut Dio, &mut Clk, &mut T) {
        (&mut self.dio, &mut self.clk, &mut self.timer)
    }

    pub fn into_inner(self) -> (Dio, Clk, T) {
        (self.dio, self.clk, self.timer)
    }
}
