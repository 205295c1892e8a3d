//! Turning a temperature reading into the bytes the TM1637 needs to show it.
//!
//! The display has four digits.  The leftmost one shows the sign, the other three show the
//! reading in tenths of a degree with the decimal point lit after the second, so `235` comes
//! out as ` 23.5`.  Anything that needs more than three digits shows `OFL`, and a missing reading
//! shows `Err`.

use core::fmt;

use crate::font;

/// Data command address of the leftmost digit.  In auto-increment mode the following bytes go to
/// the next digits in turn.
pub const ADDRESS: u8 = 0xC0;

/// Size of the largest frame: address, sign, three digits
pub const FRAME_CAPACITY: usize = 5;

/// A temperature as delivered by the sensor
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reading {
    /// Tenths of a degree Celsius
    Tenths(i16),
    /// The sensor could not be read
    Unavailable,
}

impl From<Option<i16>> for Reading {
    fn from(tenths: Option<i16>) -> Self {
        tenths.map_or(Reading::Unavailable, Reading::Tenths)
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Tenths(tenths) => {
                let sign = if *tenths < 0 { "-" } else { "" };
                let magnitude = tenths.unsigned_abs();
                write!(f, "{}{}.{}°C", sign, magnitude / 10, magnitude % 10)
            }
            Reading::Unavailable => f.write_str("unavailable"),
        }
    }
}

/// Which of the fixed layouts a [`Frame`] uses
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameKind {
    /// Sign and three digits
    Numeric,
    /// Sign and "OFL"
    Overflow,
    /// "Err", one byte shorter than the other two
    Error,
}

/// The address byte followed by the segment masks for the display, ready to be written in one
/// burst.  Never empty.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    kind: FrameKind,
    bytes: [u8; FRAME_CAPACITY],
    len: usize,
}

impl Frame {
    fn new<const N: usize>(kind: FrameKind, bytes: [u8; N]) -> Self {
        let mut buffer = [0u8; FRAME_CAPACITY];
        buffer[..N].copy_from_slice(&bytes);

        Self {
            kind,
            bytes: buffer,
            len: N,
        }
    }

    pub fn kind(&self) -> FrameKind {
        self.kind
    }

    /// Every byte of the frame, starting with the address
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Segment masks only, without the address
    pub fn segments(&self) -> &[u8] {
        &self.bytes[1..self.len]
    }
}

/// Encode a value in tenths of a degree.
///
/// Values with a magnitude of 1000 or more don't fit in three digits and produce the overflow
/// frame, which keeps the sign.
pub fn encode_numeric(value: i16) -> Frame {
    let sign = if value < 0 { font::MINUS } else { font::BLANK };

    // unsigned_abs because -i16::MIN doesn't fit in an i16
    let magnitude = value.unsigned_abs();

    let digits = [magnitude / 100, magnitude / 10 % 10, magnitude % 10];
    let mut masks = [font::BLANK; 3];

    for (mask, digit) in masks.iter_mut().zip(digits) {
        match u8::try_from(digit).ok().and_then(font::digit) {
            Some(segments) => *mask = segments,
            None => return encode_overflow(sign),
        }
    }

    masks[1] |= font::DECIMAL_POINT;

    Frame::new(
        FrameKind::Numeric,
        [ADDRESS, sign, masks[0], masks[1], masks[2]],
    )
}

fn encode_overflow(sign: u8) -> Frame {
    Frame::new(
        FrameKind::Overflow,
        [ADDRESS, sign, font::O_UPPER, font::F_UPPER, font::L_UPPER],
    )
}

/// The "Err" frame shown when there is no reading
pub fn encode_error() -> Frame {
    Frame::new(
        FrameKind::Error,
        [ADDRESS, font::E_UPPER, font::R_LOWER, font::R_LOWER],
    )
}

pub fn encode_reading(reading: Reading) -> Frame {
    match reading {
        Reading::Tenths(tenths) => encode_numeric(tenths),
        Reading::Unavailable => encode_error(),
    }
}
