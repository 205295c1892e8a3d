//! A simulated TM1637 bus for unit tests: two open-drain lines with (optional) pull-ups, and a
//! slave that decodes START/STOP, clocks in bytes LSB first and ACKs them.

use std::cell::RefCell;
use std::rc::Rc;
use std::vec::Vec;

use crate::{Line, LineId, Timer};

/// GPIO numbers of the simulated lines, matching the usual Raspberry Pi wiring
pub(crate) const SIM_DIO_PIN: u8 = 24;
pub(crate) const SIM_CLK_PIN: u8 = 23;

/// What the master has done with a line
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum LineState {
    /// Input mode, high impedance
    Released,
    /// Output mode, driven LOW
    Pulled,
}

/// Something the slave observed on the bus
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Event {
    Start,
    Stop,
    Byte { value: u8, acked: bool },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Phase {
    /// No transaction in progress
    Idle,
    /// Clocking in the bits of a byte
    Receiving { bits: u8, value: u8 },
    /// All 8 bits received; the slave holds DIO LOW (or not) until the 9th clock falls
    Acknowledging,
}

struct State {
    dio: LineState,
    clk: LineState,
    dio_pull_up: bool,
    clk_pull_up: bool,
    slave_holds_dio: bool,
    phase: Phase,
    /// Number of START conditions seen so far
    transactions: usize,
    /// Index of the byte being received within the current transaction
    byte_index: usize,
    nack: Option<(usize, usize)>,
    events: Vec<Event>,
    half_periods: usize,
    settles: usize,
}

impl State {
    fn dio_high(&self) -> bool {
        self.dio_pull_up && self.dio == LineState::Released && !self.slave_holds_dio
    }

    fn clk_high(&self) -> bool {
        self.clk_pull_up && self.clk == LineState::Released
    }

    fn set_master(&mut self, id: LineId, state: LineState) {
        let (dio_before, clk_before) = (self.dio_high(), self.clk_high());

        match id {
            LineId::Dio => self.dio = state,
            LineId::Clk => self.clk = state,
        }

        let (dio_after, clk_after) = (self.dio_high(), self.clk_high());

        if clk_before && clk_after {
            if dio_before && !dio_after {
                self.on_start();
            } else if !dio_before && dio_after {
                self.on_stop();
            }
        } else if !clk_before && clk_after {
            self.on_clock_rise(dio_after);
        } else if clk_before && !clk_after {
            self.on_clock_fall();
        }
    }

    fn on_start(&mut self) {
        self.events.push(Event::Start);
        self.transactions += 1;
        self.byte_index = 0;
        self.phase = Phase::Receiving { bits: 0, value: 0 };
    }

    fn on_stop(&mut self) {
        self.events.push(Event::Stop);
        self.phase = Phase::Idle;
    }

    fn on_clock_rise(&mut self, dio: bool) {
        if let Phase::Receiving { bits, value } = self.phase {
            if bits < 8 {
                let value = if dio { value | (1 << bits) } else { value };
                self.phase = Phase::Receiving {
                    bits: bits + 1,
                    value,
                };
            }
        }
    }

    fn on_clock_fall(&mut self) {
        match self.phase {
            Phase::Receiving { bits: 8, value } => {
                let acked = self.nack != Some((self.transactions - 1, self.byte_index));
                self.events.push(Event::Byte { value, acked });
                self.slave_holds_dio = acked;
                self.phase = Phase::Acknowledging;
            }
            Phase::Acknowledging => {
                self.slave_holds_dio = false;
                self.byte_index += 1;
                self.phase = Phase::Receiving { bits: 0, value: 0 };
            }
            _ => {}
        }
    }
}

/// Handle on the simulated bus, shared by its lines and timer
#[derive(Clone)]
pub(crate) struct SimBus(Rc<RefCell<State>>);

impl SimBus {
    pub(crate) fn new() -> Self {
        Self(Rc::new(RefCell::new(State {
            dio: LineState::Released,
            clk: LineState::Released,
            dio_pull_up: true,
            clk_pull_up: true,
            slave_holds_dio: false,
            phase: Phase::Idle,
            transactions: 0,
            byte_index: 0,
            nack: None,
            events: Vec::new(),
            half_periods: 0,
            settles: 0,
        })))
    }

    /// Leave the pull-up resistor off the given line
    pub(crate) fn without_pull_up(self, id: LineId) -> Self {
        {
            let mut state = self.0.borrow_mut();
            match id {
                LineId::Dio => state.dio_pull_up = false,
                LineId::Clk => state.clk_pull_up = false,
            }
        }
        self
    }

    /// Have the slave refuse byte `byte_index` (0-based) of the transaction opened by START number
    /// `transaction` (0-based)
    pub(crate) fn nack(self, transaction: usize, byte_index: usize) -> Self {
        self.0.borrow_mut().nack = Some((transaction, byte_index));
        self
    }

    pub(crate) fn lines(&self) -> (SimLine, SimLine) {
        (
            SimLine {
                bus: self.clone(),
                id: LineId::Dio,
            },
            SimLine {
                bus: self.clone(),
                id: LineId::Clk,
            },
        )
    }

    pub(crate) fn timer(&self) -> SimTimer {
        SimTimer { bus: self.clone() }
    }

    pub(crate) fn events(&self) -> Vec<Event> {
        self.0.borrow().events.clone()
    }

    pub(crate) fn clear_events(&self) {
        self.0.borrow_mut().events.clear();
    }

    pub(crate) fn master_state(&self, id: LineId) -> LineState {
        let state = self.0.borrow();
        match id {
            LineId::Dio => state.dio,
            LineId::Clk => state.clk,
        }
    }

    pub(crate) fn half_periods(&self) -> usize {
        self.0.borrow().half_periods
    }

    pub(crate) fn settles(&self) -> usize {
        self.0.borrow().settles
    }
}

pub(crate) struct SimLine {
    bus: SimBus,
    id: LineId,
}

impl Line for SimLine {
    fn release(&mut self) {
        self.bus
            .0
            .borrow_mut()
            .set_master(self.id, LineState::Released);
    }

    fn pull(&mut self) {
        self.bus.0.borrow_mut().set_master(self.id, LineState::Pulled);
    }

    fn is_high(&mut self) -> bool {
        let state = self.bus.0.borrow();
        match self.id {
            LineId::Dio => state.dio_high(),
            LineId::Clk => state.clk_high(),
        }
    }

    fn pin(&self) -> u8 {
        match self.id {
            LineId::Dio => SIM_DIO_PIN,
            LineId::Clk => SIM_CLK_PIN,
        }
    }
}

/// Timer that takes no time, but counts how often it was asked to wait
pub(crate) struct SimTimer {
    bus: SimBus,
}

impl Timer for SimTimer {
    fn wait_half_period(&mut self) {
        self.bus.0.borrow_mut().half_periods += 1;
    }

    fn wait_settle(&mut self) {
        self.bus.0.borrow_mut().settles += 1;
    }
}

/// The bytes the slave saw, in order, regardless of ACK
pub(crate) fn bytes(events: &[Event]) -> Vec<u8> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::Byte { value, .. } => Some(*value),
            _ => None,
        })
        .collect()
}
