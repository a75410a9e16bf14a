// Licensed under the Apache-2.0 license

//! Register-level boundary of the TWI master.
//!
//! [`TwiRegisters`] is the only place the driver touches hardware. The
//! memory-mapped [`Twi0`](super::twi0::Twi0) implements it with volatile
//! accesses; host tests implement it with a simulated bus.

/// CTRLA: Fast-mode Plus enable.
pub const CTRLA_FMPEN: u8 = 1 << 1;

/// MCTRLA: master enable.
pub const MCTRLA_ENABLE: u8 = 1 << 0;
/// MCTRLA: bus timeout field position.
pub const MCTRLA_TIMEOUT_SHIFT: u8 = 2;
/// MCTRLA: write interrupt enable. Never set by this driver.
pub const MCTRLA_WIEN: u8 = 1 << 6;
/// MCTRLA: read interrupt enable. Never set by this driver.
pub const MCTRLA_RIEN: u8 = 1 << 7;

/// MCTRLB: command field.
pub const MCTRLB_MCMD_MASK: u8 = 0x03;
/// MCTRLB: acknowledge action, 1 = NAK.
pub const MCTRLB_ACKACT: u8 = 1 << 2;
/// MCTRLB: flush internal master state.
pub const MCTRLB_FLUSH: u8 = 1 << 3;

/// MSTATUS: bus state field.
pub const MSTATUS_BUSSTATE_MASK: u8 = 0x03;
pub const MSTATUS_BUSERR: u8 = 1 << 2;
pub const MSTATUS_ARBLOST: u8 = 1 << 3;
pub const MSTATUS_RXACK: u8 = 1 << 4;
pub const MSTATUS_CLKHOLD: u8 = 1 << 5;
pub const MSTATUS_WIF: u8 = 1 << 6;
pub const MSTATUS_RIF: u8 = 1 << 7;

/// Access to one TWI master register set.
///
/// Implementations must perform the hardware side effects of each access:
/// writing MADDR starts an address phase, writing MDATA clocks a byte out,
/// writing MCTRLB issues a command.
pub trait TwiRegisters {
    fn write_ctrla(&mut self, value: u8);
    fn write_mctrla(&mut self, value: u8);
    fn read_mctrlb(&self) -> u8;
    fn write_mctrlb(&mut self, value: u8);
    fn read_mstatus(&self) -> u8;
    fn write_mstatus(&mut self, value: u8);
    fn write_mbaud(&mut self, value: u8);
    fn write_maddr(&mut self, value: u8);
    fn read_mdata(&mut self) -> u8;
    fn write_mdata(&mut self, value: u8);
}

/// Bus state reported in MSTATUS.BUSSTATE.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum BusState {
    Unknown = 0,
    Idle = 1,
    /// This master controls the bus.
    Owner = 2,
    /// Another master controls the bus.
    Busy = 3,
}

impl BusState {
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// Commands written to MCTRLB.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    Flush,
    Stop,
    /// Acknowledge the received byte and receive the next one.
    ReceiveAck,
    /// Not-acknowledge the received byte.
    ReceiveNak,
}

impl Command {
    /// MCMD value for a stop condition.
    pub const MCMD_STOP: u8 = 0x03;
    /// MCMD value for byte read operation.
    pub const MCMD_RECVTRANS: u8 = 0x02;

    /// Raw MCTRLB value for the strobe commands. `Flush` is set on top of
    /// the current register contents instead, see `BusMaster::start`.
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Command::Flush => MCTRLB_FLUSH,
            Command::Stop => Self::MCMD_STOP,
            Command::ReceiveAck => Self::MCMD_RECVTRANS,
            Command::ReceiveNak => MCTRLB_ACKACT | Self::MCMD_RECVTRANS,
        }
    }

    /// Decode what an MCTRLB write requests. Flush wins over MCMD.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Option<Self> {
        if bits & MCTRLB_FLUSH != 0 {
            return Some(Command::Flush);
        }
        match bits & MCTRLB_MCMD_MASK {
            Self::MCMD_STOP => Some(Command::Stop),
            Self::MCMD_RECVTRANS if bits & MCTRLB_ACKACT != 0 => Some(Command::ReceiveNak),
            Self::MCMD_RECVTRANS => Some(Command::ReceiveAck),
            _ => None,
        }
    }
}

/// Snapshot of MSTATUS.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status(u8);

impl Status {
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn bus_state(self) -> BusState {
        match self.0 & MSTATUS_BUSSTATE_MASK {
            0 => BusState::Unknown,
            1 => BusState::Idle,
            2 => BusState::Owner,
            _ => BusState::Busy,
        }
    }

    #[must_use]
    pub const fn is_idle(self) -> bool {
        matches!(self.bus_state(), BusState::Idle)
    }

    /// A write (or address) phase finished.
    #[must_use]
    pub const fn is_write_complete(self) -> bool {
        self.0 & MSTATUS_WIF != 0
    }

    /// A byte was received and is waiting in MDATA.
    #[must_use]
    pub const fn is_read_complete(self) -> bool {
        self.0 & MSTATUS_RIF != 0
    }

    #[must_use]
    pub const fn is_arbitration_lost(self) -> bool {
        self.0 & MSTATUS_ARBLOST != 0
    }

    #[must_use]
    pub const fn is_bus_error(self) -> bool {
        self.0 & MSTATUS_BUSERR != 0
    }

    #[must_use]
    pub const fn is_fault(self) -> bool {
        self.is_arbitration_lost() || self.is_bus_error()
    }

    /// The receiver answered the last byte with ACK (RXACK clear).
    #[must_use]
    pub const fn is_acknowledged(self) -> bool {
        self.0 & MSTATUS_RXACK == 0
    }

    #[must_use]
    pub const fn is_clock_held(self) -> bool {
        self.0 & MSTATUS_CLKHOLD != 0
    }
}
