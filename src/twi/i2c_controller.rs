// Licensed under the Apache-2.0 license

//! embedded-hal I2C controller on top of the TWI master primitives.
//!
//! This module provides the `embedded_hal::i2c::I2c` implementation so
//! device drivers from the ecosystem can run on the blocking
//! [`BusMaster`](super::bus_master::BusMaster). Operations of the same
//! direction are merged, a direction change issues a repeated start, and the
//! last byte of a read run is NAKed.

use crate::common::{Logger, NoOpLogger};
use crate::twi::common::{AddressByte, Direction, NotAccessible, NotAcknowledged};
use crate::twi::traits::TwiMaster;
use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource, Operation, SevenBitAddress};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    AddressNak,
    DataNak,
    ArbitrationLost,
    BusError,
    /// Address does not fit in 7 bits.
    InvalidAddress,
}

impl Error {
    /// The bus is still owned by this master and needs a stop.
    fn holds_bus(self) -> bool {
        matches!(self, Error::AddressNak | Error::DataNak)
    }
}

impl embedded_hal::i2c::Error for Error {
    fn kind(&self) -> ErrorKind {
        match self {
            Error::AddressNak => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address),
            Error::DataNak => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data),
            Error::ArbitrationLost => ErrorKind::ArbitrationLoss,
            Error::BusError => ErrorKind::Bus,
            Error::InvalidAddress => ErrorKind::Other,
        }
    }
}

impl From<NotAccessible> for Error {
    fn from(err: NotAccessible) -> Self {
        match err {
            NotAccessible::Nak => Error::AddressNak,
            NotAccessible::ArbitrationLost => Error::ArbitrationLost,
            NotAccessible::BusError => Error::BusError,
        }
    }
}

impl From<NotAcknowledged> for Error {
    fn from(err: NotAcknowledged) -> Self {
        match err {
            NotAcknowledged::Nak => Error::DataNak,
            NotAcknowledged::ArbitrationLost => Error::ArbitrationLost,
            NotAcknowledged::BusError => Error::BusError,
        }
    }
}

pub struct I2cController<H: TwiMaster, L: Logger = NoOpLogger> {
    pub hardware: H,
    pub logger: L,
}

impl<H: TwiMaster> I2cController<H, NoOpLogger> {
    pub fn new(hardware: H) -> Self {
        Self {
            hardware,
            logger: NoOpLogger {},
        }
    }
}

impl<H: TwiMaster, L: Logger> I2cController<H, L> {
    pub fn with_logger(hardware: H, logger: L) -> Self {
        Self { hardware, logger }
    }

    // Returns whether a start succeeded, alongside the outcome.
    fn run(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> (bool, Result<(), Error>) {
        let mut current: Option<Direction> = None;
        // bytes taken since the current read run was addressed
        let mut received = 0;

        for index in 0..operations.len() {
            let read_follows = operations
                .get(index + 1..)
                .is_some_and(read_pending);
            let Some(op) = operations.get_mut(index) else {
                break;
            };
            let result = match op {
                Operation::Write(bytes) => self
                    .open(address, Direction::Write, &mut current)
                    .and_then(|()| self.write_all(bytes)),
                Operation::Read(buffer) => {
                    if current != Some(Direction::Read) {
                        received = 0;
                    }
                    self.open(address, Direction::Read, &mut current)
                        .and_then(|()| self.read_into(buffer, read_follows, &mut received))
                }
            };
            if let Err(err) = result {
                return (current.is_some(), Err(err));
            }
        }
        (current.is_some(), Ok(()))
    }

    /// (Repeated) start unless the bus is already open in `direction`.
    fn open(
        &mut self,
        address: SevenBitAddress,
        direction: Direction,
        current: &mut Option<Direction>,
    ) -> Result<(), Error> {
        if *current == Some(direction) {
            return Ok(());
        }
        let address = AddressByte::new(address, direction);
        let started = match current {
            None => self.hardware.start(address),
            Some(_) => self.hardware.repeated_start(address),
        };
        match started {
            Ok(()) => {
                *current = Some(direction);
                Ok(())
            }
            // a NAKed address still leaves the bus with us
            Err(NotAccessible::Nak) => {
                *current = Some(direction);
                Err(Error::AddressNak)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Error> {
        for &byte in bytes {
            self.hardware.write_byte(byte)?;
        }
        Ok(())
    }

    fn read_into(
        &mut self,
        buffer: &mut [u8],
        read_follows: bool,
        received: &mut usize,
    ) -> Result<(), Error> {
        if buffer.is_empty() && !read_follows && *received == 0 {
            // the first byte is already clocked in and must be NAKed
            self.check_fault()?;
            let _ = self.hardware.read_byte_nak();
            *received = 1;
            return self.check_fault();
        }

        let len = buffer.len();
        for (index, slot) in buffer.iter_mut().enumerate() {
            self.check_fault()?;
            *slot = if index + 1 == len && !read_follows {
                self.hardware.read_byte_nak()
            } else {
                self.hardware.read_byte_ack()
            };
            *received += 1;
        }
        self.check_fault()
    }

    fn check_fault(&self) -> Result<(), Error> {
        let status = self.hardware.status();
        if status.is_arbitration_lost() {
            Err(Error::ArbitrationLost)
        } else if status.is_bus_error() {
            Err(Error::BusError)
        } else {
            Ok(())
        }
    }
}

/// A non-empty read comes later in the same read run.
fn read_pending(rest: &[Operation<'_>]) -> bool {
    rest.iter()
        .take_while(|op| matches!(op, Operation::Read(_)))
        .any(|op| matches!(op, Operation::Read(buffer) if !buffer.is_empty()))
}

impl<H: TwiMaster, L: Logger> embedded_hal::i2c::ErrorType for I2cController<H, L> {
    type Error = Error;
}

impl<H: TwiMaster, L: Logger> embedded_hal::i2c::I2c for I2cController<H, L> {
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if address > 0x7F {
            return Err(Error::InvalidAddress);
        }

        let (opened, result) = self.run(address, operations);
        match result {
            Ok(()) if opened => self.hardware.stop(),
            Ok(()) => {}
            Err(err) => {
                self.logger
                    .error(format_args!("{:#04x}: transaction failed: {:?}", address, err));
                if opened && err.holds_bus() {
                    self.hardware.stop();
                }
            }
        }
        result
    }
}
