// Licensed under the Apache-2.0 license

//! Blocking TWI bus master.
//!
//! [`BusMaster`] owns one register set and sequences the bus protocol against
//! it: flush and address for a (repeated) start, byte transfers with ACK
//! detection, stop. Each primitive spins on MSTATUS until the controller has
//! finished the step. There is no timeout anywhere in this module; a stuck
//! controller or a slave that never answers hangs the caller, so pair the
//! driver with a watchdog where that matters.
//!
//! Callers must check every `start` and `write_byte` result before issuing
//! further data-phase operations.

use crate::common::{Logger, NoOpLogger};
use crate::twi::common::{AddressByte, NotAccessible, NotAcknowledged, TwiConfig};
use crate::twi::registers::{
    BusState, Command, Status, TwiRegisters, CTRLA_FMPEN, MCTRLA_ENABLE, MCTRLA_TIMEOUT_SHIFT,
    MCTRLB_FLUSH,
};
use crate::twi::traits::TwiMaster;

pub struct BusMaster<R: TwiRegisters, L: Logger = NoOpLogger> {
    regs: R,
    config: TwiConfig,
    logger: L,
}

impl<R: TwiRegisters> BusMaster<R, NoOpLogger> {
    pub fn new(regs: R, config: TwiConfig) -> Self {
        Self::with_logger(regs, config, NoOpLogger {})
    }
}

impl<R: TwiRegisters, L: Logger> BusMaster<R, L> {
    pub fn with_logger(regs: R, config: TwiConfig, logger: L) -> Self {
        Self {
            regs,
            config,
            logger,
        }
    }

    #[must_use]
    pub fn config(&self) -> &TwiConfig {
        &self.config
    }

    /// Give the register set back, e.g. to hand the peripheral to another
    /// driver.
    pub fn release(self) -> R {
        self.regs
    }

    /// Enable master mode, with the write and read interrupts left disabled,
    /// and force the bus state to idle.
    ///
    /// Calling it again re-arms the controller from scratch.
    pub fn init(&mut self) {
        let ctrla = if self.config.fast_mode_plus() {
            CTRLA_FMPEN
        } else {
            0
        };
        self.regs.write_ctrla(ctrla);
        self.regs.write_mbaud(self.config.baud);
        self.regs
            .write_mctrla(MCTRLA_ENABLE | ((self.config.bus_timeout as u8) << MCTRLA_TIMEOUT_SHIFT));
        self.regs.write_mstatus(BusState::Idle.bits());
        self.logger.debug(format_args!(
            "master enabled, baud={} scl={}Hz",
            self.config.baud,
            self.config.scl.to_Hz()
        ));
    }

    /// Issue a start condition and send `address`.
    ///
    /// Waits for the address phase to finish. Arbitration loss and bus errors
    /// take precedence over the ACK bit; their flags are left set for the
    /// caller to inspect through [`status`](Self::status), and the next
    /// `start` flushes them.
    ///
    /// # Errors
    ///
    /// Returns the reason the slave is not accessible.
    pub fn start(&mut self, address: impl Into<AddressByte>) -> Result<(), NotAccessible> {
        let address = address.into();
        let mctrlb = self.regs.read_mctrlb();
        self.regs.write_mctrlb(mctrlb | MCTRLB_FLUSH);
        self.regs.write_maddr(address.bits());

        let status = self.wait_for(|s| s.is_write_complete() || s.is_read_complete());
        if status.is_arbitration_lost() {
            self.logger
                .error(format_args!("{:#04x}: arbitration lost", address.bits()));
            return Err(NotAccessible::ArbitrationLost);
        }
        if status.is_bus_error() {
            self.logger
                .error(format_args!("{:#04x}: bus error", address.bits()));
            return Err(NotAccessible::BusError);
        }
        if status.is_acknowledged() {
            Ok(())
        } else {
            Err(NotAccessible::Nak)
        }
    }

    /// Issue a repeated start inside an open transaction.
    ///
    /// The controller emits a repeated start instead of a start on its own
    /// while it owns the bus, so this is [`start`](Self::start).
    ///
    /// # Errors
    ///
    /// See [`start`](Self::start).
    pub fn repeated_start(&mut self, address: impl Into<AddressByte>) -> Result<(), NotAccessible> {
        self.start(address)
    }

    /// ACK polling: keep addressing the slave until it answers.
    ///
    /// Meant for devices that NAK while busy internally, such as an EEPROM
    /// finishing a page write. After each failed attempt the bus is released
    /// (stop if this master still owns it) and the loop waits for idle.
    ///
    /// This never returns for a slave that never acknowledges. Use
    /// [`start_with_retry_limit`](Self::start_with_retry_limit) when that is
    /// not acceptable.
    pub fn start_with_retry(&mut self, address: impl Into<AddressByte>) {
        let address = address.into();
        let mut attempts: u32 = 1;
        while self.start(address).is_err() {
            self.release_after_failed_start();
            attempts = attempts.saturating_add(1);
        }
        if attempts > 1 {
            self.logger.debug(format_args!(
                "{:#04x}: accessible after {} attempts",
                address.bits(),
                attempts
            ));
        }
    }

    /// ACK polling with at most `max_attempts` starts (at least one).
    ///
    /// The bus is released when giving up.
    ///
    /// # Errors
    ///
    /// Returns the failure of the last attempt.
    pub fn start_with_retry_limit(
        &mut self,
        address: impl Into<AddressByte>,
        max_attempts: u32,
    ) -> Result<u32, NotAccessible> {
        let address = address.into();
        let max_attempts = max_attempts.max(1);
        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.start(address) {
                Ok(()) => return Ok(attempts),
                Err(err) => {
                    self.release_after_failed_start();
                    if attempts >= max_attempts {
                        self.logger.error(format_args!(
                            "{:#04x}: not accessible after {} attempts",
                            address.bits(),
                            attempts
                        ));
                        return Err(err);
                    }
                }
            }
        }
    }

    /// Issue a stop condition and wait until the bus is released.
    ///
    /// Only meaningful inside an open transaction; without one the outcome
    /// depends on the hardware.
    pub fn stop(&mut self) {
        self.regs.write_mctrlb(Command::Stop.bits());
        self.wait_for(Status::is_idle);
    }

    /// Send one byte to the addressed slave.
    ///
    /// # Errors
    ///
    /// Returns `NotAcknowledged` when the slave NAKs the byte or the bus
    /// faults during the transfer. Nothing is retried.
    pub fn write_byte(&mut self, data: u8) -> Result<(), NotAcknowledged> {
        self.regs.write_mdata(data);
        let status = self.wait_for(Status::is_write_complete);
        if status.is_arbitration_lost() {
            self.logger.error(format_args!("write: arbitration lost"));
            Err(NotAcknowledged::ArbitrationLost)
        } else if status.is_bus_error() {
            self.logger.error(format_args!("write: bus error"));
            Err(NotAcknowledged::BusError)
        } else if status.is_acknowledged() {
            Ok(())
        } else {
            self.logger.debug(format_args!("write: {:#04x} not acknowledged", data));
            Err(NotAcknowledged::Nak)
        }
    }

    /// Read one byte and ACK it, asking the slave for more.
    pub fn read_byte_ack(&mut self) -> u8 {
        self.read_byte(Command::ReceiveAck)
    }

    /// Read one byte and NAK it, ending the read. Usually followed by
    /// [`stop`](Self::stop).
    pub fn read_byte_nak(&mut self) -> u8 {
        self.read_byte(Command::ReceiveNak)
    }

    #[must_use]
    pub fn status(&self) -> Status {
        Status::from_bits(self.regs.read_mstatus())
    }

    // Waits for RIF, or for a fault: a lost bus never delivers RIF. The fault
    // stays visible in `status()`.
    fn read_byte(&mut self, command: Command) -> u8 {
        let status = self.wait_for(|s| s.is_read_complete() || s.is_fault());
        if status.is_fault() {
            self.logger
                .error(format_args!("read: bus fault, status={:#04x}", status.bits()));
        }
        let data = self.regs.read_mdata();
        self.regs.write_mctrlb(command.bits());
        data
    }

    fn release_after_failed_start(&mut self) {
        // after an address NAK the bus stays owned and never goes idle alone
        if self.status().bus_state() == BusState::Owner {
            self.stop();
        } else {
            self.wait_for(Status::is_idle);
        }
    }

    /// Spin until `done` holds. Unbounded.
    fn wait_for(&self, done: impl Fn(Status) -> bool) -> Status {
        loop {
            let status = self.status();
            if done(status) {
                return status;
            }
            core::hint::spin_loop();
        }
    }
}

impl<R: TwiRegisters, L: Logger> TwiMaster for BusMaster<R, L> {
    fn init(&mut self) {
        BusMaster::init(self);
    }

    fn start(&mut self, address: AddressByte) -> Result<(), NotAccessible> {
        BusMaster::start(self, address)
    }

    fn start_with_retry(&mut self, address: AddressByte) {
        BusMaster::start_with_retry(self, address);
    }

    fn stop(&mut self) {
        BusMaster::stop(self);
    }

    fn write_byte(&mut self, data: u8) -> Result<(), NotAcknowledged> {
        BusMaster::write_byte(self, data)
    }

    fn read_byte_ack(&mut self) -> u8 {
        BusMaster::read_byte_ack(self)
    }

    fn read_byte_nak(&mut self) -> u8 {
        BusMaster::read_byte_nak(self)
    }

    fn status(&self) -> Status {
        BusMaster::status(self)
    }
}
