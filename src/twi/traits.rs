// Licensed under the Apache-2.0 license

//! # TWI master primitives
//!
//! [`TwiMaster`] names the byte-level transaction steps a blocking master
//! offers. Higher layers such as
//! [`I2cController`](super::i2c_controller::I2cController) are written
//! against it rather than against a concrete register block.
//!
//! ```text
//! Idle ──start──▶ AddressPhase ──Ok──▶ DataPhase ──stop──▶ Idle
//!                      │                 │  ▲
//!                      └──Err──▶ Idle    └──┘ write_byte / read_byte_ack / read_byte_nak
//! ```
//!
//! Every step blocks until the controller reports completion.

use crate::twi::common::{AddressByte, NotAccessible, NotAcknowledged};
use crate::twi::registers::Status;

pub trait TwiMaster {
    /// Enable the controller in master mode and force the bus state to idle.
    fn init(&mut self);

    /// Send a start condition followed by `address`.
    ///
    /// # Errors
    ///
    /// Returns `NotAccessible` if the address was not acknowledged, the bus
    /// was lost to another master or a bus error occurred.
    fn start(&mut self, address: AddressByte) -> Result<(), NotAccessible>;

    /// Same as [`start`](Self::start), issued while a transaction is open.
    ///
    /// # Errors
    ///
    /// See [`start`](Self::start).
    fn repeated_start(&mut self, address: AddressByte) -> Result<(), NotAccessible> {
        self.start(address)
    }

    /// ACK polling: repeat `start` until the slave answers. Never fails and
    /// never gives up.
    fn start_with_retry(&mut self, address: AddressByte);

    /// Send a stop condition and wait for the bus to be released.
    fn stop(&mut self);

    /// Clock one byte out to the addressed slave.
    ///
    /// # Errors
    ///
    /// Returns `NotAcknowledged` if the slave rejected the byte or the bus
    /// faulted.
    fn write_byte(&mut self, data: u8) -> Result<(), NotAcknowledged>;

    /// Take a received byte and ask for another.
    fn read_byte_ack(&mut self) -> u8;

    /// Take a received byte and tell the slave it was the last one.
    fn read_byte_nak(&mut self) -> u8;

    /// Current controller status.
    fn status(&self) -> Status;
}
