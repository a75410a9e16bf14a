// Licensed under the Apache-2.0 license

//! TWI master driver module.
//!
//! This module provides a blocking master-mode driver for the two-wire
//! interface of megaAVR 0-series and tinyAVR 0/1-series parts, for bare-metal
//! and `no_std` environments. Layers, bottom-up:
//!
//! - [`registers`]: the register-level boundary and typed status decoding
//! - [`twi0`]: the memory-mapped TWI0 register block
//! - [`bus_master`]: bus primitives (start, stop, byte transfers)
//! - [`i2c_controller`]: `embedded_hal::i2c::I2c` on top of the primitives

pub mod bus_master;
pub mod common;
pub mod i2c_controller;
pub mod registers;
pub mod traits;
pub mod twi0;


pub use bus_master::BusMaster;
pub use common::{
    baud_divisor, AddressByte, BusTimeout, ConfigurationError, Direction, NotAccessible,
    NotAcknowledged, TwiConfig, TwiConfigBuilder, TwiSpeed,
};
pub use i2c_controller::{Error, I2cController};
pub use registers::{BusState, Command, Status, TwiRegisters};
pub use traits::TwiMaster;
pub use twi0::Twi0;
