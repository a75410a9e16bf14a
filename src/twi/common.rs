// Licensed under the Apache-2.0 license

//! Common types and constants for the TWI driver modules.
//!
//! This module provides shared definitions for bus results, addressing and
//! the clock configuration consumed at initialization.

use fugit::HertzU32;

/// Host clock assumed when none is configured.
pub const DEFAULT_CPU_CLOCK: HertzU32 = HertzU32::Hz(4_000_000);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u32)]
pub enum TwiSpeed {
    Standard = 100_000,
    Fast = 400_000,
    FastPlus = 1_000_000,
}

impl TwiSpeed {
    #[must_use]
    pub const fn frequency(self) -> HertzU32 {
        HertzU32::Hz(self as u32)
    }
}

/// Bus timeout used by the controller to fall back to idle when SCL/SDA
/// stay high (MCTRLA.TIMEOUT).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum BusTimeout {
    #[default]
    Disabled = 0,
    Us50 = 1,
    Us100 = 2,
    Us200 = 3,
}

/// Data direction carried in bit 0 of the address byte.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Direction {
    Write = 0,
    Read = 1,
}

/// 7-bit slave address packed with the R/W bit, as written to MADDR.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AddressByte(u8);

impl AddressByte {
    /// Address `address` for writing. Bit 7 of `address` is discarded.
    #[must_use]
    pub const fn write(address: u8) -> Self {
        Self::new(address, Direction::Write)
    }

    /// Address `address` for reading. Bit 7 of `address` is discarded.
    #[must_use]
    pub const fn read(address: u8) -> Self {
        Self::new(address, Direction::Read)
    }

    #[must_use]
    pub const fn new(address: u8, direction: Direction) -> Self {
        Self((address << 1) | direction as u8)
    }

    /// The 7-bit slave address.
    #[must_use]
    pub const fn address(self) -> u8 {
        self.0 >> 1
    }

    #[must_use]
    pub const fn direction(self) -> Direction {
        if self.0 & 0x01 == 0 {
            Direction::Write
        } else {
            Direction::Read
        }
    }

    /// The raw value transmitted after the start condition.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }
}

/// Raw address+direction byte, e.g. `0xA0` / `0xA1` for an EEPROM at 0x50.
impl From<u8> for AddressByte {
    fn from(raw: u8) -> Self {
        Self(raw)
    }
}

/// The address phase failed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NotAccessible {
    /// No slave acknowledged the address.
    Nak,
    /// Another master won the bus.
    ArbitrationLost,
    /// Illegal start/stop condition seen on the bus.
    BusError,
}

/// A data byte was not accepted.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NotAcknowledged {
    /// The slave answered with NAK.
    Nak,
    ArbitrationLost,
    BusError,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigurationError {
    /// The divisor would exceed the 8-bit MBAUD register.
    ClockTooSlow,
    /// The host clock cannot produce the requested bus clock.
    ClockTooFast,
}

/// Compute MBAUD for a host clock and bus clock, both in Hz.
///
/// `MBAUD = f_cpu / (2 * f_scl) - 5`, rise time neglected. Returns `None`
/// when the result does not fit the register.
#[must_use]
pub const fn baud_divisor(cpu_hz: u32, scl_hz: u32) -> Option<u8> {
    if scl_hz == 0 {
        return None;
    }
    let half_period = cpu_hz / scl_hz.saturating_mul(2);
    if half_period < 5 || half_period - 5 > u8::MAX as u32 {
        return None;
    }
    Some((half_period - 5) as u8)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TwiConfig {
    pub cpu_clock: HertzU32,
    pub scl: HertzU32,
    pub bus_timeout: BusTimeout,
    /// Value programmed into MBAUD.
    pub baud: u8,
}

impl TwiConfig {
    /// Fast-mode Plus drive strength is needed above 400 kHz.
    #[must_use]
    pub fn fast_mode_plus(&self) -> bool {
        self.scl.to_Hz() > TwiSpeed::Fast as u32
    }
}

impl Default for TwiConfig {
    fn default() -> Self {
        Self {
            cpu_clock: DEFAULT_CPU_CLOCK,
            scl: TwiSpeed::Standard.frequency(),
            bus_timeout: BusTimeout::Disabled,
            // 4 MHz / (2 * 100 kHz) - 5
            baud: 15,
        }
    }
}

pub struct TwiConfigBuilder {
    cpu_clock: HertzU32,
    scl: HertzU32,
    bus_timeout: BusTimeout,
}

impl Default for TwiConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TwiConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cpu_clock: DEFAULT_CPU_CLOCK,
            scl: TwiSpeed::Standard.frequency(),
            bus_timeout: BusTimeout::Disabled,
        }
    }
    #[must_use]
    pub fn cpu_clock(mut self, clock: HertzU32) -> Self {
        self.cpu_clock = clock;
        self
    }
    #[must_use]
    pub fn speed(mut self, speed: TwiSpeed) -> Self {
        self.scl = speed.frequency();
        self
    }
    #[must_use]
    pub fn scl_frequency(mut self, scl: HertzU32) -> Self {
        self.scl = scl;
        self
    }
    #[must_use]
    pub fn bus_timeout(mut self, timeout: BusTimeout) -> Self {
        self.bus_timeout = timeout;
        self
    }

    /// # Errors
    ///
    /// Returns `ConfigurationError` if the bus clock cannot be derived from
    /// the host clock with an 8-bit divisor.
    pub fn build(self) -> Result<TwiConfig, ConfigurationError> {
        let cpu_hz = self.cpu_clock.to_Hz();
        let scl_hz = self.scl.to_Hz();
        let baud = match baud_divisor(cpu_hz, scl_hz) {
            Some(baud) => baud,
            None if scl_hz == 0 || cpu_hz / scl_hz.saturating_mul(2) > 5 => {
                return Err(ConfigurationError::ClockTooSlow)
            }
            None => return Err(ConfigurationError::ClockTooFast),
        };
        Ok(TwiConfig {
            cpu_clock: self.cpu_clock,
            scl: self.scl,
            bus_timeout: self.bus_timeout,
            baud,
        })
    }
}
