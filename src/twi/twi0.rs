// Licensed under the Apache-2.0 license

//! Memory-mapped TWI0 register block.
//!
//! The block is exposed through an owned [`Twi0`] handle that can be taken
//! once per program run. Holding the handle is what entitles a
//! [`BusMaster`](super::bus_master::BusMaster) to drive the peripheral.

use core::ptr::{addr_of, addr_of_mut, read_volatile, write_volatile};
use core::sync::atomic::{AtomicBool, Ordering};

use super::registers::TwiRegisters;

/// TWI0 base address on megaAVR 0-series (ATmega4809 and friends).
#[cfg(not(feature = "tinyavr"))]
pub const TWI0_BASE: usize = 0x08A0;
/// TWI0 base address on tinyAVR 0/1-series.
#[cfg(feature = "tinyavr")]
pub const TWI0_BASE: usize = 0x0810;

/// TWI register layout up to the master data register.
#[repr(C)]
pub struct RegisterBlock {
    pub ctrla: u8,
    pub dualctrl: u8,
    pub dbgctrl: u8,
    pub mctrla: u8,
    pub mctrlb: u8,
    pub mstatus: u8,
    pub mbaud: u8,
    pub maddr: u8,
    pub mdata: u8,
}

static TAKEN: AtomicBool = AtomicBool::new(false);

/// Exclusive handle to TWI0.
pub struct Twi0 {
    regs: *mut RegisterBlock,
}

impl Twi0 {
    /// Take the peripheral. Returns `None` if it was already taken.
    pub fn take() -> Option<Self> {
        critical_section::with(|_| {
            if TAKEN.load(Ordering::Relaxed) {
                None
            } else {
                TAKEN.store(true, Ordering::Relaxed);
                // SAFETY: the flag guarantees this is the only handle.
                Some(unsafe { Self::steal() })
            }
        })
    }

    /// Create a handle without checking ownership.
    ///
    /// # Safety
    ///
    /// The caller must ensure no other `Twi0` is in use, and that
    /// `TWI0_BASE` matches the target chip.
    #[must_use]
    pub unsafe fn steal() -> Self {
        Self {
            regs: TWI0_BASE as *mut RegisterBlock,
        }
    }
}

impl TwiRegisters for Twi0 {
    #[inline]
    fn write_ctrla(&mut self, value: u8) {
        // SAFETY: `regs` points at the TWI0 block for the life of the handle.
        unsafe { write_volatile(addr_of_mut!((*self.regs).ctrla), value) }
    }

    #[inline]
    fn write_mctrla(&mut self, value: u8) {
        unsafe { write_volatile(addr_of_mut!((*self.regs).mctrla), value) }
    }

    #[inline]
    fn read_mctrlb(&self) -> u8 {
        unsafe { read_volatile(addr_of!((*self.regs).mctrlb)) }
    }

    #[inline]
    fn write_mctrlb(&mut self, value: u8) {
        unsafe { write_volatile(addr_of_mut!((*self.regs).mctrlb), value) }
    }

    #[inline]
    fn read_mstatus(&self) -> u8 {
        unsafe { read_volatile(addr_of!((*self.regs).mstatus)) }
    }

    #[inline]
    fn write_mstatus(&mut self, value: u8) {
        unsafe { write_volatile(addr_of_mut!((*self.regs).mstatus), value) }
    }

    #[inline]
    fn write_mbaud(&mut self, value: u8) {
        unsafe { write_volatile(addr_of_mut!((*self.regs).mbaud), value) }
    }

    #[inline]
    fn write_maddr(&mut self, value: u8) {
        unsafe { write_volatile(addr_of_mut!((*self.regs).maddr), value) }
    }

    #[inline]
    fn read_mdata(&mut self) -> u8 {
        unsafe { read_volatile(addr_of!((*self.regs).mdata)) }
    }

    #[inline]
    fn write_mdata(&mut self, value: u8) {
        unsafe { write_volatile(addr_of_mut!((*self.regs).mdata), value) }
    }
}
