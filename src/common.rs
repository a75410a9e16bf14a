// Licensed under the Apache-2.0 license

//! Logging hooks shared by the drivers in this crate.
//!
//! Drivers take a `Logger` type parameter defaulting to [`NoOpLogger`], so a
//! build without a console pays nothing for the diagnostics.

use core::fmt::Arguments;

/// Sink for driver diagnostics.
pub trait Logger {
    fn debug(&mut self, args: Arguments<'_>);
    fn error(&mut self, args: Arguments<'_>);
}

/// Logger that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpLogger {}

impl Logger for NoOpLogger {
    fn debug(&mut self, _args: Arguments<'_>) {}
    fn error(&mut self, _args: Arguments<'_>) {}
}

/// Logger writing CRLF-terminated lines to a serial port.
///
/// Write errors are dropped: a failing console must never stall a bus
/// transaction.
pub struct UartLogger<W: embedded_io::Write> {
    uart: W,
}

impl<W: embedded_io::Write> UartLogger<W> {
    pub fn new(uart: W) -> Self {
        Self { uart }
    }

    /// Give the serial port back.
    pub fn release(self) -> W {
        self.uart
    }

    fn line(&mut self, level: &str, args: Arguments<'_>) {
        let _ = self.uart.write_all(level.as_bytes());
        let _ = self.uart.write_fmt(args);
        let _ = self.uart.write_all(b"\r\n");
    }
}

impl<W: embedded_io::Write> Logger for UartLogger<W> {
    fn debug(&mut self, args: Arguments<'_>) {
        self.line("[twi] ", args);
    }

    fn error(&mut self, args: Arguments<'_>) {
        self.line("[twi] error: ", args);
    }
}
