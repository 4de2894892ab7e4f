// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: Copyright 2026 m328-beacon contributors
//
//! USART0 transmit driver for ATmega328P-class microcontrollers
//!
//! Provides blocking, polled serial output. There is no receive path, no
//! interrupt use, and no TX buffering; every byte is handed to the
//! hardware only after the data register reports empty.
//!
//! # Usage
//!
//! Configure the port once, then transmit:
//!
//! ```ignore
//! use m328_beacon::usart::{Usart, baud_divisor};
//! use m328_beacon::CPU_HZ;
//!
//! let mut usart = unsafe { Usart::usart0() };
//! usart.configure(baud_divisor(CPU_HZ, 9600));
//! usart.transmit_str("boot\r\n");
//! ```
//!
//! # Hardware Details
//!
//! USART0 registers live in a 7-byte window at base `0xC0`:
//!
//! - UCSR0A (0x00): status; UDRE0 (bit 5) means the data register can
//!   accept a byte, TXC0 (bit 6) means the shift register has drained.
//! - UCSR0B (0x01): control; TXEN0 (bit 3) enables the transmitter and
//!   takes over the TXD pin.
//! - UCSR0C (0x02): frame format; UCSZ01:UCSZ00 (bits 2:1) select the
//!   character size, USBS0 (bit 3) the stop-bit count, UPM01:UPM00
//!   (bits 5:4) the parity mode. All zero except UCSZ01|UCSZ00 gives 8N1.
//! - UBRR0L/UBRR0H (0x04/0x05): 12-bit baud-rate divisor. The frequency
//!   on the wire is `CPU_HZ / (16 * (divisor + 1))`.
//! - UDR0 (0x06): transmit data register. Writing it while UDRE0 is clear
//!   is undefined per the datasheet; [`Usart::transmit_byte`] never does.
//!
//! # Clock Configuration
//!
//! The divisor is computed as `round(CPU_HZ / (16 * baud)) - 1`. At 16 MHz
//! and 9600 baud that is 103. A divisor outside the 12-bit field would
//! silently produce the wrong baud rate; [`baud_divisor`] rejects it at
//! compile time when evaluated in const context.
//!
//! # Failure Modes
//!
//! None of the failures here are observable to software: a wrong divisor
//! garbles output on the wire, and a transmitter that never reports ready
//! parks [`Usart::transmit_byte`] in its polling loop until an external
//! reset. There is deliberately no timeout.

use crate::mmio::{Mmio, Registers};
use bitflags::bitflags;

// ============================================================================
// Constants
// ============================================================================

/// USART0 register window base address.
pub const USART0_BASE: usize = 0xC0;

/// UCSR0A register offset (control and status A).
pub const UCSR0A: u8 = 0x00;
/// UCSR0B register offset (control and status B).
pub const UCSR0B: u8 = 0x01;
/// UCSR0C register offset (frame format).
pub const UCSR0C: u8 = 0x02;
/// UBRR0L register offset (baud divisor, low byte).
pub const UBRR0L: u8 = 0x04;
/// UBRR0H register offset (baud divisor, high byte).
pub const UBRR0H: u8 = 0x05;
/// UDR0 register offset (transmit data).
pub const UDR0: u8 = 0x06;

/// Widest divisor the 12-bit UBRR0 field can hold.
const UBRR_MAX: u32 = 0x0FFF;

bitflags! {
    /// UCSR0A status bits used by the transmit path.
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct Status: u8 {
        /// UDRE0: transmit data register empty.
        const DATA_EMPTY = 1 << 5;
        /// TXC0: frame shifted out and no new data pending. Cleared by
        /// writing a one to this bit position.
        const TX_COMPLETE = 1 << 6;
    }

    /// UCSR0B control bits used by the transmit path.
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct Control: u8 {
        /// TXEN0: transmitter enable.
        const TX_ENABLE = 1 << 3;
    }

    /// UCSR0C frame-format bits.
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct Frame: u8 {
        /// UCSZ00: character size, low select bit.
        const CHAR_SIZE_0 = 1 << 1;
        /// UCSZ01: character size, high select bit.
        const CHAR_SIZE_1 = 1 << 2;
        /// USBS0: two stop bits when set.
        const STOP_2 = 1 << 3;
        /// UPM00: parity mode, low select bit.
        const PARITY_0 = 1 << 4;
        /// UPM01: parity mode, high select bit.
        const PARITY_1 = 1 << 5;
    }
}

/// 8 data bits, no parity, 1 stop bit.
pub const FRAME_8N1: Frame = Frame::CHAR_SIZE_1.union(Frame::CHAR_SIZE_0);

/// Compute the UBRR0 divisor for a baud rate.
///
/// `divisor = round(cpu_hz / (16 * baud)) - 1`. The result must fit the
/// 12-bit UBRR0 field; used in const context, a divisor that does not fit
/// fails the build instead of silently running at the wrong rate.
pub const fn baud_divisor(cpu_hz: u32, baud: u32) -> u16 {
    let per_bit = 16 * baud;
    let divisor = (cpu_hz + per_bit / 2) / per_bit - 1;
    assert!(divisor <= UBRR_MAX, "baud divisor exceeds the UBRR0 field");
    divisor as u16
}

// ============================================================================
// Driver
// ============================================================================

/// Polled transmit-only handle for one USART peripheral.
///
/// Generic over [`Registers`] so the identical polling sequences run
/// against hardware or against scripted windows in tests.
pub struct Usart<R: Registers> {
    regs: R,
}

impl Usart<Mmio> {
    /// USART0 bound to its fixed register window.
    ///
    /// # Safety
    ///
    /// Call at most once. The returned handle assumes exclusive ownership
    /// of the USART0 registers.
    pub const unsafe fn usart0() -> Self {
        Self {
            regs: unsafe { Mmio::new(USART0_BASE) },
        }
    }
}

impl<R: Registers> Usart<R> {
    /// Wrap a register window in a driver handle.
    pub const fn new(regs: R) -> Self {
        Self { regs }
    }

    /// Program the baud divisor, enable the transmitter, and select the
    /// 8N1 frame.
    ///
    /// Must run before the first transmit. Reconfiguring with the same
    /// divisor leaves the register state unchanged. There is no error
    /// path: the hardware gives no feedback on a bad divisor.
    pub fn configure(&mut self, divisor: u16) {
        self.regs.write(UBRR0H, (divisor >> 8) as u8);
        self.regs.write(UBRR0L, divisor as u8);
        self.regs.write(UCSR0B, Control::TX_ENABLE.bits());
        self.regs.write(UCSR0C, FRAME_8N1.bits());
    }

    /// Transmit one byte, spinning until the data register is empty.
    ///
    /// Blocks forever if the peripheral never reports ready (for example
    /// when the port was never configured). Recovery from that state is
    /// an external reset, not a software path.
    pub fn transmit_byte(&mut self, byte: u8) {
        while self.regs.read(UCSR0A) & Status::DATA_EMPTY.bits() == 0 {}
        self.regs.write(UDR0, byte);
    }

    /// Transmit a byte slice in order.
    ///
    /// An empty slice produces no register traffic.
    pub fn transmit(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.transmit_byte(byte);
        }
    }

    /// Transmit the UTF-8 bytes of a string slice.
    pub fn transmit_str(&mut self, s: &str) {
        self.transmit(s.as_bytes());
    }

    /// Spin until the last frame has fully left the shift register, then
    /// clear the transmit-complete flag.
    ///
    /// Only meaningful after at least one byte has been transmitted; the
    /// hardware never sets TXC0 on an idle port.
    pub fn flush(&mut self) {
        while self.regs.read(UCSR0A) & Status::TX_COMPLETE.bits() == 0 {}
        // TXC0 is cleared by writing a one to it
        self.regs.write(UCSR0A, Status::TX_COMPLETE.bits());
    }
}

impl<R: Registers> core::fmt::Write for Usart<R> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.transmit_str(s);
        Ok(())
    }
}

impl<R: Registers> embedded_io::ErrorType for Usart<R> {
    type Error = core::convert::Infallible;
}

impl<R: Registers> embedded_io::Write for Usart<R> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.transmit(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Usart::flush(self);
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
