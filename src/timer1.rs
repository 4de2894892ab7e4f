// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: Copyright 2026 m328-beacon contributors
//
//! Timer/Counter1 busy-wait interval driver
//!
//! Timer1 is the 16-bit free-running counter. This driver uses it for one
//! thing: blocking for a fixed wall-clock interval by starting the counter
//! from zero and spinning until it reaches a precomputed tick threshold.
//! No interrupts, no output compare, no waveform generation.
//!
//! # Registers
//!
//! Timer1 registers live in a window at base `0x80`:
//!
//! - TCCR1A (0x00): waveform control. Left at its reset value of zero
//!   (normal mode), so this driver never touches it.
//! - TCCR1B (0x01): clock select in CS12:CS10 (bits 2:0). Zero stops the
//!   counter; the five running encodings divide the system clock by 1, 8,
//!   64, 256, or 1024.
//! - TCNT1L/TCNT1H (0x04/0x05): the 16-bit counter. Reads go low byte
//!   first (the low-byte read latches the high byte); writes go high byte
//!   first.
//!
//! # Tick Arithmetic
//!
//! `threshold = cpu_hz / prescaler_divisor * interval / 1000`. At 16 MHz
//! with the /1024 prescaler the counter ticks at 15625 Hz, so a 1000 ms
//! interval is exactly 15625 ticks with zero rounding error. Other
//! clock/prescaler/interval combinations may not divide evenly; the
//! truncated threshold then undershoots the interval slightly on every
//! call, which accumulates as drift in a repeating loop.

use crate::mmio::{Mmio, Registers};

// ============================================================================
// Constants
// ============================================================================

/// Timer1 register window base address.
pub const TIMER1_BASE: usize = 0x80;

/// TCCR1B register offset (clock select).
pub const TCCR1B: u8 = 0x01;
/// TCNT1L register offset (counter low byte).
pub const TCNT1L: u8 = 0x04;
/// TCNT1H register offset (counter high byte).
pub const TCNT1H: u8 = 0x05;

/// Clock-select encodings for TCCR1B bits CS12:CS10.
///
/// Writing a variant's bits starts the counter at the system clock divided
/// by [`Prescaler::divisor`]; writing zero stops it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Prescaler {
    /// CS = 0b001, counter runs at the system clock.
    Div1 = 0b001,
    /// CS = 0b010, system clock / 8.
    Div8 = 0b010,
    /// CS = 0b011, system clock / 64.
    Div64 = 0b011,
    /// CS = 0b100, system clock / 256.
    Div256 = 0b100,
    /// CS = 0b101, system clock / 1024.
    Div1024 = 0b101,
}

impl Prescaler {
    /// The factor the system clock is divided by before the counter.
    pub const fn divisor(self) -> u32 {
        match self {
            Prescaler::Div1 => 1,
            Prescaler::Div8 => 8,
            Prescaler::Div64 => 64,
            Prescaler::Div256 => 256,
            Prescaler::Div1024 => 1024,
        }
    }

    /// The TCCR1B clock-select bit pattern.
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// Counter ticks corresponding to a millisecond interval.
///
/// Truncates when the combination does not divide evenly. The result must
/// fit the 16-bit counter and be non-zero; used in const context, an
/// interval the counter cannot express fails the build.
pub const fn ticks_for(cpu_hz: u32, select: Prescaler, interval_ms: u32) -> u16 {
    let tick_hz = cpu_hz / select.divisor();
    let ticks = tick_hz as u64 * interval_ms as u64 / 1000;
    assert!(
        ticks > 0 && ticks <= u16::MAX as u64,
        "interval does not fit the 16-bit counter at this prescale"
    );
    ticks as u16
}

// ============================================================================
// Driver
// ============================================================================

/// Fixed-interval busy-wait handle for Timer1.
///
/// The prescaler selection and tick threshold are computed once at
/// construction; every [`Timer1::delay`] call waits the same interval.
pub struct Timer1<R: Registers> {
    regs: R,
    select: Prescaler,
    threshold: u16,
}

impl Timer1<Mmio> {
    /// Timer1 bound to its fixed register window.
    ///
    /// # Safety
    ///
    /// Call at most once. The returned handle assumes exclusive ownership
    /// of the Timer1 registers.
    pub const unsafe fn timer1(
        cpu_hz: u32,
        select: Prescaler,
        interval_ms: u32,
    ) -> Self {
        Self::new(unsafe { Mmio::new(TIMER1_BASE) }, cpu_hz, select, interval_ms)
    }
}

impl<R: Registers> Timer1<R> {
    /// Wrap a register window in an interval handle.
    pub const fn new(
        regs: R,
        cpu_hz: u32,
        select: Prescaler,
        interval_ms: u32,
    ) -> Self {
        Self {
            regs,
            select,
            threshold: ticks_for(cpu_hz, select, interval_ms),
        }
    }

    /// Block for one interval.
    ///
    /// Zeroes the counter, starts it at the configured prescale, spins
    /// until the first read at or above the threshold, then stops the
    /// clock. Monopolizes the CPU for the whole interval; there is nothing
    /// else for this firmware to run.
    pub fn delay(&mut self) {
        // 16-bit writes go high byte first
        self.regs.write(TCNT1H, 0);
        self.regs.write(TCNT1L, 0);
        self.regs.write(TCCR1B, self.select.bits());
        while self.read_counter() < self.threshold {}
        self.regs.write(TCCR1B, 0);
    }

    /// Read the 16-bit counter, low byte first so the hardware latches a
    /// coherent high byte.
    fn read_counter(&mut self) -> u16 {
        let lo = self.regs.read(TCNT1L);
        let hi = self.regs.read(TCNT1H);
        u16::from_le_bytes([lo, hi])
    }
}

// ============================================================================
// Tests
// ============================================================================
