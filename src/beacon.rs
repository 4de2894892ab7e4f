// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: Copyright 2026 m328-beacon contributors
//
//! The beacon loop: transmit a fixed message, wait one second, repeat
//!
//! This is the whole application. The port is configured exactly once,
//! then the loop alternates between two states, transmitting and waiting,
//! with no exit condition and no state carried across iterations. The
//! device runs until power-off or reset.

use crate::CPU_HZ;
use crate::mmio::{Mmio, Registers};
use crate::timer1::{Prescaler, Timer1};
use crate::usart::{Usart, baud_divisor};

/// The message on the wire, repeated every interval.
pub const MESSAGE: &str = "Hello from UART\r\n";

/// Serial line rate.
pub const BAUD: u32 = 9600;

/// Pause between transmissions.
pub const INTERVAL_MS: u32 = 1000;

/// Counter prescale for the interval timer. At 16 MHz the /1024 tap ticks
/// at 15625 Hz, so the one-second interval is an exact tick count.
pub const PRESCALER: Prescaler = Prescaler::Div1024;

/// UBRR0 divisor for [`BAUD`], checked against the register width at
/// compile time.
pub const BAUD_DIVISOR: u16 = baud_divisor(CPU_HZ, BAUD);

/// The transmit-then-wait loop over one serial port and one timer.
pub struct Beacon<U: Registers, T: Registers> {
    usart: Usart<U>,
    timer: Timer1<T>,
}

impl Beacon<Mmio, Mmio> {
    /// Beacon over the real USART0 and Timer1 register windows.
    ///
    /// # Safety
    ///
    /// Call at most once; the handle owns both peripherals.
    pub const unsafe fn hardware() -> Self {
        Self {
            usart: unsafe { Usart::usart0() },
            timer: unsafe { Timer1::timer1(CPU_HZ, PRESCALER, INTERVAL_MS) },
        }
    }
}

impl<U: Registers, T: Registers> Beacon<U, T> {
    /// Build a beacon from already-constructed peripheral handles.
    pub const fn new(usart: Usart<U>, timer: Timer1<T>) -> Self {
        Self { usart, timer }
    }

    /// One-time port setup. Must run before the first [`Beacon::step`].
    pub fn configure(&mut self) {
        self.usart.configure(BAUD_DIVISOR);
    }

    /// One cycle: transmit the message, then block for one interval.
    pub fn step(&mut self) {
        self.usart.transmit_str(MESSAGE);
        self.timer.delay();
    }

    /// Configure the port once, then cycle forever.
    pub fn run(mut self) -> ! {
        self.configure();
        loop {
            self.step();
        }
    }
}
