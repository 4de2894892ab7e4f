// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: Copyright 2026 m328-beacon contributors
//
#![no_std]
#![no_main]
extern crate m328_beacon;

use m328_beacon::beacon::Beacon;

/// Firmware entry point for the serial beacon.
///
/// Binds the drivers to the real USART0 and Timer1 register windows and
/// runs the transmit-then-wait loop forever: "Hello from UART\r\n" at
/// 9600 baud 8N1, once a second. The panic handler comes from the library
/// (panic-halt on bare-metal targets).
///
/// Build against an ATmega328P-class target and link this file as the
/// image's main; the reset vector should land here.
#[unsafe(no_mangle)]
pub extern "C" fn main() -> ! {
    // Sole owner of both peripherals; nothing else runs.
    let beacon = unsafe { Beacon::hardware() };
    beacon.run()
}
