// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: Copyright 2026 m328-beacon contributors
//
//! End-to-end beacon cycle test over scripted register windows.
//!
//! Both peripheral fakes journal into one shared event log, so the test
//! can check ordering across the serial port and the timer: each message
//! goes out contiguously, and the timer is started and stopped between
//! transmissions.

use std::cell::RefCell;
use std::rc::Rc;

use m328_beacon::CPU_HZ;
use m328_beacon::beacon::{Beacon, MESSAGE, PRESCALER};
use m328_beacon::mmio::Registers;
use m328_beacon::timer1::{TCCR1B, TCNT1H, TCNT1L, Timer1};
use m328_beacon::usart::{Status, UCSR0A, UDR0, Usart};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Event {
    /// A byte written to the USART data register.
    Data(u8),
    /// A value written to the timer clock-select register.
    TimerControl(u8),
}

type Journal = Rc<RefCell<Vec<Event>>>;

/// USART0 window that always reports data-register-empty and journals
/// every transmitted byte.
struct UsartWindow {
    journal: Journal,
}

impl Registers for UsartWindow {
    fn read(&mut self, offset: u8) -> u8 {
        if offset == UCSR0A {
            return Status::DATA_EMPTY.bits();
        }
        0
    }

    fn write(&mut self, offset: u8, value: u8) {
        if offset == UDR0 {
            self.journal.borrow_mut().push(Event::Data(value));
        }
    }
}

/// Timer1 window with a counter that advances a fixed amount per 16-bit
/// read, so every delay terminates after a handful of polls.
struct TimerWindow {
    journal: Journal,
    value: u16,
    latched: u16,
}

const COUNTS_PER_READ: u16 = 4000;

impl Registers for TimerWindow {
    fn read(&mut self, offset: u8) -> u8 {
        match offset {
            TCNT1L => {
                self.latched = self.value;
                self.value = self.value.wrapping_add(COUNTS_PER_READ);
                self.latched.to_le_bytes()[0]
            }
            TCNT1H => self.latched.to_le_bytes()[1],
            _ => 0,
        }
    }

    fn write(&mut self, offset: u8, value: u8) {
        match offset {
            TCCR1B => {
                self.journal.borrow_mut().push(Event::TimerControl(value));
            }
            TCNT1L | TCNT1H => self.value = 0,
            _ => {}
        }
    }
}

fn scripted_beacon(journal: &Journal) -> Beacon<UsartWindow, TimerWindow> {
    let usart = Usart::new(UsartWindow {
        journal: Rc::clone(journal),
    });
    let timer = Timer1::new(
        TimerWindow {
            journal: Rc::clone(journal),
            value: 0,
            latched: 0,
        },
        CPU_HZ,
        PRESCALER,
        1000,
    );
    Beacon::new(usart, timer)
}

#[test]
fn three_cycles_transmit_three_messages_with_timer_brackets() {
    let journal: Journal = Rc::new(RefCell::new(Vec::new()));
    let mut beacon = scripted_beacon(&journal);

    beacon.configure();
    assert!(
        journal.borrow().is_empty(),
        "configuration must not transmit or start the timer"
    );

    for _ in 0..3 {
        beacon.step();
    }

    let events = journal.borrow();

    // The serial output is the message three times, nothing else.
    let transmitted: Vec<u8> = events
        .iter()
        .filter_map(|event| match event {
            Event::Data(byte) => Some(*byte),
            _ => None,
        })
        .collect();
    assert_eq!(transmitted, MESSAGE.as_bytes().repeat(3));

    // Cycles do not interleave: each message is contiguous, followed by a
    // timer start (non-zero clock select) and a timer stop (zero).
    let mut expected = Vec::new();
    for _ in 0..3 {
        expected.extend(MESSAGE.bytes().map(Event::Data));
        expected.push(Event::TimerControl(PRESCALER.bits()));
        expected.push(Event::TimerControl(0));
    }
    assert_eq!(*events, expected);
}
