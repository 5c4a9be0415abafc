
//! Bit and byte framing over the line pair.
//!
//! Every transfer is an 11-bit frame: start bit (low), 8 data bits
//! LSB-first, odd parity, stop bit (high). The device generates the clock
//! for both directions; the host only ever pulls the clock low to inhibit
//! the bus or request a transfer.

use core::fmt;

use super::io::{Direction, Level, Line, LineIO};
use super::raw::*;

/// Line state a bounded wait was polling for when it expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitTarget {
    /// Clock and data both high before a device-to-host frame.
    BusIdle,
    /// Clock released high at the start of a host-to-device frame.
    ClockRelease,
    /// Clock and data both high before the acknowledgment pulse.
    BusSettle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A line did not reach the polled state within [`WAIT_BUDGET_US`].
    Timeout(WaitTarget),
    /// A host frame failed odd parity. The sampled byte is kept so the
    /// caller can log it before requesting a resend.
    Parity { received: u8 },
}

/// Device end of the PS/2 line pair.
pub struct Port<T: LineIO> {
    lines: T,
}

impl <T: LineIO> fmt::Debug for Port<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Port")
    }
}

impl <T: LineIO> Port<T> {
    /// Takes ownership of the lines and enters listen posture.
    pub fn new(lines: T) -> Self {
        let mut port = Port { lines };
        port.set_listen_mode();
        port
    }

    /// Both lines high impedance. The host controls the bus.
    pub fn set_listen_mode(&mut self) {
        self.lines.set_direction(Line::Data, Direction::Input);
        self.lines.set_direction(Line::Clock, Direction::Input);
    }

    /// Both lines released high, then driven by this device.
    pub fn set_send_mode(&mut self) {
        self.lines.set_level(Line::Data, Level::High);
        self.lines.set_level(Line::Clock, Level::High);
        self.lines.set_direction(Line::Data, Direction::Output);
        self.lines.set_direction(Line::Clock, Direction::Output);
    }

    /// `true` while the host holds the data line low to request a transfer.
    pub fn available(&mut self) -> bool {
        !self.lines.level(Line::Data).is_high()
    }

    /// Clocks one device-to-host frame onto the bus.
    ///
    /// Waits for the bus to be idle first; a host inhibit (clock held low)
    /// longer than the wait budget fails with `Timeout(BusIdle)` before
    /// any bit is driven.
    pub fn send_byte(&mut self, byte: u8) -> Result<(), Error> {
        self.wait_until(WaitTarget::BusIdle, |lines| {
            lines.level(Line::Clock).is_high() && lines.level(Line::Data).is_high()
        })?;
        self.set_send_mode();

        self.send_bit(false);

        let mut parity = true;
        let mut bits = byte;
        for _ in 0..8 {
            let bit = bits & 1 != 0;
            self.send_bit(bit);
            parity ^= bit;
            bits >>= 1;
        }
        self.send_bit(parity);
        self.send_bit(true);

        self.lines.set_level(Line::Clock, Level::High);
        self.lines.set_level(Line::Data, Level::High);
        self.set_listen_mode();
        Ok(())
    }

    /// Clocks one host-to-device frame off the bus and acknowledges it.
    ///
    /// Call after [`available`](Port::available) reports a host request;
    /// the transfer starts as soon as the host has released the clock.
    pub fn read_byte(&mut self) -> Result<u8, Error> {
        self.wait_until(WaitTarget::ClockRelease, |lines| {
            lines.level(Line::Clock).is_high()
        })?;
        self.lines.delay_us(REQUEST_SETTLE_US);

        // Take clock ownership. The host keeps supplying data bits against
        // this device-generated clock.
        self.lines.set_level(Line::Clock, Level::High);
        self.lines.set_direction(Line::Clock, Direction::Output);

        let mut byte = 0u8;
        let mut parity = true;
        for i in 0..8 {
            if self.read_bit_with_clock() {
                byte |= 1 << i;
                parity = !parity;
            }
        }
        let parity_bit = self.read_bit_with_clock();
        // Stop bit. Sampled to complete the frame, not validated.
        self.read_bit_with_clock();

        self.wait_until(WaitTarget::BusSettle, |lines| {
            lines.level(Line::Clock).is_high() && lines.level(Line::Data).is_high()
        })?;

        // Acknowledgment of receipt: data held low during one clock pulse.
        self.lines.set_direction(Line::Data, Direction::Output);
        self.lines.set_level(Line::Data, Level::Low);
        self.clock_pulse();

        self.lines.set_level(Line::Data, Level::High);
        self.lines.set_level(Line::Clock, Level::High);
        self.set_listen_mode();

        if parity_bit != parity {
            return Err(Error::Parity { received: byte });
        }

        Ok(byte)
    }

    pub fn lines_mut(&mut self) -> &mut T {
        &mut self.lines
    }

    pub fn release(self) -> T {
        self.lines
    }

    fn wait_until<F>(&mut self, target: WaitTarget, mut ready: F) -> Result<(), Error>
    where
        F: FnMut(&mut T) -> bool,
    {
        for _ in 0..WAIT_BUDGET_US / WAIT_POLL_US {
            if ready(&mut self.lines) {
                return Ok(());
            }
            self.lines.delay_us(WAIT_POLL_US);
        }
        Err(Error::Timeout(target))
    }

    fn send_bit(&mut self, bit: bool) {
        let level = if bit { Level::High } else { Level::Low };
        self.lines.set_level(Line::Data, level);
        self.lines.delay_us(BIT_SETUP_US);
        self.lines.set_level(Line::Clock, Level::Low);
        self.lines.delay_us(CLOCK_FULL_US);
        self.lines.set_level(Line::Clock, Level::High);
        self.lines.delay_us(BIT_HOLD_US);
    }

    fn clock_pulse(&mut self) {
        self.lines.delay_us(CLOCK_HALF_US);
        self.lines.set_level(Line::Clock, Level::Low);
        self.lines.delay_us(CLOCK_FULL_US);
        self.lines.set_level(Line::Clock, Level::High);
        self.lines.delay_us(CLOCK_HALF_US);
    }

    fn read_bit_with_clock(&mut self) -> bool {
        self.clock_pulse();
        self.lines.level(Line::Data).is_high()
    }
}
