
use core::fmt;

use arraydeque::{ArrayDeque, Saturating};
use log::{debug, warn};

use crate::port::framer::{Error, Port};
use crate::port::io::LineIO;

use super::raw::*;

/// The scan code type-ahead buffer is full.
#[derive(Debug)]
pub struct ScancodeBufferFull;

/// Device side of a PS/2 keyboard: executes host commands over a
/// [`Port`] and owns the configuration state they mutate.
pub struct Keyboard<T: LineIO> {
    port: Port<T>,
    scancodes: ArrayDeque<[u8; SCANCODE_BUFFER_SIZE], Saturating>,
    led_status: u8,
    repeat_delay_ms: u16,
    repeat_rate_ms: u16,
}

impl <T: LineIO> fmt::Debug for Keyboard<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Keyboard")
    }
}

impl <T: LineIO> Keyboard<T> {
    /// Enters listen posture with all indicators off and the protocol
    /// default typematic configuration.
    pub fn new(lines: T) -> Self {
        let mut keyboard = Keyboard {
            port: Port::new(lines),
            scancodes: ArrayDeque::new(),
            led_status: 0,
            repeat_delay_ms: 0,
            repeat_rate_ms: 0,
        };

        keyboard.set_repeat_times(DEFAULT_TYPEMATIC_CONFIG);
        keyboard
    }

    /// Reads one command byte from the host, runs the matching
    /// acknowledge sequence, and returns the raw command byte.
    ///
    /// Unrecognized commands are acknowledged and otherwise ignored, so
    /// the host never stalls waiting for a response.
    pub fn execute_command(&mut self) -> Result<u8, Error> {
        let command = self.read_host_byte()?;
        debug!("host command {:#04x}", command);

        match command {
            FromHost::RESET => {
                self.send_ack()?;
                self.port.lines_mut().delay_ms(SELF_TEST_MS);
                self.port.send_byte(ToHost::BAT_COMPLETION_CODE)?;
            }
            FromHost::SELECT_ALTERNATE_SCANCODES => {
                self.send_ack()?;
                // Scan code generation is the caller's concern, so the
                // requested set is surfaced in the log only.
                let set = self.read_host_byte()?;
                debug!("host selected scan code set {}", set);
                self.send_ack()?;
            }
            FromHost::SET_STATUS_INDICATORS => {
                self.send_ack()?;
                self.led_status = self.read_host_byte()?;
                self.port.lines_mut().delay_ms(PARAMETER_SETTLE_MS);
                self.send_ack()?;
            }
            FromHost::SET_TYPEMATIC_RATE => {
                self.send_ack()?;
                let config = self.read_host_byte()?;
                self.port.lines_mut().delay_ms(PARAMETER_SETTLE_MS);
                self.send_ack()?;
                self.set_repeat_times(config);
            }
            _ => {
                debug!("acknowledging unrecognized command {:#04x}", command);
                self.send_ack()?;
            }
        }

        Ok(command)
    }

    /// Buffers a scan code for [`poll`](Keyboard::poll) to send once the
    /// bus is free.
    pub fn queue_scancode(&mut self, scancode: u8) -> Result<(), ScancodeBufferFull> {
        self.scancodes
            .push_back(scancode)
            .map_err(|_| ScancodeBufferFull)
    }

    /// Services the bus once. A pending host request is executed first
    /// and its command byte returned; otherwise buffered scan codes are
    /// flushed until the buffer is empty or the host requests the bus.
    ///
    /// A scan code leaves the buffer only after its frame went out, so a
    /// failed send is retried on the next call.
    pub fn poll(&mut self) -> Result<Option<u8>, Error> {
        if self.port.available() {
            return self.execute_command().map(Some);
        }

        while let Some(&scancode) = self.scancodes.front() {
            if self.port.available() {
                break;
            }
            self.port.send_byte(scancode)?;
            self.scancodes.pop_front();
        }

        Ok(None)
    }

    /// Decodes a typematic configuration byte into the repeat delay and
    /// rate tables. Indices outside the tables fall back to entry 0,
    /// although the bit masks make that unreachable.
    pub fn set_repeat_times(&mut self, config: u8) {
        let delay_index = usize::from((config >> TYPEMATIC_DELAY_SHIFT) & TYPEMATIC_DELAY_MASK);
        let rate_index = usize::from(config & TYPEMATIC_RATE_MASK);

        self.repeat_delay_ms = REPEAT_DELAYS_MS
            .get(delay_index)
            .copied()
            .unwrap_or(REPEAT_DELAYS_MS[0]);
        self.repeat_rate_ms = REPEAT_RATES_MS
            .get(rate_index)
            .copied()
            .unwrap_or(REPEAT_RATES_MS[0]);
    }

    pub fn repeat_delay_ms(&self) -> u16 {
        self.repeat_delay_ms
    }

    pub fn repeat_rate_ms(&self) -> u16 {
        self.repeat_rate_ms
    }

    /// Raw indicator byte from the last 0xED command.
    pub fn led_status(&self) -> u8 {
        self.led_status
    }

    pub fn status_indicators(&self) -> StatusIndicators {
        StatusIndicators::from_bits_truncate(self.led_status)
    }

    pub fn queued_scancodes(&self) -> usize {
        self.scancodes.len()
    }

    pub fn available(&mut self) -> bool {
        self.port.available()
    }

    pub fn set_listen_mode(&mut self) {
        self.port.set_listen_mode()
    }

    pub fn set_send_mode(&mut self) {
        self.port.set_send_mode()
    }

    pub fn send_byte(&mut self, byte: u8) -> Result<(), Error> {
        self.port.send_byte(byte)
    }

    pub fn read_byte(&mut self) -> Result<u8, Error> {
        self.port.read_byte()
    }

    pub fn port_mut(&mut self) -> &mut Port<T> {
        &mut self.port
    }

    pub fn lines_mut(&mut self) -> &mut T {
        self.port.lines_mut()
    }

    pub fn release(self) -> T {
        self.port.release()
    }

    /// Reads one host byte, answering bad-parity frames with a resend
    /// request up to [`PARITY_RESEND_LIMIT`] times.
    fn read_host_byte(&mut self) -> Result<u8, Error> {
        let mut resends = 0;
        loop {
            match self.port.read_byte() {
                Err(Error::Parity { received }) if resends < PARITY_RESEND_LIMIT => {
                    resends += 1;
                    warn!("bad parity on {:#04x} from host, requesting resend", received);
                    self.port.lines_mut().delay_us(RESPONSE_GUARD_US);
                    self.port.send_byte(ToHost::RESEND)?;
                }
                result => return result,
            }
        }
    }

    fn send_ack(&mut self) -> Result<(), Error> {
        self.port.lines_mut().delay_us(RESPONSE_GUARD_US);
        self.port.send_byte(ToHost::ACK)
    }
}
