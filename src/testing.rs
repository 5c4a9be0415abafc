
//! Scripted line pair that plays the host side of the bus.
//!
//! The mock records every direction, level, and delay operation, supplies
//! host-to-device frames bit by bit against the device-generated falling
//! clock edges, and decodes device-to-host frames with its own reference
//! implementation of the 11-bit frame format.

use std::collections::VecDeque;
use std::vec::Vec;

use crate::port::io::{Direction, Level, Line, LineIO};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Event {
    Direction(Line, Direction),
    Level(Line, Level),
    DelayUs(u32),
    DelayMs(u32),
}

#[derive(Debug)]
struct HostFrame {
    byte: u8,
    bits: [bool; 8],
    parity: bool,
    resend: bool,
}

impl HostFrame {
    fn new(byte: u8, corrupt: bool) -> Self {
        let mut bits = [false; 8];
        let mut parity = true;
        for (i, bit) in bits.iter_mut().enumerate() {
            *bit = byte & (1 << i) != 0;
            if *bit {
                parity = !parity;
            }
        }
        if corrupt {
            parity = !parity;
        }
        HostFrame {
            byte,
            bits,
            parity,
            resend: corrupt,
        }
    }
}

#[derive(Debug)]
pub(crate) struct MockLines {
    /// Every state-changing operation the device performed, in order.
    pub events: Vec<Event>,
    /// Clock levels returned for the next input-mode clock reads. When
    /// exhausted, reads fall back to [`clock_idle`](MockLines::clock_idle).
    pub clock_script: VecDeque<Level>,
    /// Steady-state clock level seen while the device listens.
    pub clock_idle: Level,
    /// Number of upcoming host frames delivered with inverted parity.
    /// A corrupted frame is requeued, so a later re-read sees it intact.
    pub corrupt_next: usize,
    /// Host frames the device completed with an acknowledgment pulse.
    pub host_frames_acknowledged: usize,
    host_queue: VecDeque<u8>,
    rts_armed: bool,
    rx: Option<HostFrame>,
    rx_edges: u8,
    sent_bits: Vec<bool>,
    clock_dir: Direction,
    data_dir: Direction,
    clock_out: Level,
    data_out: Level,
}

impl MockLines {
    pub fn new() -> Self {
        MockLines {
            events: Vec::new(),
            clock_script: VecDeque::new(),
            clock_idle: Level::High,
            corrupt_next: 0,
            host_frames_acknowledged: 0,
            host_queue: VecDeque::new(),
            rts_armed: false,
            rx: None,
            rx_edges: 0,
            sent_bits: Vec::new(),
            clock_dir: Direction::Input,
            data_dir: Direction::Input,
            clock_out: Level::High,
            data_out: Level::High,
        }
    }

    /// Queues bytes for the host to send and asserts its request (data
    /// line low) until the first frame starts clocking.
    pub fn host_sends(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.host_queue.push_back(byte);
        }
        self.rts_armed = true;
    }

    /// Device-to-host frames seen so far, decoded with a reference
    /// implementation of the frame format. Panics on a malformed frame.
    pub fn sent_bytes(&self) -> Vec<u8> {
        assert_eq!(
            self.sent_bits.len() % 11,
            0,
            "incomplete device frame on the wire"
        );
        self.sent_bits
            .chunks(11)
            .map(|frame| {
                assert!(!frame[0], "start bit must be low");
                assert!(frame[10], "stop bit must be high");
                let mut byte = 0u8;
                let mut parity = true;
                for (i, &bit) in frame[1..9].iter().enumerate() {
                    if bit {
                        byte |= 1 << i;
                        parity = !parity;
                    }
                }
                assert_eq!(frame[9], parity, "frame parity must be odd");
                byte
            })
            .collect()
    }

    pub fn direction(&self, line: Line) -> Direction {
        match line {
            Line::Clock => self.clock_dir,
            Line::Data => self.data_dir,
        }
    }

    /// Last level the device drove onto the line.
    pub fn driven_level(&self, line: Line) -> Level {
        match line {
            Line::Clock => self.clock_out,
            Line::Data => self.data_out,
        }
    }

    fn on_falling_clock_edge(&mut self) {
        if self.rx.is_some() {
            if self.rx_edges < 10 {
                self.rx_edges += 1;
            } else {
                // Eleventh edge: the acknowledgment pulse.
                let frame = self.rx.take().unwrap();
                if frame.resend {
                    self.host_queue.push_front(frame.byte);
                }
                self.rx_edges = 0;
                self.host_frames_acknowledged += 1;
            }
        } else if self.data_dir == Direction::Input && !self.host_queue.is_empty() {
            let byte = self.host_queue.pop_front().unwrap();
            let corrupt = self.corrupt_next > 0;
            if corrupt {
                self.corrupt_next -= 1;
            }
            self.rts_armed = false;
            self.rx = Some(HostFrame::new(byte, corrupt));
            self.rx_edges = 1;
        } else if self.data_dir == Direction::Output {
            self.sent_bits.push(self.data_out.is_high());
        }
    }
}

impl LineIO for MockLines {
    fn set_direction(&mut self, line: Line, direction: Direction) {
        self.events.push(Event::Direction(line, direction));
        match line {
            Line::Clock => self.clock_dir = direction,
            Line::Data => self.data_dir = direction,
        }
    }

    fn set_level(&mut self, line: Line, level: Level) {
        self.events.push(Event::Level(line, level));
        match line {
            Line::Clock => {
                let falling = self.clock_out.is_high() && !level.is_high();
                self.clock_out = level;
                if falling {
                    self.on_falling_clock_edge();
                }
            }
            Line::Data => self.data_out = level,
        }
    }

    fn level(&mut self, line: Line) -> Level {
        match line {
            Line::Clock => match self.clock_dir {
                Direction::Output => self.clock_out,
                Direction::Input => self
                    .clock_script
                    .pop_front()
                    .unwrap_or(self.clock_idle),
            },
            Line::Data => match self.data_dir {
                Direction::Output => self.data_out,
                Direction::Input => {
                    if let Some(frame) = &self.rx {
                        // The device samples after each pulse: edges 1-8
                        // expose the data bits, edge 9 the parity bit, and
                        // edge 10 the stop bit.
                        let bit = match self.rx_edges {
                            1..=8 => frame.bits[usize::from(self.rx_edges) - 1],
                            9 => frame.parity,
                            _ => true,
                        };
                        if bit {
                            Level::High
                        } else {
                            Level::Low
                        }
                    } else if self.rts_armed && !self.host_queue.is_empty() {
                        Level::Low
                    } else {
                        Level::High
                    }
                }
            },
        }
    }

    fn delay_us(&mut self, us: u32) {
        self.events.push(Event::DelayUs(us));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.events.push(Event::DelayMs(ms));
    }
}
