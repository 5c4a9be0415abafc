
//! Device-side driver for the PS/2 keyboard protocol.
//!
//! Emulates the keyboard end of the two-wire PS/2 bus on top of a small
//! GPIO trait: frames bytes onto the clock and data lines with
//! device-generated timing, receives host commands, and answers them with
//! the acknowledge sequences a real keyboard produces.
//!
//! # Reference material
//! * <http://classiccomputers.info/down/IBM_PS2/documents/PS2_Hardware_Interface_Technical_Reference_May88.pdf>
//!     * PDF page 175
//! * <https://wiki.osdev.org/PS/2_Keyboard>

#![no_std]
#![forbid(missing_debug_implementations)]

#[cfg(test)]
extern crate std;

pub mod keyboard;
pub mod port;

#[cfg(test)]
pub(crate) mod testing;
