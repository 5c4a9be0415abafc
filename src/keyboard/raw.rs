
use bitflags::bitflags;

/// Command bytes a host issues to a keyboard-class device.
#[derive(Debug)]
pub struct FromHost;

impl FromHost {
    pub const SELECT_ALTERNATE_SCANCODES: u8 = 0xF0;
    pub const SET_STATUS_INDICATORS: u8 = 0xED;
    pub const SET_TYPEMATIC_RATE: u8 = 0xF3;
    pub const RESET: u8 = 0xFF;
}

/// Response bytes this device places on the bus.
#[derive(Debug)]
pub struct ToHost;

impl ToHost {
    pub const ACK: u8 = 0xFA;
    pub const RESEND: u8 = 0xFE;
    pub const BAT_COMPLETION_CODE: u8 = 0xAA;
}

bitflags! {
    pub struct StatusIndicators: u8 {
        const SCROLL_LOCK = 0b0000_0001;
        const NUM_LOCK = 0b0000_0010;
        const CAPS_LOCK = 0b0000_0100;
    }
}

pub const REPEAT_DELAYS_MS: [u16; 4] = [250, 500, 750, 1000];

pub const REPEAT_RATES_MS: [u16; 32] = [
    33, 37, 42, 45, 50, 55, 60, 66,
    75, 83, 90, 100, 111, 125, 142, 166,
    200, 250, 333, 400, 500, 666, 1000, 1250,
    1666, 2000, 2500, 3000, 3333, 4000, 5000, 6666,
];

/// Typematic configuration byte layout: bits 5-6 select the repeat delay,
/// bits 0-4 the repeat rate. Bit 7 is always zero.
pub const TYPEMATIC_DELAY_SHIFT: u8 = 5;
pub const TYPEMATIC_DELAY_MASK: u8 = 0b0000_0011;
pub const TYPEMATIC_RATE_MASK: u8 = 0b0001_1111;

/// Power-on typematic configuration: 500 ms delay, 100 ms repeat interval.
pub const DEFAULT_TYPEMATIC_CONFIG: u8 = 0b0010_1011;

/// Host settle time between a command's final clock pulse and the start of
/// the device's response frame.
pub const RESPONSE_GUARD_US: u32 = 800;

/// Indicator update time before the second acknowledge of 0xED and 0xF3.
pub const PARAMETER_SETTLE_MS: u32 = 10;

/// Basic assurance test time between the reset acknowledge and the
/// completion code.
pub const SELF_TEST_MS: u32 = 100;

/// Consecutive resend requests for bad-parity host frames before the
/// parity error propagates to the caller.
pub const PARITY_RESEND_LIMIT: u8 = 3;

/// Scan codes buffered while the bus is busy, as on real keyboards.
pub const SCANCODE_BUFFER_SIZE: usize = 16;
