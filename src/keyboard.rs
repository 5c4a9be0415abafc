
//! Keyboard-class device behavior: host command handling and device
//! configuration state.

pub mod driver;
pub mod raw;

pub use driver::{Keyboard, ScancodeBufferFull};
