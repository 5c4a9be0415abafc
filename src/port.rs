
//! Wire transport for the PS/2 device side.

pub mod framer;
pub mod io;
pub mod raw;

pub use framer::{Error, Port, WaitTarget};
