
//! Protocol-mandated wire timing.
//!
//! These values are fixed by the PS/2 electrical specification and the
//! tolerance of real host controllers. They are not tunable.

/// Half of the device-generated clock period.
pub const CLOCK_HALF_US: u32 = 20;
/// Low phase of a device-generated clock pulse.
pub const CLOCK_FULL_US: u32 = 40;

/// Data line setup time before the falling clock edge of a sent bit.
pub const BIT_SETUP_US: u32 = 10;
/// Clock high time after a sent bit.
pub const BIT_HOLD_US: u32 = 30;

/// Settle time after the host releases the clock to request a transfer.
pub const REQUEST_SETTLE_US: u32 = 100;

/// Budget for every wait on a line state, polled at [`WAIT_POLL_US`] steps.
pub const WAIT_BUDGET_US: u32 = 30_000;
/// Poll interval inside line-state wait loops.
pub const WAIT_POLL_US: u32 = 1;
