//! # DSP
//!
//! - **`delay_line`**: per-channel ring buffers and write cursors. Pure
//!   storage; it never decides what to read.
//!
//! - **`engine`**: turns a delay time into a sample count and runs the
//!   read / mix / write / advance loop over a block, in place.

pub mod delay_line;
pub mod engine;
