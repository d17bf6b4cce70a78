//! Heatmap colour ramp
//!
//! High contrast 16 step false-colour scale, dark blue through red to white,
//! as xterm-256 background colours.

use crossterm::style::{Color, SetBackgroundColor};

pub const RAMP: [u8; 16] = [17, 19, 20, 32, 37, 40, 46, 82, 156, 226, 214, 202, 213, 201, 196, 15];
pub const RAMP_SIZE: usize = RAMP.len();

/// Magnitude class of a counter delta: its bit length, clamped to the ramp
///
/// `0` for any delta ≤ 0, `floor(log2(delta)) + 1` otherwise.
#[must_use]
pub fn quantize(delta: i64) -> usize {
    if delta <= 0 {
        return 0;
    }
    let bits = (u64::BITS - delta.unsigned_abs().leading_zeros()) as usize;
    bits.min(RAMP_SIZE - 1)
}

/// Background colour command for a magnitude class
#[must_use]
pub fn background(class: usize) -> SetBackgroundColor {
    SetBackgroundColor(Color::AnsiValue(RAMP[class.min(RAMP_SIZE - 1)]))
}
