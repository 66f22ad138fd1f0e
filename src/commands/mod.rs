//! Command-line subcommands

pub mod convert;
pub mod inspect;
pub mod preview;

use anyhow::{anyhow, Result};
use gxwriter_core::Window;

/// Parse a window given as `x0,y0,x1,y1`.
pub fn parse_window(value: &str) -> Result<Window> {
    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<u32>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| anyhow!("Invalid window '{}': {}", value, e))?;
    match parts.as_slice() {
        &[start_x, start_y, end_x, end_y] => Ok(Window::new(start_x, start_y, end_x, end_y)),
        _ => Err(anyhow!(
            "Invalid window '{}': expected four values x0,y0,x1,y1",
            value
        )),
    }
}
