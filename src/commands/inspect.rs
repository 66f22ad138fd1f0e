//! Inspect command - show the header of a GX file

use anyhow::{Context, Result};
use clap::Args;
use gxwriter_core::ContainerHeader;
use std::fmt::Write;
use std::path::PathBuf;

/// Arguments for the inspect command
#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    /// GX file to read
    pub file: PathBuf,
}

/// Execute the inspect command, returning a printable summary
pub fn execute(args: InspectArgs) -> Result<String> {
    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let header = ContainerHeader::parse(&bytes)
        .with_context(|| format!("{} is not a GX file", args.file.display()))?;
    let payload = bytes.len().saturating_sub(header.payload_offset as usize);
    Ok(summarize(&header, payload)?)
}

fn summarize(header: &ContainerHeader, payload: usize) -> std::result::Result<String, std::fmt::Error> {
    let c = &header.constants;
    let mut out = String::new();
    writeln!(out, "bitmap offset:      {}", header.bitmap_offset)?;
    writeln!(out, "gcode offset:       {}", header.payload_offset)?;
    writeln!(out, "gcode bytes:        {}", payload)?;
    writeln!(out, "print time:         {} s", header.print_time_seconds)?;
    writeln!(out, "filament (right):   {} cm", header.filament_right)?;
    writeln!(out, "filament (left):    {} cm", header.filament_left)?;
    writeln!(out, "layer height:       {} um", header.layer_height_microns)?;
    writeln!(out, "extruder type:      {}", c.multi_extruder_type)?;
    writeln!(out, "perimeter shells:   {}", c.perimeter_shells)?;
    writeln!(out, "print speed:        {} mm/s", c.print_speed)?;
    writeln!(out, "platform temp:      {} C", c.platform_temperature)?;
    writeln!(out, "right extruder:     {} C", c.right_extruder_temperature)?;
    writeln!(out, "left extruder:      {} C", c.left_extruder_temperature)?;
    Ok(out)
}
