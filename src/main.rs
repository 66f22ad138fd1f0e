//! GXWriter CLI
//!
//! # Commands
//!
//! - `gxwriter convert` - Wrap a G-code file in a GX container
//! - `gxwriter preview` - Print the M4010 preview commands for an image
//! - `gxwriter inspect` - Show the header of a GX file

use anyhow::Result;
use clap::{Parser, Subcommand};
use gxwriter::commands::{convert, inspect, preview};
use gxwriter::init_logging;
use gxwriter_core::MimeRegistry;

/// GXWriter - GX container writer for slicer G-code
#[derive(Parser)]
#[command(name = "gxwriter")]
#[command(about = "Wrap slicer G-code in the GX (xgcode 1.0) container")]
#[command(version, long_version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATE"), ")"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Wrap a G-code file in a GX container
    Convert(convert::ConvertArgs),

    /// Print the M4010 preview commands for an image
    Preview(preview::PreviewArgs),

    /// Show the header of a GX file
    Inspect(inspect::InspectArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    // File types are registered once, before any conversion runs
    let registry = MimeRegistry::with_gx();

    match cli.command {
        Commands::Convert(args) => {
            let outcome = convert::execute(args, &registry)?;
            let form = if outcome.container { "GX container" } else { "plain G-code (fallback)" };
            println!(
                "Wrote {} bytes to {} as {}",
                outcome.bytes_written,
                outcome.output.display(),
                form
            );
            if let Some(path) = outcome.preview_commands {
                println!("Preview commands written to {}", path.display());
            }
            Ok(())
        }
        Commands::Preview(args) => {
            print!("{}", preview::execute(args)?);
            Ok(())
        }
        Commands::Inspect(args) => {
            print!("{}", inspect::execute(args)?);
            Ok(())
        }
    }
}
