use planr::{bm_info, bm_to_bmp, bm_to_png, overlay, Palette};
use std::path::{Path, PathBuf};
use tracing::{info, Level};

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};

#[cfg(not(debug_assertions))]
const DEFAULT_DEBUG_LEVEL: u8 = 1;
#[cfg(debug_assertions)]
const DEFAULT_DEBUG_LEVEL: u8 = 99;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Turn debugging information on
    #[arg(short, long, default_value_t = DEFAULT_DEBUG_LEVEL, action = clap::ArgAction::Count)]
    verbosity: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// prints the header and plane layout of a .bm file
    Info {
        /// The .bm file
        bm_file: PathBuf,
    },

    /// converts a .bm file to an 8-bit indexed BMP image
    Bmp {
        /// The .bm file
        bm_file: PathBuf,

        /// Comma separated 12-bit colors (e.g. 0x000,0xf00). Defaults to a grey ramp
        #[arg(short, long)]
        palette: Option<Palette>,

        /// The output file name
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// converts a .bm file to a PNG image
    Png {
        /// The .bm file
        bm_file: PathBuf,

        /// Comma separated 12-bit colors (e.g. 0x000,0xf00). Defaults to a grey ramp
        #[arg(short, long)]
        palette: Option<Palette>,

        /// The output file name
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// loads a .bm file onto another one and saves the result
    Overlay {
        /// The .bm file to draw onto
        base_file: PathBuf,
        /// The .bm file to draw
        top_file: PathBuf,
        /// Left edge of the drawn file, rounded down to a multiple of 8
        #[arg(short, default_value_t = 0)]
        x: u16,
        /// Top edge of the drawn file
        #[arg(short, default_value_t = 0)]
        y: u16,
        /// The output file name
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn output_or_default(input: &Path, output: Option<PathBuf>, suffix: &str) -> Result<PathBuf> {
    if let Some(o) = output {
        return Ok(o);
    }
    let mut output = PathBuf::new();
    let Some(dir) = input.parent() else {
        bail!("Invalid bm file");
    };
    let Some(Some(filename)) = input.file_stem().map(|os| os.to_str()) else {
        bail!("Invalid bm file");
    };
    output.push(dir);
    output.push(format!("{}.{}", filename, suffix));
    info!("output name: {}", output.display());
    Ok(output)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbosity {
        0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        3 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_file(true)
        .with_line_number(true)
        .init();

    match cli.command {
        Commands::Info { bm_file } => {
            println!("{}", bm_info(&bm_file)?);
        }
        Commands::Bmp {
            bm_file,
            palette,
            output,
        } => {
            let output = output_or_default(&bm_file, output, "bmp")?;
            bm_to_bmp(&bm_file, palette, &output)?;
        }
        Commands::Png {
            bm_file,
            palette,
            output,
        } => {
            let output = output_or_default(&bm_file, output, "png")?;
            bm_to_png(&bm_file, palette, &output)?;
        }
        Commands::Overlay {
            base_file,
            top_file,
            x,
            y,
            output,
        } => {
            overlay(&base_file, &top_file, x, y, &output)?;
        }
    }
    Ok(())
}
