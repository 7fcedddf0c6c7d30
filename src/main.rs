mod cli;
mod crypto;
mod error;
mod header;
mod image;
mod loader;
mod payload;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use cli::Args;
use crypto::BodyCipher;
use header::AncastVariant;

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .format_timestamp(None)
        .format_target(false)
        .init();

    let loader_data = std::fs::read(&args.loader)
        .with_context(|| format!("Failed to read loader from {:?}", args.loader))?;
    let elf = std::fs::read(&args.elf)
        .with_context(|| format!("Failed to read ELF from {:?}", args.elf))?;

    let variant = if args.is_hybrid() {
        AncastVariant::HybridMbr
    } else {
        AncastVariant::Standard
    };
    let cipher = if args.encrypt {
        BodyCipher::Aes128Cbc
    } else {
        BodyCipher::Plain
    };

    let data = image::build(&loader_data, &elf, variant, cipher)?;

    std::fs::write(&args.output, &data)
        .with_context(|| format!("Failed to write image to {:?}", args.output))?;
    info!("Wrote 0x{:X} bytes to {:?}.", data.len(), args.output);

    Ok(())
}
