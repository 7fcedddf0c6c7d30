use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "ancast",
    about = "Build an Ancast boot image from a stage-0 loader and an ELF payload"
)]
pub struct Args {
    /// Stage-0 loader binary (carries its own internal header)
    pub loader: PathBuf,

    /// ELF payload spliced into the image
    pub elf: PathBuf,

    /// Output image path
    pub output: PathBuf,

    /// "true" (case-insensitive) selects the hybrid MBR variant
    pub hybrid: String,

    /// Encrypt the body with the fixed development key
    #[arg(long)]
    pub encrypt: bool,

    /// Verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl Args {
    /// The hybrid selector is a boolean-valued word to stay compatible
    /// with existing build scripts; anything other than "true" means the
    /// standard variant.
    pub fn is_hybrid(&self) -> bool {
        self.hybrid.eq_ignore_ascii_case("true")
    }
}
