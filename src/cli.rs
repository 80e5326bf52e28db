use clap::Parser;
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "dns-inspect")]
#[command(about = "Decode a DNS message from its wire format", long_about = None)]
pub struct Args {
    /// File holding one DNS message; stdin when absent or `-`
    pub input: Option<PathBuf>,

    /// Treat the input as hex text instead of raw bytes
    #[arg(long)]
    pub hex: bool,

    /// Log more detail (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Path to read from, or `None` for stdin.
    pub fn input(&self) -> Option<&PathBuf> {
        self.input.as_ref().filter(|path| path.as_os_str() != "-")
    }

    pub fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}
