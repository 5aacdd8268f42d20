//! uartboot CLI - push a firmware image to a UART page-write bootloader.
//!
//! Thin wrapper around the `uartboot` library: parses arguments, opens the
//! serial port, reads the image file and renders a progress bar. All
//! protocol logic lives in the library.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use console::style;
use env_logger::Env;
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use uartboot::{FlowControl, SerialSettings, SerialTransport, Session, SessionConfig};

/// uartboot - program a binary image over a UART bootloader.
///
/// Environment variables:
///   UARTBOOT_PORT   - Default serial port
///   UARTBOOT_BAUD   - Default baud rate (default: 115200)
#[derive(Parser)]
#[command(name = "uartboot")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Serial port to use (COMx or /dev/ttyXXX).
    #[arg(short, long, env = "UARTBOOT_PORT")]
    port: String,

    /// Binary image to program.
    #[arg(short, long)]
    file: PathBuf,

    /// Baud rate.
    #[arg(short, long, default_value = "115200", env = "UARTBOOT_BAUD")]
    baud: u32,

    /// Ack timeout in milliseconds.
    #[arg(long, default_value = "1000", value_name = "MS")]
    timeout_ms: u64,

    /// Flow control mode for the link.
    #[arg(long, default_value = "none")]
    flow: Flow,

    /// Verbose output level (-v, -vv for increasing detail).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (suppress non-essential output).
    #[arg(short, long)]
    quiet: bool,
}

/// Flow control choices.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum Flow {
    /// No flow control.
    None,
    /// Hardware flow control (RTS/CTS).
    Hardware,
    /// Software flow control (XON/XOFF).
    Software,
}

impl From<Flow> for FlowControl {
    fn from(flow: Flow) -> Self {
        match flow {
            Flow::None => FlowControl::None,
            Flow::Hardware => FlowControl::Hardware,
            Flow::Software => FlowControl::Software,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_target(cli.verbose >= 2)
        .format_timestamp(None)
        .init();

    debug!("uartboot v{}", env!("CARGO_PKG_VERSION"));

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e:#}", style("✗").red().bold());
            ExitCode::FAILURE
        },
    }
}

fn run(cli: &Cli) -> Result<()> {
    let image = fs::read(&cli.file)
        .with_context(|| format!("failed to read image {}", cli.file.display()))?;

    if !cli.quiet {
        eprintln!(
            "{} Image: {} ({} bytes)",
            style("ℹ").blue(),
            cli.file.display(),
            image.len()
        );
        eprintln!(
            "{} Using port {} at {} baud",
            style("🔌").cyan(),
            cli.port,
            cli.baud
        );
    }

    let settings = SerialSettings::new(&cli.port, cli.baud)
        .with_timeout(Duration::from_millis(cli.timeout_ms))
        .with_flow_control(cli.flow.into());
    let transport = SerialTransport::open(&settings)
        .with_context(|| format!("failed to open serial port {}", cli.port))?;

    let config = SessionConfig {
        ack_timeout: Duration::from_millis(cli.timeout_ms),
        ..Default::default()
    };
    let mut session = Session::new(transport, config);

    let pb = if cli.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(image.len() as u64);
        #[allow(clippy::unwrap_used)] // Static template string
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );
        pb.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        pb
    };

    let result = session.run(&image, |sent, _total| {
        pb.set_position(sent as u64);
    });

    match result {
        Ok(()) => {
            pb.finish_and_clear();
            if !cli.quiet {
                eprintln!(
                    "{} Programmed {} bytes",
                    style("✓").green().bold(),
                    image.len()
                );
            }
            Ok(())
        },
        Err(e) => {
            pb.abandon();
            Err(anyhow::Error::new(e).context(format!(
                "transfer failed after {} of {} bytes",
                session.bytes_sent(),
                image.len()
            )))
        },
    }
}
