// Command-line interface for revdelta.
//
// Thin consumer of the library: wires two files and a sink to the windowed
// generator. `delta` summarizes the instruction stream; `inspect` prints
// every instruction per window.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::delta::generator::{DEFAULT_WINDOW_SIZE, GeneratorOptions};
use crate::delta::window::{CountingSink, DeltaInstruction, DeltaSink};
use crate::io::diff_files;

// ---------------------------------------------------------------------------
// Byte size parsing (supports K, M, G suffixes)
// ---------------------------------------------------------------------------

fn parse_byte_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty size string".into());
    }
    let (num_part, multiplier) = match s.as_bytes().last() {
        Some(b'k' | b'K') => (&s[..s.len() - 1], 1024u64),
        Some(b'm' | b'M') => (&s[..s.len() - 1], 1024 * 1024),
        Some(b'g' | b'G') => (&s[..s.len() - 1], 1024 * 1024 * 1024),
        _ => (s, 1u64),
    };
    let num: u64 = num_part
        .trim()
        .parse()
        .map_err(|e| format!("invalid size '{s}': {e}"))?;
    num.checked_mul(multiplier)
        .ok_or_else(|| format!("size overflow: '{s}'"))
}

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Windowed diff/delta generator.
#[derive(Parser, Debug)]
#[command(
    name = "revdelta",
    version,
    about = "Windowed diff/delta generator",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Compute a delta between two files and print statistics.
    Delta(DiffArgs),
    /// Print every delta instruction, window by window.
    Inspect(DiffArgs),
}

#[derive(Args, Debug)]
struct DiffArgs {
    /// Source (old) file.
    source: PathBuf,
    /// Target (new) file.
    target: PathBuf,

    /// Window size in bytes (K/M/G suffixes allowed).
    #[arg(short = 'W', long, value_parser = parse_byte_size)]
    window_size: Option<u64>,

    /// Block-merge gutter in elements (0 merges only adjacent blocks).
    #[arg(long, default_value_t = 0)]
    gutter: usize,
}

impl DiffArgs {
    fn options(&self) -> GeneratorOptions {
        GeneratorOptions {
            window_size: self
                .window_size
                .map_or(DEFAULT_WINDOW_SIZE, |w| w as usize),
            gutter: self.gutter,
        }
    }
}

// ---------------------------------------------------------------------------
// delta command
// ---------------------------------------------------------------------------

fn cmd_delta(args: &DiffArgs, quiet: bool) -> i32 {
    let mut sink = CountingSink::new();
    let stats = match diff_files(&args.source, &args.target, &mut sink, args.options()) {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("revdelta: delta: {e}");
            return 1;
        }
    };

    if !quiet {
        println!(
            "source: {} bytes, target: {} bytes",
            stats.source_size, stats.target_size
        );
        println!(
            "windows: {}, instructions: {}, copied: {} bytes, inserted: {} bytes",
            stats.windows, sink.instructions, sink.copy_bytes, sink.insert_bytes
        );
        if stats.target_size > 0 {
            println!(
                "literal ratio: {:.1}%",
                100.0 * sink.insert_bytes as f64 / stats.target_size as f64
            );
        }
    }
    0
}

// ---------------------------------------------------------------------------
// inspect command
// ---------------------------------------------------------------------------

/// Sink that prints each notification as one line.
struct PrintSink<W: Write> {
    out: W,
    show_data: bool,
}

impl<W: Write> DeltaSink for PrintSink<W> {
    fn window_begin(&mut self, source_offset: u64) -> io::Result<()> {
        writeln!(self.out, "window @ source offset {source_offset}")
    }

    fn instruction(&mut self, inst: DeltaInstruction<'_>) -> io::Result<()> {
        match inst {
            DeltaInstruction::CopySource { offset, len } => {
                writeln!(self.out, "  copy    {len} bytes from source +{offset}")
            }
            DeltaInstruction::Insert { data } => {
                if self.show_data {
                    writeln!(
                        self.out,
                        "  insert  {} bytes: {:?}",
                        data.len(),
                        String::from_utf8_lossy(&data[..data.len().min(32)])
                    )
                } else {
                    writeln!(self.out, "  insert  {} bytes", data.len())
                }
            }
        }
    }

    fn window_end(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn stream_end(&mut self) -> io::Result<()> {
        writeln!(self.out, "end of stream")
    }
}

fn cmd_inspect(args: &DiffArgs, verbose: u8) -> i32 {
    let stdout = io::stdout();
    let mut sink = PrintSink {
        out: stdout.lock(),
        show_data: verbose > 0,
    };
    match diff_files(&args.source, &args.target, &mut sink, args.options()) {
        Ok(_) => 0,
        Err(e) => {
            eprintln!("revdelta: inspect: {e}");
            1
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let cli = Cli::parse();

    let exit_code = match &cli.command {
        Cmd::Delta(args) => cmd_delta(args, cli.quiet),
        Cmd::Inspect(args) => cmd_inspect(args, cli.verbose),
    };
    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
