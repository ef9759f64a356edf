// Idiomatic Rust CLI for Oxiups.
//
// Explicit subcommands: `create` diffs two files into a patch, `apply`
// reconstructs a file (direction auto-detected), `info` inspects a
// patch, `config` prints build details.

use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::io::{self as file_io, IoError};
use crate::ups::applier::ApplyError;
use crate::ups::patch::{FOOTER_LEN, Patch};
use crate::ups::varint;

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// UPS binary patch tool.
#[derive(Parser, Debug)]
#[command(
    name = "oxiups",
    version,
    about = "UPS binary patcher: create and apply UPS1 patches",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Create a patch from a source file and a target file.
    Create(CreateArgs),
    /// Apply a patch to a file (direction is detected automatically).
    Apply(ApplyArgs),
    /// Print information about a patch file.
    Info(InfoArgs),
    /// Print build/configuration details.
    Config,
}

#[derive(Args, Debug)]
struct CreateArgs {
    /// Original (unmodified) file.
    #[arg(value_hint = ValueHint::FilePath)]
    source: PathBuf,

    /// Modified file.
    #[arg(value_hint = ValueHint::FilePath)]
    target: PathBuf,

    /// Patch file to write.
    #[arg(value_hint = ValueHint::FilePath)]
    patch: PathBuf,
}

#[derive(Args, Debug)]
struct ApplyArgs {
    /// Patch file.
    #[arg(value_hint = ValueHint::FilePath)]
    patch: PathBuf,

    /// File to patch (either the original or the modified file).
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Output file to write.
    #[arg(value_hint = ValueHint::FilePath)]
    output: PathBuf,
}

#[derive(Args, Debug)]
struct InfoArgs {
    /// Patch file to inspect.
    #[arg(value_hint = ValueHint::FilePath)]
    patch: PathBuf,
}

// ---------------------------------------------------------------------------
// Resolved options (flattened from Cli)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Create,
    Apply,
    Info,
    Config,
}

struct Options {
    command: Command,
    force: bool,
    quiet: bool,
    verbose: u8,
    json_output: bool,
    source_file: Option<PathBuf>,
    input_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
}

fn resolve_options(cli: Cli) -> Options {
    let force = cli.force;
    let quiet = cli.quiet;
    let verbose = cli.verbose.min(2);
    let json_output = cli.json_output;

    match cli.command {
        Cmd::Create(args) => Options {
            command: Command::Create,
            force,
            quiet,
            verbose,
            json_output,
            source_file: Some(args.source),
            input_file: Some(args.target),
            output_file: Some(args.patch),
        },
        Cmd::Apply(args) => Options {
            command: Command::Apply,
            force,
            quiet,
            verbose,
            json_output,
            source_file: Some(args.patch),
            input_file: Some(args.input),
            output_file: Some(args.output),
        },
        Cmd::Info(args) => Options {
            command: Command::Info,
            force,
            quiet,
            verbose,
            json_output,
            source_file: None,
            input_file: Some(args.patch),
            output_file: None,
        },
        Cmd::Config => Options {
            command: Command::Config,
            force,
            quiet,
            verbose,
            json_output,
            source_file: None,
            input_file: None,
            output_file: None,
        },
    }
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("oxiups".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let _ = resolve_options(cli);
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn refuse_existing_output(path: &Path, force: bool) -> bool {
    if path.exists() && !force {
        eprintln!(
            "oxiups: output file exists, use -f to overwrite: {}",
            path.display()
        );
        return true;
    }
    false
}

// ---------------------------------------------------------------------------
// Create command
// ---------------------------------------------------------------------------

fn cmd_create(opts: &Options) -> i32 {
    let (Some(source), Some(target), Some(patch)) =
        (&opts.source_file, &opts.input_file, &opts.output_file)
    else {
        eprintln!("oxiups: create requires source, target and patch paths");
        return 1;
    };

    if refuse_existing_output(patch, opts.force) {
        return 1;
    }

    let stats = match file_io::create_file(source, target, patch) {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("oxiups: create: {e}");
            return 1;
        }
    };

    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "oxiups: created {}: source {} bytes (CRC {:08X}), target {} bytes (CRC {:08X}), \
             {} blocks, patch {} bytes",
            patch.display(),
            stats.source_size,
            stats.crc_source,
            stats.target_size,
            stats.crc_target,
            stats.blocks,
            stats.patch_size
        );
    }

    if opts.json_output {
        let json = serde_json::json!({
            "command": "create",
            "source_size": stats.source_size,
            "target_size": stats.target_size,
            "patch_size": stats.patch_size,
            "blocks": stats.blocks,
            "crc_source": format!("{:08X}", stats.crc_source),
            "crc_target": format!("{:08X}", stats.crc_target),
        });
        eprintln!("{}", serde_json::to_string_pretty(&json).unwrap());
    }

    0
}

// ---------------------------------------------------------------------------
// Apply command
// ---------------------------------------------------------------------------

fn cmd_apply(opts: &Options) -> i32 {
    let (Some(patch), Some(input), Some(output)) =
        (&opts.source_file, &opts.input_file, &opts.output_file)
    else {
        eprintln!("oxiups: apply requires patch, input and output paths");
        return 1;
    };

    if refuse_existing_output(output, opts.force) {
        return 1;
    }

    let stats = match file_io::apply_file(patch, input, output) {
        Ok(stats) => stats,
        Err(IoError::Apply(ApplyError::OutputVerification {
            direction,
            expected,
            actual,
            ..
        })) => {
            eprintln!(
                "oxiups: {direction} output failed verification \
                 (expected {expected:08X}, got {actual:08X}); no output written"
            );
            return 2;
        }
        Err(e) => {
            eprintln!("oxiups: apply: {e}");
            return 1;
        }
    };

    if !opts.quiet {
        eprintln!(
            "oxiups: applied {} ({}): {} -> {} bytes",
            patch.display(),
            stats.direction,
            stats.input_size,
            stats.output_size
        );
    }

    if opts.json_output {
        let json = serde_json::json!({
            "command": "apply",
            "direction": stats.direction.as_str(),
            "patch_size": stats.patch_size,
            "input_size": stats.input_size,
            "output_size": stats.output_size,
            "blocks": stats.blocks,
        });
        eprintln!("{}", serde_json::to_string_pretty(&json).unwrap());
    }

    0
}

// ---------------------------------------------------------------------------
// Info command
// ---------------------------------------------------------------------------

fn cmd_info(opts: &Options) -> i32 {
    let Some(patch_path) = &opts.input_file else {
        eprintln!("oxiups: info requires a patch file");
        return 1;
    };

    let bytes = match std::fs::read(patch_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("oxiups: {}: {e}", patch_path.display());
            return 1;
        }
    };

    let patch = match Patch::parse(&bytes) {
        Ok(patch) => patch,
        Err(e) => {
            eprintln!("oxiups: invalid patch: {e}");
            return 1;
        }
    };

    let header_len = 4
        + varint::sizeof_u64(patch.input_size)
        + varint::sizeof_u64(patch.output_size);
    let body_len = bytes.len() - header_len - FOOTER_LEN;

    println!("UPS patch:          {}", patch_path.display());
    println!("patch size:         {}", bytes.len());
    println!("input size:         {}", patch.input_size);
    println!("output size:        {}", patch.output_size);
    println!("blocks:             {}", patch.blocks.len());
    println!("body size:          {body_len}");
    println!("input CRC-32:       {:08X}", patch.crc_input);
    println!("output CRC-32:      {:08X}", patch.crc_output);
    println!("patch CRC-32:       {:08X}", patch.crc_patch);

    if opts.verbose > 0 {
        let mut offset = 0u64;
        for (i, block) in patch.blocks.iter().enumerate() {
            offset += block.gap;
            println!(
                "  block {i:>6}: offset {offset:>10}, gap {:>8}, run {:>6}",
                block.gap,
                block.xor.len()
            );
            offset += block.xor.len() as u64;
        }
    }

    if opts.json_output {
        let json = serde_json::json!({
            "command": "info",
            "patch_size": bytes.len(),
            "input_size": patch.input_size,
            "output_size": patch.output_size,
            "blocks": patch.blocks.len(),
            "crc_input": format!("{:08X}", patch.crc_input),
            "crc_output": format!("{:08X}", patch.crc_output),
            "crc_patch": format!("{:08X}", patch.crc_patch),
        });
        eprintln!("{}", serde_json::to_string_pretty(&json).unwrap());
    }

    0
}

// ---------------------------------------------------------------------------
// Config command
// ---------------------------------------------------------------------------

fn cmd_config() -> i32 {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!("oxiups version {version} (Rust), Copyright (C) oxiups contributors");
    eprintln!("Licensed under the MIT license");

    let cli = cfg!(feature = "cli") as u8;
    let ptr_size = std::mem::size_of::<*const ()>();

    eprintln!("CLI={cli}");
    eprintln!("UPS_FOOTER_LEN={FOOTER_LEN}");
    eprintln!("sizeof(usize)={ptr_size}");

    0
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
    let opts = resolve_options(cli);

    let exit_code = match opts.command {
        Command::Create => cmd_create(&opts),
        Command::Apply => cmd_apply(&opts),
        Command::Info => cmd_info(&opts),
        Command::Config => cmd_config(),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
