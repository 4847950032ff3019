use std::{
    ffi::OsStr,
    ffi::OsString,
    fs,
    io::Read,
    path::{Path, PathBuf},
    process,
};

use clap::{ArgGroup, Parser as ClapParser};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use coffee2closure_rs::{Coffee2Closure, FixOptions};

#[derive(Debug, ClapParser)]
#[command(name = "coffee2closure", about = "Fix CoffeeScript compiler output for the Closure Compiler")]
#[command(group(
    ArgGroup::new("verbosity")
        .args(["quiet", "verbose"])
        .multiple(false)
))]
struct Cli {
    /// JavaScript file produced by the CoffeeScript compiler
    input_filename: PathBuf,

    /// Only log errors
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,

    /// Log every pass and rewritten class
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Do not prepend the "Generated by" banner
    #[arg(long = "no-header")]
    no_header: bool,

    /// Write the result to a file. <input_filename>-closure.js is used if no filename is provided
    #[arg(short = 'o', long = "output", num_args = 0..=1, default_missing_value = "")]
    output: Option<OsString>,
}

fn init_tracing(cli: &Cli) {
    let filter = if let Ok(val) = std::env::var("COFFEE2CLOSURE_LOG") {
        EnvFilter::builder().parse_lossy(val)
    } else if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else if cli.quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    let input_path = cli.input_filename;
    let source_text = match read_file_to_string_with_capacity(&input_path) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to read {}: {e}", input_path.display());
            process::exit(1);
        }
    };

    info!("Fixing {}...", input_path.display());
    let result = match Coffee2Closure::default().fix(
        &source_text,
        FixOptions { add_generated_by_header: !cli.no_header, ..FixOptions::default() },
    ) {
        Ok(r) => r,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };
    if !result.modified {
        info!("Nothing to fix in {}", input_path.display());
    }

    let output_text = result.code;

    if cli.output.is_some() {
        let output_path = resolve_output_path(&input_path, cli.output.as_deref());
        if let Err(e) = fs::write(&output_path, output_text.as_bytes()) {
            error!("Failed to write {}: {e}", output_path.display());
            process::exit(1);
        }
        info!("Saved {}", output_path.display());
    } else {
        print!("{output_text}");
    }
}

fn read_file_to_string_with_capacity(path: &Path) -> std::io::Result<String> {
    let mut file = fs::File::open(path)?;
    let cap = file.metadata().ok().and_then(|m| usize::try_from(m.len()).ok()).unwrap_or(0);
    let mut s = String::with_capacity(cap.saturating_add(1));
    file.read_to_string(&mut s)?;
    Ok(s)
}

fn resolve_output_path(input_path: &Path, output: Option<&OsStr>) -> PathBuf {
    match output {
        Some(v) if !v.is_empty() => PathBuf::from(v),
        _ => input_path.with_file_name(format!(
            "{}-closure.js",
            input_path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("output")
        )),
    }
}
