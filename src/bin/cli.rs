use std::io::{IsTerminal, Read, Write};
use std::path::PathBuf;
use std::process;

use clap::{CommandFactory, Parser as ClapParser};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rtspframe::{
    ParserConfig, format_debug, format_headers_only, format_json, parse_request_with_config,
};

/// rtspframe CLI — strict RTSP/1.0 request decoder.
///
/// Reads a raw RTSP request from a file, --raw string, or stdin and outputs
/// a structured representation in the chosen format, or re-encodes it.
///
/// Escape sequences (\r, \n, \t, \\) in the --raw value are interpreted so
/// you can pass a full RTSP request as a single shell argument.
#[derive(ClapParser)]
#[command(name = "rtspframe-cli", version, about, long_about = None)]
struct Cli {
    /// Path to a file containing a raw RTSP request.
    /// Reads from stdin when neither FILE nor --raw is given.
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Raw RTSP request string (escape sequences \r \n \t \\ are expanded).
    #[arg(long)]
    raw: Option<String>,

    /// Output format.
    #[arg(short, long, default_value = "json", value_enum)]
    format: OutputFormat,

    /// Pretty-print JSON output (ignored for other formats).
    #[arg(short, long)]
    pretty: bool,

    /// Maximum allowed body size in bytes.
    #[arg(long, default_value = "131072")]
    max_body_size: usize,

    /// Maximum number of headers allowed.
    #[arg(long, default_value = "255")]
    max_headers: usize,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum OutputFormat {
    /// JSON output
    Json,
    /// Human-readable debug output
    Debug,
    /// Request-line + headers only
    Headers,
    /// Re-encoded wire bytes
    Wire,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rtspframe=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // When no input source is provided and stdin is a terminal (not piped),
    // show help instead of blocking.
    if cli.file.is_none() && cli.raw.is_none() && std::io::stdin().is_terminal() {
        Cli::command().print_help().ok();
        println!();
        process::exit(0);
    }

    let data = match read_input(&cli) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error reading input: {e}");
            process::exit(1);
        }
    };

    if data.is_empty() {
        eprintln!("Error: empty input");
        process::exit(1);
    }

    let config = ParserConfig {
        max_body_size: cli.max_body_size,
        max_header_count: cli.max_headers,
        ..ParserConfig::default()
    };

    let (mut request, consumed) = match parse_request_with_config(&data, &config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Parse error: {e}");
            process::exit(2);
        }
    };
    if consumed < data.len() {
        tracing::warn!(
            trailing = data.len() - consumed,
            "ignoring bytes after the first request"
        );
    }

    let output = match cli.format {
        OutputFormat::Json => format_json(&request, cli.pretty).into_bytes(),
        OutputFormat::Debug => format_debug(&request).into_bytes(),
        OutputFormat::Headers => format_headers_only(&request).into_bytes(),
        OutputFormat::Wire => match request.marshal() {
            Ok(bytes) => bytes,
            Err(e) => {
                eprintln!("Encode error: {e}");
                process::exit(3);
            }
        },
    };

    if let Err(e) = std::io::stdout().write_all(&output) {
        eprintln!("Error writing output: {e}");
        process::exit(1);
    }
}

/// Read raw RTSP bytes from --raw, a file, or stdin.
fn read_input(cli: &Cli) -> Result<Vec<u8>, std::io::Error> {
    if let Some(raw) = &cli.raw {
        return Ok(unescape(raw).into_bytes());
    }
    match &cli.file {
        Some(path) => std::fs::read(path),
        None => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Expand C-style escape sequences (`\r`, `\n`, `\t`, `\\`) in a string.
///
/// Any other `\X` sequence is kept as-is (both the backslash and `X`).
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('r') => out.push('\r'),
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('\\') => out.push('\\'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}
