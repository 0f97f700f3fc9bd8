//! mcwire CLI
//!
//! Encode requests and replies from the command line, decode binary headers
//! and watch a file for changes.

use std::io;
use std::time::Duration;

use bytes::Bytes;
use clap::{Parser, Subcommand};
use mcwire::protocol::{RequestHeader, ResponseHeader, REQUEST_MAGIC};
use mcwire::{
    AsciiReplySerializer, BinaryRequestSerializer, Config, FileDataProvider, McReply, McRequest,
    OpKind, Prepared, ResultCode, Value, WireError,
};
use tracing_subscriber::{fmt, EnvFilter};

/// mcwire CLI
#[derive(Parser, Debug)]
#[command(name = "mcwire")]
#[command(about = "Memcache wire encoding toolkit")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encode a binary request frame and print it as hex
    Request {
        /// Operation name (get, set, incr, flush-all, ...)
        op: String,

        /// Key
        #[arg(short, long, default_value = "")]
        key: String,

        /// Value
        #[arg(short, long, default_value = "")]
        value: String,

        #[arg(long, default_value = "0")]
        flags: u32,

        #[arg(long, default_value = "0")]
        exptime: u32,

        #[arg(long, default_value = "0")]
        delta: u64,

        #[arg(long, default_value = "0")]
        cas: u64,

        /// Split the value into this many fragments
        #[arg(long, default_value = "1")]
        fragments: usize,
    },

    /// Encode a text reply and print it with line endings escaped
    Reply {
        /// Operation name
        op: String,

        /// Result name (found, not_found, stored, client_error, ...)
        #[arg(short, long)]
        result: String,

        /// Key; empty ends a multi-key get
        #[arg(short, long, default_value = "")]
        key: String,

        /// Value payload
        #[arg(short, long, default_value = "")]
        value: String,

        #[arg(long, default_value = "0")]
        flags: u32,

        #[arg(long, default_value = "0")]
        cas: u64,

        /// Lease token for lease-get
        #[arg(long, default_value = "0")]
        lease_token: u64,

        /// Counter value for incr/decr
        #[arg(long, default_value = "0")]
        delta: u64,

        /// Diagnostic message for error results
        #[arg(short, long)]
        message: Option<String>,

        /// Application error code
        #[arg(long, default_value = "0")]
        error_code: u16,

        /// Stat line, repeatable
        #[arg(long = "stat")]
        stats: Vec<String>,
    },

    /// Decode a 24-byte binary header given as hex
    Header {
        /// 48 hex digits
        hex: String,
    },

    /// Watch a file and log its size on every change
    Watch {
        /// File to watch
        path: String,

        /// Poll interval in milliseconds
        #[arg(short, long, default_value = "500")]
        interval_ms: u64,

        /// Inspect links themselves instead of their targets
        #[arg(long)]
        no_follow: bool,

        /// Exit after this many changes (0 = run forever)
        #[arg(short, long, default_value = "0")]
        count: usize,
    },
}

fn main() {
    let config = Config::default();

    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter.as_str()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    tracing::debug!("mcwire v{}", mcwire::VERSION);

    if let Err(e) = run(args.command, config) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands, config: Config) -> mcwire::Result<()> {
    match command {
        Commands::Request {
            op,
            key,
            value,
            flags,
            exptime,
            delta,
            cas,
            fragments,
        } => {
            let op = parse_op(&op)?;
            let request = McRequest::new(op, key)
                .with_value(split_value(value.into_bytes(), fragments))
                .with_flags(flags)
                .with_exptime(exptime)
                .with_delta(delta)
                .with_cas(cas);

            let mut serializer = BinaryRequestSerializer::with_config(&config);
            match serializer.prepare(&request)? {
                Prepared::Encoded(iovs) => {
                    println!("{}", hex::encode(iovs.to_vec()));
                    tracing::info!(iovs = iovs.len(), bytes = iovs.total_len(), "encoded");
                }
                Prepared::NotApplicable => {
                    println!("{} has no binary encoding", op.name());
                }
            }
        }

        Commands::Reply {
            op,
            result,
            key,
            value,
            flags,
            cas,
            lease_token,
            delta,
            message,
            error_code,
            stats,
        } => {
            let op = parse_op(&op)?;
            let result = ResultCode::from_name(&result)
                .ok_or_else(|| WireError::Config(format!("Unknown result: {}", result)))?;

            let mut reply = McReply::new(op, result)
                .with_value(value)
                .with_flags(flags)
                .with_cas(cas)
                .with_lease_token(lease_token)
                .with_delta(delta)
                .with_app_error_code(error_code)
                .with_stats(stats);
            if let Some(message) = message {
                reply = reply.with_message(message);
            }

            let mut serializer = AsciiReplySerializer::new();
            let iovs = serializer.prepare(reply, key.as_bytes());
            println!("{}", escape(&iovs.to_vec()));
            tracing::info!(iovs = iovs.len(), bytes = iovs.total_len(), "encoded");
        }

        Commands::Header { hex } => {
            println!("{}", describe_header(&decode_hex(&hex)?)?);
        }

        Commands::Watch {
            path,
            interval_ms,
            no_follow,
            count,
        } => {
            let config = Config::builder()
                .poll_interval_ms(interval_ms)
                .follow_symlinks(!no_follow)
                .build();
            let provider = FileDataProvider::with_config(&path, &config)?;
            tracing::info!("Watching {}", path);

            let mut seen = 0;
            loop {
                std::thread::sleep(Duration::from_millis(interval_ms));
                if !provider.has_update() {
                    continue;
                }
                match provider.load() {
                    Ok(data) => tracing::info!(bytes = data.len(), "Reloaded {}", path),
                    Err(e) => tracing::warn!("{}", e),
                }
                seen += 1;
                if count != 0 && seen >= count {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn parse_op(name: &str) -> mcwire::Result<OpKind> {
    OpKind::from_name(name).ok_or_else(|| WireError::Config(format!("Unknown operation: {}", name)))
}

/// Cut `data` into `count` roughly equal fragments
fn split_value(data: Vec<u8>, count: usize) -> Value {
    let data = Bytes::from(data);
    if count <= 1 || data.is_empty() {
        return Value::from(data);
    }
    let size = data.len().div_ceil(count);
    Value::from_fragments((0..data.len()).step_by(size).map(|start| {
        let end = (start + size).min(data.len());
        data.slice(start..end)
    }))
}

/// Printable form of a text reply: CR and LF shown as escapes
fn escape(bytes: &[u8]) -> String {
    bytes.escape_ascii().to_string()
}

/// Decode hex digits, ignoring whitespace between them
fn decode_hex(digits: &str) -> mcwire::Result<Vec<u8>> {
    let digits: String = digits.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    hex::decode(digits).map_err(|e| WireError::Config(format!("Invalid hex: {}", e)))
}

/// Debug dump of a request or response header, chosen by the magic byte
fn describe_header(bytes: &[u8]) -> mcwire::Result<String> {
    if bytes.first() == Some(&REQUEST_MAGIC) {
        return Ok(format!("{:#?}", RequestHeader::parse(bytes)?));
    }

    let header = ResponseHeader::parse(bytes)?;
    let status = match header.status() {
        Some(status) => status.description().to_string(),
        None => format!("unknown ({})", header.status),
    };
    Ok(format!("{:#?}\nstatus: {}", header, status))
}
