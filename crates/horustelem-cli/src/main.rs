use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use horustelem_core::{DecodedPacket, PayloadDirectory, decode_packet, hex_to_bytes};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("HORUSTELEM_BUILD_COMMIT"),
    ", ",
    env!("HORUSTELEM_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "horustelem")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Horus Binary telemetry packet decoder (22/16/32 byte formats).",
    long_about = None,
    after_help = "Examples:\n  horustelem decode 0112020002BCEB2141521000FF00E17E\n  horustelem decode <HEX> --json --pretty\n  horustelem selftest"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode one hexadecimal packet and print its UKHAS sentence.
    #[command(
        after_help = "Examples:\n  horustelem decode 0112020002BCEB2141521000FF00E17E\n  horustelem decode <HEX> --payload-list payloads.txt --custom-fields custom.json"
    )]
    Decode {
        /// Packet bytes as hexadecimal digits (whitespace allowed)
        hex: String,

        /// Print the full decoded record as JSON instead of the sentence
        #[arg(long)]
        json: bool,

        /// Pretty-print the JSON record
        #[arg(long, requires = "json")]
        pretty: bool,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,

        /// Payload name list to load before decoding (id,callsign lines)
        #[arg(long, value_name = "FILE")]
        payload_list: Option<PathBuf>,

        /// Custom field table to load before decoding (JSON)
        #[arg(long, value_name = "FILE")]
        custom_fields: Option<PathBuf>,
    },
    /// Decode the built-in reference packets and verify their sentences.
    Selftest {
        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Decode {
            hex,
            json,
            pretty,
            quiet,
            payload_list,
            custom_fields,
        } => cmd_decode(hex, json, pretty, quiet, payload_list, custom_fields),
        Commands::Selftest { quiet } => cmd_selftest(quiet),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(err.to_string(), None)
    }
}

fn cmd_decode(
    hex: String,
    json: bool,
    pretty: bool,
    quiet: bool,
    payload_list: Option<PathBuf>,
    custom_fields: Option<PathBuf>,
) -> Result<(), CliError> {
    if payload_list.is_some() || custom_fields.is_some() {
        install_tables(payload_list, custom_fields, quiet)?;
    }

    let bytes = hex_to_bytes(&hex).map_err(|err| {
        CliError::new(
            format!("invalid packet hex: {err}"),
            Some("pass pairs of hexadecimal digits; whitespace is allowed".to_string()),
        )
    })?;

    let decoded = decode_packet(&bytes, None).map_err(|err| {
        let hint = match err {
            horustelem_core::DecodeError::UnknownFormat { .. } => {
                Some("supported packet lengths are 16, 22 and 32 bytes".to_string())
            }
            horustelem_core::DecodeError::ChecksumFailure { .. } => {
                Some("the packet is corrupt or was truncated in transit".to_string())
            }
            _ => None,
        };
        CliError::new(format!("decode failed: {err}"), hint)
    })?;

    if !quiet {
        eprintln!("OK: decoded as {}", decoded.packet_format);
    }
    print!("{}", render_record(&decoded, json, pretty)?);
    Ok(())
}

fn render_record(decoded: &DecodedPacket, json: bool, pretty: bool) -> Result<String, CliError> {
    if !json {
        return Ok(format!("{}\n", decoded.ukhas_str));
    }
    let rendered = if pretty {
        serde_json::to_string_pretty(decoded)
    } else {
        serde_json::to_string(decoded)
    };
    let mut rendered = rendered
        .context("JSON serialization failed")
        .map_err(CliError::from)?;
    rendered.push('\n');
    Ok(rendered)
}

fn install_tables(
    payload_list: Option<PathBuf>,
    custom_fields: Option<PathBuf>,
    quiet: bool,
) -> Result<(), CliError> {
    let mut directory = PayloadDirectory::defaults();

    if let Some(path) = payload_list {
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read payload list: {}", path.display()))?;
        let skipped = directory.load_names(&text);
        if !quiet {
            eprintln!(
                "OK: payload list loaded -> {} ({} lines skipped)",
                path.display(),
                skipped
            );
        }
    }

    if let Some(path) = custom_fields {
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read custom field table: {}", path.display()))?;
        let skipped = directory.load_custom(&json).map_err(|err| {
            CliError::new(
                format!("custom field table rejected: {err}"),
                Some("the previous table remains in effect".to_string()),
            )
        })?;
        if !quiet {
            eprintln!(
                "OK: custom field table loaded -> {} ({} keys skipped)",
                path.display(),
                skipped
            );
        }
    }

    directory.install();
    Ok(())
}

struct ReferenceVector {
    name: &'static str,
    hex: &'static str,
    /// Expected sentence, or None when the vector must be rejected.
    sentence: Option<&'static str>,
}

const REFERENCE_VECTORS: [ReferenceVector; 4] = [
    ReferenceVector {
        name: "horus_binary_v1",
        hex: "0112000000230000000000000000000000001C9A9545",
        sentence: Some("$$HORUSBINARY,18,00:00:35,0.00000,0.00000,0,0,0,28,3.02*27B1"),
    },
    ReferenceVector {
        name: "horus_binary_v1 corrupted",
        hex: "0112000000230000000000000001000000001C9A9545",
        sentence: None,
    },
    ReferenceVector {
        name: "horus_binary_v2_16byte",
        hex: "0112020002BCEB2141521000FF00E17E",
        sentence: Some("$$HORUSBINARY,18,00:00:04,-132.81260,539.06250,16,5.00,0*2C55"),
    },
    ReferenceVector {
        name: "horus_binary_v2_32byte",
        hex: "FFFF12000000230000000000000000000100000000000000000000000000E882",
        sentence: Some(
            "$$HORUSTEST,18,00:00:35,0.00000,0.00000,256,0,0,0,0.00,0.00,0,0,0.0,0*80AE",
        ),
    },
];

fn cmd_selftest(quiet: bool) -> Result<(), CliError> {
    let directory = PayloadDirectory::defaults();

    for vector in &REFERENCE_VECTORS {
        let bytes = hex_to_bytes(vector.hex)
            .with_context(|| format!("reference vector {} is not valid hex", vector.name))?;
        let outcome = horustelem_core::decode_packet_with(&bytes, None, &directory);

        match (&outcome, vector.sentence) {
            (Ok(decoded), Some(expected)) if decoded.ukhas_str == expected => {
                if !quiet {
                    eprintln!("OK: {} -> {}", vector.name, decoded.ukhas_str);
                }
            }
            (Ok(decoded), Some(expected)) => {
                return Err(CliError::new(
                    format!(
                        "selftest failed: {} decoded to {:?}, expected {:?}",
                        vector.name, decoded.ukhas_str, expected
                    ),
                    None,
                ));
            }
            (Ok(_), None) => {
                return Err(CliError::new(
                    format!("selftest failed: {} decoded but must be rejected", vector.name),
                    None,
                ));
            }
            (Err(err), None) => {
                if !quiet {
                    eprintln!("OK: {} rejected ({err})", vector.name);
                }
            }
            (Err(err), Some(_)) => {
                return Err(CliError::new(
                    format!("selftest failed: {} did not decode: {err}", vector.name),
                    None,
                ));
            }
        }
    }

    if !quiet {
        eprintln!("OK: all reference packets passed");
    }
    Ok(())
}
