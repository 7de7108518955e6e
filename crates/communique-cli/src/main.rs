//! communique - Encode, decode and export quick command deck serial messages
//!
//! The host side of the deck link: builds `DisplayText` frames to send to
//! the deck, decodes captured `ButtonPushed` frames, and exports the message
//! schemas as a `.proto` file for other host tooling. A host config file
//! (see [`config`]) supplies display defaults and the command bound to each
//! button.

mod config;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use communique_core::{
    decode, decode_into, encode_to_bytes, encode_to_slice, split_lines, ButtonPushed,
    DisplayText, ExportConfig, LineBuffer, ProtoExporter, SliceProducer, StatsWriter,
};
use config::{ButtonCommand, DeckConfig, DisplayConfig};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, info, trace, warn, Level};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// Receive buffer per display line when decoding
const LINE_CAPACITY: usize = 64;

/// Extension of raw capture files picked up from directories
const CAPTURE_EXTENSION: &str = "bin";

/// Encode, decode and export quick command deck serial messages
#[derive(Parser, Debug)]
#[command(name = "communique")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Host config file with display defaults and button commands
    #[arg(short, long, env = "COMMUNIQUE_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode a message and print it as hex
    Encode {
        #[command(subcommand)]
        message: EncodeMessage,
    },
    /// Decode captured messages
    Decode(DecodeArgs),
    /// Write the message schemas as a .proto file
    Schema(SchemaArgs),
}

#[derive(Subcommand, Debug)]
enum EncodeMessage {
    /// A button press, as the deck sends it
    Button {
        /// Button number
        #[arg(allow_negative_numbers = true)]
        number: i32,
    },
    /// A display command, as the host sends it
    Text(TextArgs),
}

#[derive(Args, Debug)]
struct TextArgs {
    /// First display row
    #[arg(long, conflicts_with = "text")]
    line1: Option<String>,

    /// Second display row
    #[arg(long, conflicts_with = "text")]
    line2: Option<String>,

    /// Text wrapped across both rows
    #[arg(long)]
    text: Option<String>,

    /// Display width used to wrap --text [default: config.display.columns]
    #[arg(long, env = "COMMUNIQUE_COLUMNS")]
    columns: Option<usize>,

    /// Backlight brightness [default: config.display.brightness]
    #[arg(long, allow_negative_numbers = true)]
    brightness: Option<i32>,

    /// How long the text stays on screen [default: config.display.notif_time_ms]
    #[arg(long, allow_negative_numbers = true)]
    duration_ms: Option<i32>,

    /// Flash the status LED
    #[arg(long)]
    flash_led: bool,

    /// Size of the encode buffer in bytes
    #[arg(long, default_value_t = 64)]
    capacity: usize,
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Message type held by the input
    #[arg(value_enum)]
    message: MessageKind,

    #[command(flatten)]
    input: DecodeInput,

    /// Run the command configured for each decoded button press
    #[arg(long)]
    run: bool,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct DecodeInput {
    /// Hex-encoded message (spaces and a 0x prefix are ignored)
    #[arg(long)]
    hex: Option<String>,

    /// Raw capture file holding one message
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Directory of *.bin capture files to decode
    #[arg(short, long)]
    directory: Option<PathBuf>,
}

/// Message types understood by `decode`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum MessageKind {
    /// ButtonPushed
    Button,
    /// DisplayText
    Text,
}

#[derive(Args, Debug)]
struct SchemaArgs {
    /// Output directory for the .proto file
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Protobuf package name (empty for none)
    #[arg(long, default_value = "communique")]
    package: String,

    /// Dry run - don't write the file, just show what would be written
    #[arg(long)]
    dry_run: bool,

    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
}

/// What to do with each decoded message
struct DecodeContext<'a> {
    kind: MessageKind,
    config: &'a DeckConfig,
    run: bool,
}

/// Outcome of decoding a capture directory
#[derive(Debug, Default, PartialEq, Eq)]
struct DirectorySummary {
    decoded: usize,
    failed: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => DeckConfig::from_path(path)?,
        None => DeckConfig::default(),
    };

    match &cli.command {
        Command::Encode { message } => {
            let bytes = match message {
                EncodeMessage::Button { number } => encode_button(*number)?,
                EncodeMessage::Text(args) => encode_text(args, &config.config.display)?,
            };
            println!("{}", hex::encode(bytes));
            Ok(())
        }
        Command::Decode(args) => run_decode(args, &config),
        Command::Schema(args) => run_schema(args, cli.verbose),
    }
}

fn encode_button(number: i32) -> Result<Vec<u8>> {
    let mut buf = [0u8; ButtonPushed::MAX_SIZE];
    let len = encode_to_slice(&mut ButtonPushed::new(number), &mut buf)
        .context("Failed to encode ButtonPushed")?;
    debug!("ButtonPushed {} -> {} bytes", number, len);
    Ok(buf[..len].to_vec())
}

fn encode_text(args: &TextArgs, display: &DisplayConfig) -> Result<Vec<u8>> {
    let columns = args.columns.unwrap_or(display.columns);
    if columns == 0 {
        bail!("--columns must be at least 1");
    }

    let (line1, line2) = match &args.text {
        Some(text) => split_lines(text, columns),
        None => (
            args.line1.as_deref().unwrap_or(""),
            args.line2.as_deref().unwrap_or(""),
        ),
    };

    for (name, line) in [("line1", line1), ("line2", line2)] {
        let width = line.chars().count();
        if width > columns {
            warn!(
                "{} is {} characters wide, the display shows {}",
                name, width, columns
            );
        }
    }

    let mut p1 = SliceProducer::from_text(line1);
    let mut p2 = SliceProducer::from_text(line2);
    let mut msg = DisplayText::outgoing(&mut p1, &mut p2)
        .brightness(args.brightness.unwrap_or(display.brightness))
        .duration_ms(args.duration_ms.unwrap_or(display.notif_time_ms))
        .flash_led(args.flash_led);

    let mut buf = vec![0u8; args.capacity];
    let len = encode_to_slice(&mut msg, &mut buf).context("Failed to encode DisplayText")?;
    buf.truncate(len);

    debug!("DisplayText {:?} / {:?} -> {} bytes", line1, line2, len);
    Ok(buf)
}

/// Reply shown on the deck once a button's command has completed
fn encode_report(action: &ButtonCommand, display: &DisplayConfig) -> Result<Option<Vec<u8>>> {
    let Some(rows) = &action.report_message else {
        return Ok(None);
    };
    let line1 = rows.first().map(String::as_str).unwrap_or("");
    let line2 = rows.get(1).map(String::as_str).unwrap_or("");

    let mut p1 = SliceProducer::from_text(line1);
    let mut p2 = SliceProducer::from_text(line2);
    let mut msg = DisplayText::outgoing(&mut p1, &mut p2)
        .brightness(display.brightness)
        .duration_ms(display.notif_time_ms);

    let bytes = encode_to_bytes(&mut msg).context("Failed to encode report")?;
    Ok(Some(bytes.to_vec()))
}

fn run_decode(args: &DecodeArgs, config: &DeckConfig) -> Result<()> {
    let input = &args.input;
    let ctx = DecodeContext {
        kind: args.message,
        config,
        run: args.run,
    };

    if let Some(ref text) = input.hex {
        let data = parse_hex(text)?;
        println!("{}", describe(&ctx, &data)?);
        Ok(())
    } else if let Some(ref file) = input.file {
        if !file.is_file() {
            bail!("Input path is not a file: {}", file.display());
        }
        let data = fs::read(file)
            .with_context(|| format!("Failed to read capture: {}", file.display()))?;
        let text = describe(&ctx, &data)
            .with_context(|| format!("Failed to decode {}", file.display()))?;
        println!("{}", text);
        Ok(())
    } else if let Some(ref directory) = input.directory {
        let summary = decode_directory(&ctx, directory)?;
        info!(
            "Summary: {} decoded, {} failed",
            summary.decoded, summary.failed
        );
        Ok(())
    } else {
        bail!("One of --hex, --file or --directory must be specified")
    }
}

/// Decode every capture file below `directory`, logging and skipping failures
fn decode_directory(ctx: &DecodeContext<'_>, directory: &Path) -> Result<DirectorySummary> {
    if !directory.is_dir() {
        bail!("Path is not a directory: {}", directory.display());
    }

    info!("Scanning directory: {}", directory.display());
    let mut summary = DirectorySummary::default();

    for entry in WalkDir::new(directory)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() || is_hidden(path) {
            continue;
        }

        if path.extension().and_then(|e| e.to_str()) != Some(CAPTURE_EXTENSION) {
            trace!("Skipping non-capture: {}", path.display());
            continue;
        }

        let result = fs::read(path)
            .with_context(|| format!("Failed to read capture: {}", path.display()))
            .and_then(|data| describe(ctx, &data));

        match result {
            Ok(text) => {
                println!("{}: {}", path.display(), text);
                summary.decoded += 1;
            }
            Err(e) => {
                warn!("Error decoding {}: {:#}", path.display(), e);
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}

/// Render one decoded message as a single line
fn describe(ctx: &DecodeContext<'_>, data: &[u8]) -> Result<String> {
    match ctx.kind {
        MessageKind::Button => {
            let msg: ButtonPushed = decode(data)?;
            handle_button(ctx, msg.number)
        }
        MessageKind::Text => Ok(describe_text(data)?),
    }
}

fn describe_text(data: &[u8]) -> communique_core::Result<String> {
    let mut line1 = LineBuffer::<LINE_CAPACITY>::new();
    let mut line2 = LineBuffer::<LINE_CAPACITY>::new();
    let (brightness, duration_ms, flash_led) = {
        let mut msg = DisplayText::incoming(&mut line1, &mut line2);
        decode_into(&mut msg, data)?;
        (msg.brightness, msg.duration_ms, msg.flash_led)
    };
    Ok(format!(
        "DisplayText line1={:?} line2={:?} brightness={} duration_ms={} flash_led={}",
        line1.as_str()?,
        line2.as_str()?,
        brightness,
        duration_ms,
        flash_led
    ))
}

/// Resolve a button press against the config, running its command if asked
fn handle_button(ctx: &DecodeContext<'_>, number: i32) -> Result<String> {
    let mut line = format!("ButtonPushed number={}", number);

    let Some(action) = ctx.config.button(number) else {
        warn!("No command configured for button {}", number);
        return Ok(line);
    };

    if let Some(ref message) = action.log_message {
        info!("{}", message);
    }

    if let Some(ref command) = action.command {
        line.push_str(&format!(" command={:?}", command));
        if ctx.run {
            run_command(command)?;
        }
    }

    if ctx.config.config.send_completed_notifs {
        if let Some(reply) = encode_report(action, &ctx.config.config.display)? {
            line.push_str(&format!(" reply={}", hex::encode(reply)));
        }
    }

    Ok(line)
}

fn run_command(command: &str) -> Result<()> {
    info!("Running: {}", command);
    let status = process::Command::new("sh")
        .arg("-c")
        .arg(command)
        .status()
        .with_context(|| format!("Failed to start command: {}", command))?;

    if !status.success() {
        bail!("Command `{}` failed ({})", command, status);
    }
    debug!("Command `{}` finished", command);
    Ok(())
}

/// Parse hex input, tolerating whitespace and a 0x prefix
fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let compact: String = text.split_whitespace().collect();
    let digits = compact
        .strip_prefix("0x")
        .or_else(|| compact.strip_prefix("0X"))
        .unwrap_or(&compact);
    hex::decode(digits).with_context(|| format!("Invalid hex input: {}", text))
}

fn run_schema(args: &SchemaArgs, verbose: u8) -> Result<()> {
    let exporter = ProtoExporter::deck()
        .context("Deck schemas are invalid")?
        .with_config(ExportConfig::new().package(args.package.as_str()));

    // Round-trip through a descriptor pool so broken output never reaches disk
    exporter
        .descriptor_pool()
        .context("Exported schema failed descriptor validation")?;

    let mut stats = StatsWriter::default();
    exporter
        .visit(&mut stats)
        .context("Failed to collect schema statistics")?;
    info!(
        "Exporting {} messages ({} fields, {} streamed)",
        stats.message_count, stats.field_count, stats.streamed_count
    );

    let content = exporter.render();
    let fingerprint = content_hash(&content);
    let output_path = args.output.join(exporter.file_name());

    if args.dry_run {
        println!("Would write: {} ({})", output_path.display(), fingerprint);
        if verbose > 0 {
            println!("---");
            println!("{}", content);
            println!("---");
        }
        return Ok(());
    }

    write_proto_file(&output_path, &content, args.force)?;
    println!("Wrote {} ({})", output_path.display(), fingerprint);
    Ok(())
}

/// Short hash of the content (first 8 chars of blake3)
fn content_hash(content: &str) -> String {
    let hash = blake3::hash(content.as_bytes());
    hash.to_hex()[..8].to_string()
}

/// Write a proto file to disk, refusing to overwrite unless forced
fn write_proto_file(output_path: &Path, content: &str, force: bool) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    if output_path.exists() && !force {
        bail!(
            "File already exists: {} (use --force to overwrite)",
            output_path.display()
        );
    }

    let mut file = fs::File::create(output_path)
        .with_context(|| format!("Failed to create file: {}", output_path.display()))?;

    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write file: {}", output_path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DECK: &str = r#"
[config]
send_completed_notifs = true

[config.display]
brightness = 40
notif_time_ms = 1500

[[command]]
command = "true"
log_message = "Building"
report_message = ["Build", "finished"]
"#;

    fn text_args(extra: &[&str]) -> TextArgs {
        let argv = ["communique", "encode", "text", "--columns", "16"]
            .iter()
            .chain(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Encode {
                message: EncodeMessage::Text(args),
            } => args,
            other => panic!("unexpected command {:?}", other),
        }
    }

    fn context(kind: MessageKind, config: &DeckConfig) -> DecodeContext<'_> {
        DecodeContext {
            kind,
            config,
            run: false,
        }
    }

    #[test]
    fn test_encode_button() {
        assert_eq!(encode_button(3).unwrap(), vec![0x08, 0x06]);
        assert_eq!(encode_button(0).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_encode_text_lines() {
        let args = text_args(&[
            "--line1",
            "HI",
            "--brightness",
            "100",
            "--duration-ms",
            "2000",
            "--flash-led",
        ]);
        assert_eq!(
            hex::encode(encode_text(&args, &DisplayConfig::default()).unwrap()),
            "0a02484918c80120a01f2801"
        );
    }

    #[test]
    fn test_encode_text_defaults() {
        let args = text_args(&["--text", "HELLO"]);
        assert_eq!(args.brightness, None);
        assert_eq!(args.duration_ms, None);

        let bytes = encode_text(&args, &DisplayConfig::default()).unwrap();
        assert_eq!(
            describe_text(&bytes).unwrap(),
            "DisplayText line1=\"HELLO\" line2=\"\" brightness=255 duration_ms=500 flash_led=false"
        );
    }

    #[test]
    fn test_encode_text_config_defaults() {
        let config: DeckConfig = DECK.parse().unwrap();
        let args = text_args(&["--text", "HELLO"]);
        let bytes = encode_text(&args, &config.config.display).unwrap();
        assert_eq!(
            describe_text(&bytes).unwrap(),
            "DisplayText line1=\"HELLO\" line2=\"\" brightness=40 duration_ms=1500 flash_led=false"
        );

        // Flags still win over the config
        let args = text_args(&["--text", "HELLO", "--brightness", "7"]);
        let bytes = encode_text(&args, &config.config.display).unwrap();
        assert!(describe_text(&bytes).unwrap().contains("brightness=7 "));
    }

    #[test]
    fn test_encode_text_config_columns() {
        let display = DisplayConfig {
            columns: 5,
            ..DisplayConfig::default()
        };
        let argv = ["communique", "encode", "text", "--text", "HELLOWORLD"];
        let args = match Cli::try_parse_from(argv).unwrap().command {
            Command::Encode {
                message: EncodeMessage::Text(args),
            } => args,
            other => panic!("unexpected command {:?}", other),
        };
        let bytes = encode_text(&args, &display).unwrap();
        let text = describe_text(&bytes).unwrap();
        assert!(text.contains("line1=\"HELLO\""));
        assert!(text.contains("line2=\"WORLD\""));
    }

    #[test]
    fn test_encode_text_wraps() {
        let args = text_args(&["--text", "Build finished successfully"]);
        let bytes = encode_text(&args, &DisplayConfig::default()).unwrap();
        let text = describe_text(&bytes).unwrap();
        assert!(text.contains("line1=\"Build finished s\""));
        assert!(text.contains("line2=\"uccessfully\""));
    }

    #[test]
    fn test_encode_text_capacity() {
        let args = text_args(&["--line1", "A LONG FIRST LINE", "--capacity", "8"]);
        let err = encode_text(&args, &DisplayConfig::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<communique_core::Error>(),
            Some(communique_core::Error::BufferFull { capacity: 8 })
        ));
    }

    #[test]
    fn test_text_conflicts_with_lines() {
        let parsed =
            Cli::try_parse_from(["communique", "encode", "text", "--text", "a", "--line1", "b"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("0806").unwrap(), vec![0x08, 0x06]);
        assert_eq!(parse_hex("0x08 06").unwrap(), vec![0x08, 0x06]);
        assert!(parse_hex("0g").is_err());
    }

    #[test]
    fn test_describe_button() {
        let config = DeckConfig::default();
        let ctx = context(MessageKind::Button, &config);
        assert_eq!(describe(&ctx, &[0x08, 0x06]).unwrap(), "ButtonPushed number=3");
        assert!(describe(&ctx, &[0x08]).is_err());
    }

    #[test]
    fn test_button_dispatch() {
        let config: DeckConfig = DECK.parse().unwrap();
        let ctx = context(MessageKind::Button, &config);

        // number 0 is omitted on the wire
        let line = describe(&ctx, &[]).unwrap();
        let (head, reply) = line.split_once(" reply=").unwrap();
        assert_eq!(head, "ButtonPushed number=0 command=\"true\"");

        let reply = parse_hex(reply).unwrap();
        assert_eq!(
            describe_text(&reply).unwrap(),
            "DisplayText line1=\"Build\" line2=\"finished\" brightness=40 duration_ms=1500 flash_led=false"
        );
    }

    #[test]
    fn test_unconfigured_button() {
        let config: DeckConfig = DECK.parse().unwrap();
        let ctx = context(MessageKind::Button, &config);
        assert_eq!(describe(&ctx, &[0x08, 0x02]).unwrap(), "ButtonPushed number=1");
        assert_eq!(describe(&ctx, &[0x08, 0x01]).unwrap(), "ButtonPushed number=-1");
    }

    #[test]
    fn test_report_without_notifs() {
        let config: DeckConfig = "[[command]]\ncommand = \"make\"\n".parse().unwrap();
        let ctx = context(MessageKind::Button, &config);
        assert_eq!(
            describe(&ctx, &[]).unwrap(),
            "ButtonPushed number=0 command=\"make\""
        );
        assert_eq!(
            encode_report(&config.commands[0], &config.config.display).unwrap(),
            None
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_run_command() {
        run_command("true").unwrap();
        let err = run_command("exit 3").unwrap_err();
        assert!(err.to_string().contains("exit 3"));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_failure_fails_decode() {
        let config: DeckConfig = "[[command]]\ncommand = \"false\"\n".parse().unwrap();
        let ctx = DecodeContext {
            kind: MessageKind::Button,
            config: &config,
            run: true,
        };
        assert!(describe(&ctx, &[]).is_err());
    }

    #[test]
    fn test_decode_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("session-1");
        fs::create_dir_all(&nested).unwrap();

        fs::write(temp_dir.path().join("a.bin"), [0x08, 0x06]).unwrap();
        fs::write(nested.join("b.bin"), [0x08, 0x02]).unwrap();
        fs::write(nested.join("broken.bin"), [0x08]).unwrap();
        fs::write(nested.join("notes.txt"), "not a capture").unwrap();
        fs::write(nested.join(".hidden.bin"), [0x08]).unwrap();

        let config = DeckConfig::default();
        let summary =
            decode_directory(&context(MessageKind::Button, &config), temp_dir.path()).unwrap();
        assert_eq!(
            summary,
            DirectorySummary {
                decoded: 2,
                failed: 1
            }
        );
    }

    #[test]
    fn test_decode_directory_missing() {
        let temp_dir = TempDir::new().unwrap();
        let config = DeckConfig::default();
        let ctx = context(MessageKind::Text, &config);
        assert!(decode_directory(&ctx, &temp_dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["communique", "encode", "button", "1", "--config", "deck.toml"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("deck.toml")));
    }

    #[test]
    fn test_write_proto_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out").join("communique.proto");

        write_proto_file(&path, "syntax = \"proto3\";\n", false).unwrap();
        assert!(write_proto_file(&path, "changed", false).is_err());

        write_proto_file(&path, "changed", true).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "changed");
    }

    #[test]
    fn test_run_schema() {
        let temp_dir = TempDir::new().unwrap();
        let args = SchemaArgs {
            output: temp_dir.path().to_path_buf(),
            package: "deck".to_string(),
            dry_run: false,
            force: false,
        };
        run_schema(&args, 0).unwrap();

        let written = fs::read_to_string(temp_dir.path().join("communique.proto")).unwrap();
        assert!(written.contains("package deck;"));
        assert!(written.contains("sint32 number = 1;"));

        // Second run without --force must not clobber the file
        assert!(run_schema(&args, 0).is_err());
    }

    #[test]
    fn test_schema_dry_run_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let args = SchemaArgs {
            output: temp_dir.path().to_path_buf(),
            package: String::new(),
            dry_run: true,
            force: false,
        };
        run_schema(&args, 0).unwrap();
        assert!(!temp_dir.path().join("communique.proto").exists());
    }

    #[test]
    fn test_content_hash() {
        let hash1 = content_hash("hello");
        let hash2 = content_hash("hello");
        let hash3 = content_hash("world");

        assert_eq!(hash1, hash2);
        assert_ne!(hash1, hash3);
        assert_eq!(hash1.len(), 8);
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
