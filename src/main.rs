//! Purpose: `event-envelope` CLI entry point and command dispatch.
//! Role: Binary crate root; parses args, decodes envelopes, emits JSON on stdout.
//! Invariants: Commands emit one JSON document per invocation on stdout.
//! Invariants: Errors are emitted as JSON on stderr (text when stderr is a terminal).
//! Invariants: Process exit code is derived from `api::to_exit_code`.
use std::error::Error as StdError;
use std::ffi::OsString;
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint, error::ErrorKind as ClapErrorKind};
use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;

mod envelope_json;

use envelope_json::{envelope_summary_json, registry_tags_json};
use event_envelope::api::{
    DecodeOptions, EnvelopeDecoder, Error, ErrorKind, PreviousAttributesPolicy,
    standard_registry, to_exit_code,
};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    init_tracing();
    let exit_code = match run(std::env::args_os()) {
        Ok(outcome) => outcome.exit_code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

#[derive(Parser)]
#[command(
    name = "event-envelope",
    version,
    about = "Decode event envelopes into typed payloads",
    long_about = None,
    after_help = r#"EXAMPLES
  $ event-envelope decode event.json
  $ echo '{"object":{"object":"charge","id":"ch_1"}}' | event-envelope decode
  $ event-envelope types

Set RUST_LOG=debug to trace dispatch decisions on stderr."#,
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode one envelope and print a summary of its payload and diff.
    Decode {
        #[arg(
            help = "Envelope JSON file (default: stdin; `-` also reads stdin)",
            value_hint = ValueHint::FilePath
        )]
        input: Option<PathBuf>,
        #[arg(
            long = "strict-previous-attributes",
            help = "Fail when previous_attributes is neither an object nor null"
        )]
        strict_previous_attributes: bool,
        #[arg(
            long = "allow-missing-object",
            help = "Accept envelopes without an object payload"
        )]
        allow_missing_object: bool,
    },
    /// List the registered payload tags and their record types.
    Types,
}

fn run<I>(args: I) -> Result<RunOutcome, Error>
where
    I: IntoIterator<Item = OsString>,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    Error::new(ErrorKind::Io)
                        .with_message("failed to write help")
                        .with_source(io_err)
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message(clap_error_summary(&err))
                    .with_hint("Try `event-envelope --help`."));
            }
        },
    };

    match cli.command {
        Command::Decode {
            input,
            strict_previous_attributes,
            allow_missing_object,
        } => {
            let policy = if strict_previous_attributes {
                PreviousAttributesPolicy::Reject
            } else {
                PreviousAttributesPolicy::Ignore
            };
            let options = DecodeOptions::new()
                .with_previous_attributes(policy)
                .with_require_object(!allow_missing_object);
            let text = read_input(input.as_ref())?;
            let json = serde_json::from_str::<Value>(&text).map_err(|err| {
                Error::new(ErrorKind::WrongShape)
                    .with_message("input is not valid JSON")
                    .with_hint("Pass a single JSON object holding `object` and optional `previous_attributes`.")
                    .with_source(err)
            })?;
            let envelope = EnvelopeDecoder::new(standard_registry())
                .with_options(options)
                .decode(&json)?;
            emit_json(&envelope_summary_json(&envelope))?;
        }
        Command::Types => {
            emit_json(&registry_tags_json(standard_registry()))?;
        }
    }
    Ok(RunOutcome::ok())
}

fn read_input(input: Option<&PathBuf>) -> Result<String, Error> {
    match input {
        Some(path) if path.as_os_str() != "-" => fs::read_to_string(path).map_err(|err| {
            let kind = if err.kind() == io::ErrorKind::NotFound {
                ErrorKind::Usage
            } else {
                ErrorKind::Io
            };
            Error::new(kind)
                .with_message(format!("failed to read {}", path.display()))
                .with_source(err)
        }),
        _ => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text).map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("failed to read stdin")
                    .with_source(err)
            })?;
            Ok(text)
        }
    }
}

fn emit_json(value: &Value) -> Result<(), Error> {
    let json = serde_json::to_string(value).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("json encode failed")
            .with_source(err)
    })?;
    println!("{json}");
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn emit_error(err: &Error) {
    if io::stderr().is_terminal() {
        eprintln!("{}", error_text(err));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::MissingField => "missing field".to_string(),
        ErrorKind::WrongShape => "unexpected JSON shape".to_string(),
        ErrorKind::Decode => "payload decode failed".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(field) = err.field() {
        inner.insert("field".to_string(), json!(field));
    }
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error) -> String {
    let mut lines = vec![format!("error: {}", error_message(err))];
    if let Some(field) = err.field() {
        lines.push(format!("field: {field}"));
    }
    if let Some(hint) = err.hint() {
        lines.push(format!("hint: {hint}"));
    }
    if let Some(cause) = error_causes(err).first() {
        lines.push(format!("caused by: {cause}"));
    }
    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}
