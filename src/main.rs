//! Purpose: `hadata` CLI entry point for inspecting and decoding response payloads.
//! Role: Binary crate root; parses args, reads one JSON document, runs a command, emits JSON.
//! Invariants: Successful output is a single JSON document on stdout.
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
//! Invariants: All decoding goes through `api::Data` and `api::KeyPath`.
use std::error::Error as StdError;
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{
    CommandFactory, Parser, Subcommand, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind,
};
use clap_complete::aot::Shell;
use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;

mod color_json;
mod command_dispatch;

use color_json::colorize_json;
use hadata::api::{Data, DecodeError, Error, ErrorKind, KeyPath, format_timestamp, to_exit_code};
use hadata::json::parse;
use hadata::notice::{Notice, notice_json};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }
}

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome { exit_code });
            }
            _ => {
                let message = err
                    .to_string()
                    .lines()
                    .next()
                    .unwrap_or("invalid arguments")
                    .trim_start_matches("error: ")
                    .to_string();
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(message)
                        .with_hint("Run `hadata --help` for usage."),
                    ColorMode::Auto,
                ));
            }
        },
    };

    let color_mode = cli.color;
    command_dispatch::dispatch_command(cli.command, cli.input, color_mode)
        .map_err(add_decode_hint)
        .map_err(|err| (err, color_mode))
}

#[derive(Parser)]
#[command(
    name = "hadata",
    version,
    about = "Decode loosely-typed WebSocket response payloads into typed values",
    long_about = None,
    after_help = r#"EXAMPLES
  $ echo '{"result": [{"entity_id": "light.kitchen"}]}' | hadata get result.0.entity_id
  $ hadata --input event.json get event.time_fired --as date
  $ hadata --input states.json get result.0.attributes.brightness --as int --fallback 0
  $ hadata --input states.json classify"#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(
        long,
        global = true,
        help = "JSON payload to read (default: stdin; `-` also means stdin)",
        value_hint = ValueHint::FilePath
    )]
    input: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        default_value = "auto",
        help = "Colorize JSON output: auto|always|never"
    )]
    color: ColorMode,
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum TargetType {
    String,
    Bool,
    Int,
    Uint,
    Float,
    Date,
    Data,
    Array,
    Any,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Report the shape of the payload root")]
    Classify,
    #[command(
        about = "Decode the value at a dotted key path",
        after_help = r#"NOTES
  - Numeric segments index arrays (`result.0.entity_id`).
  - Dates must look like 2021-02-20T05:14:52.647932+00:00.
  - With --fallback, decode failures emit a notice on stderr and print the fallback."#
    )]
    Get {
        #[arg(help = "Dotted key path, e.g. result.0.entity_id")]
        path: String,
        #[arg(long = "as", value_enum, default_value = "any", help = "Requested type")]
        target: TargetType,
        #[arg(
            long,
            allow_hyphen_values = true,
            help = "JSON value returned when decoding fails"
        )]
        fallback: Option<String>,
    },
    #[command(about = "Generate shell completions")]
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
    #[command(about = "Print version info")]
    Version,
}

struct GetRequest {
    path: KeyPath,
    target: TargetType,
    fallback: Option<Value>,
}

impl GetRequest {
    fn from_args(path: &str, target: TargetType, fallback: Option<&str>) -> Result<Self, Error> {
        let path = KeyPath::parse(path)?;
        let fallback = fallback
            .map(|text| {
                parse::from_str::<Value>(text).map_err(|err| {
                    Error::new(ErrorKind::Usage)
                        .with_message("--fallback must be valid JSON")
                        .with_hint(parse::hint_for_error(&err, "--fallback"))
                        .with_source(err)
                })
            })
            .transpose()?;
        Ok(Self {
            path,
            target,
            fallback,
        })
    }
}

fn read_input(input: Option<&Path>) -> Result<Value, Error> {
    let (bytes, context) = match input {
        Some(path) if path != Path::new("-") => {
            let bytes = fs::read(path).map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message(format!("failed to read {}", path.display()))
                    .with_source(err)
            })?;
            (bytes, path.display().to_string())
        }
        _ => {
            let mut bytes = Vec::new();
            io::stdin().read_to_end(&mut bytes).map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("failed to read stdin")
                    .with_source(err)
            })?;
            (bytes, "stdin".to_string())
        }
    };
    parse::from_slice::<Value>(&bytes).map_err(|err| {
        Error::new(ErrorKind::Parse)
            .with_message("input is not valid JSON")
            .with_hint(parse::hint_for_error(&err, &context))
            .with_source(err)
    })
}

fn shape_json(data: &Data) -> Value {
    let mut out = Map::new();
    out.insert("shape".to_string(), json!(data.shape().as_str()));
    out.insert("len".to_string(), json!(data.len()));
    if let Data::Dictionary(_) = data {
        out.insert("keys".to_string(), json!(data.keys()));
    }
    Value::Object(out)
}

fn date_json(ts: time::OffsetDateTime) -> Result<Value, Error> {
    format_timestamp(ts)
        .map(Value::String)
        .ok_or_else(|| Error::new(ErrorKind::Internal).with_message("timestamp format failed"))
}

fn emit_json(value: Value, color_mode: ColorMode) {
    let is_tty = io::stdout().is_terminal();
    let use_color = color_mode.use_color(is_tty);
    let json = if is_tty || use_color {
        colorize_json(&value, use_color)
    } else {
        serde_json::to_string(&value)
            .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string())
    };
    println!("{json}");
}

fn notice_time_now() -> Option<String> {
    let duration = SystemTime::now().duration_since(UNIX_EPOCH).ok()?;
    let ts = time::OffsetDateTime::from_unix_timestamp_nanos(duration.as_nanos() as i128).ok()?;
    format_timestamp(ts)
}

fn emit_fallback_notice(path: &KeyPath, err: &DecodeError, fallback: &Value) {
    let notice = Notice::fallback("get", path.to_string(), err.clone(), fallback.clone())
        .with_time(notice_time_now().unwrap_or_default());
    if io::stderr().is_terminal() {
        eprintln!("notice: {} (path: {})", notice.message(), notice.path);
        return;
    }
    let json = serde_json::to_string(&notice_json(&notice)).unwrap_or_else(|_| {
        "{\"notice\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn add_decode_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Decode || err.hint().is_some() {
        return err;
    }
    let hint = match err.decode_error() {
        Some(DecodeError::MissingKey(_)) => {
            "Run `hadata classify` to list the keys present at the root."
        }
        Some(DecodeError::IncorrectType { .. }) => {
            "Pick a different --as type, or pass --fallback to substitute a default."
        }
        Some(DecodeError::OutOfBounds { .. }) => "Array indices start at 0.",
        Some(DecodeError::CouldntTransform { .. }) | None => return err,
    };
    err.with_hint(hint)
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
        ErrorKind::Parse => "parse error".to_string(),
        ErrorKind::Decode => "decode error".to_string(),
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
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(key) = err.key() {
        inner.insert("key".to_string(), json!(key));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let label = |text: &str, code: &str| {
        if use_color {
            format!("\u{1b}[{code}m{text}\u{1b}[0m")
        } else {
            text.to_string()
        }
    };
    let mut lines = vec![format!("{} {}", label("error:", "31"), error_message(err))];
    if let Some(hint) = err.hint() {
        lines.push(format!("{} {hint}", label("hint:", "33")));
    }
    if let Some(key) = err.key() {
        lines.push(format!("{} {key}", label("key:", "33")));
    }
    lines.join("\n")
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

#[cfg(test)]
mod tests {
    use super::{GetRequest, TargetType, add_decode_hint, error_json, shape_json};
    use hadata::api::{Data, DecodeError, Error, ErrorKind};
    use serde_json::json;

    #[test]
    fn shape_json_lists_keys_for_dictionaries() {
        let value = shape_json(&Data::new(json!({"b": 1, "a": 2})));
        assert_eq!(value, json!({"shape": "dictionary", "len": 2, "keys": ["a", "b"]}));
        let value = shape_json(&Data::new(json!([1, 2, 3])));
        assert_eq!(value, json!({"shape": "array", "len": 3}));
    }

    #[test]
    fn get_request_rejects_invalid_fallback_json() {
        let err = GetRequest::from_args("a.b", TargetType::Int, Some("{nope"))
            .err()
            .expect("invalid fallback");
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert!(err.hint().unwrap_or_default().contains("context: --fallback"));
    }

    #[test]
    fn decode_errors_get_actionable_hints() {
        let err = add_decode_hint(Error::from(DecodeError::missing_key("name")));
        assert!(err.hint().unwrap_or_default().contains("classify"));
        let err = add_decode_hint(Error::from(DecodeError::couldnt_transform("name")));
        assert_eq!(err.hint(), None);
    }

    #[test]
    fn error_json_carries_kind_key_and_causes() {
        let err = Error::from(DecodeError::incorrect_type("name", "Int", "String"));
        let value = error_json(&err);
        assert_eq!(value["error"]["kind"], "Decode");
        assert_eq!(value["error"]["key"], "name");
        assert_eq!(
            value["error"]["causes"][0],
            "key `name` expected Int, found String"
        );
    }
}
