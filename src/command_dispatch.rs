//! Purpose: Hold top-level CLI command dispatch for `hadata`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Each command reads the input document at most once.
//! Invariants: Fallback substitution is always reported as a notice, never silently.

use super::*;
use hadata::api::Decodable;

pub(super) fn dispatch_command(
    command: Command,
    input: Option<PathBuf>,
    color_mode: ColorMode,
) -> Result<RunOutcome, Error> {
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "hadata", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Version => {
            emit_json(
                json!({ "name": "hadata", "version": env!("CARGO_PKG_VERSION") }),
                color_mode,
            );
            Ok(RunOutcome::ok())
        }
        Command::Classify => {
            let data = Data::new(read_input(input.as_deref())?);
            tracing::debug!(shape = data.shape().as_str(), len = data.len(), "classified input");
            emit_json(shape_json(&data), color_mode);
            Ok(RunOutcome::ok())
        }
        Command::Get {
            path,
            target,
            fallback,
        } => {
            let request = GetRequest::from_args(&path, target, fallback.as_deref())?;
            let data = Data::new(read_input(input.as_deref())?);
            let value = run_get(&data, &request)?;
            emit_json(
                json!({
                    "path": request.path.to_string(),
                    "type": target_descriptor(request.target),
                    "value": value,
                }),
                color_mode,
            );
            Ok(RunOutcome::ok())
        }
    }
}

fn run_get(data: &Data, request: &GetRequest) -> Result<Value, Error> {
    match request.target {
        TargetType::String => resolve::<String>(data, request, |v| Ok(Value::String(v))),
        TargetType::Bool => resolve::<bool>(data, request, |v| Ok(Value::Bool(v))),
        TargetType::Int => resolve::<i64>(data, request, |v| Ok(json!(v))),
        TargetType::Uint => resolve::<u64>(data, request, |v| Ok(json!(v))),
        TargetType::Float => resolve::<f64>(data, request, |v| Ok(json!(v))),
        TargetType::Date => resolve::<time::OffsetDateTime>(data, request, date_json),
        TargetType::Data => resolve::<Data>(data, request, |v| {
            Ok(json!({ "shape": v.shape().as_str(), "data": v.into_value() }))
        }),
        TargetType::Array => resolve::<Vec<Data>>(data, request, |items| {
            Ok(Value::Array(items.iter().map(shape_json).collect()))
        }),
        TargetType::Any => resolve::<Value>(data, request, Ok),
    }
}

fn target_descriptor(target: TargetType) -> String {
    let descriptor = match target {
        TargetType::String => String::descriptor(),
        TargetType::Bool => bool::descriptor(),
        TargetType::Int => i64::descriptor(),
        TargetType::Uint => u64::descriptor(),
        TargetType::Float => f64::descriptor(),
        TargetType::Date => time::OffsetDateTime::descriptor(),
        TargetType::Data => Data::descriptor(),
        TargetType::Array => Vec::<Data>::descriptor(),
        TargetType::Any => Value::descriptor(),
    };
    descriptor.into_owned()
}

fn resolve<T: Decodable>(
    data: &Data,
    request: &GetRequest,
    render: impl Fn(T) -> Result<Value, Error>,
) -> Result<Value, Error> {
    let fallback = match &request.fallback {
        Some(raw) => Some(T::from_raw(raw).ok_or_else(|| {
            Error::new(ErrorKind::Usage)
                .with_message(format!("--fallback is not a valid {}", T::descriptor()))
        })?),
        None => None,
    };

    match (request.path.decode::<T>(data), fallback) {
        (Ok(value), _) => render(value),
        (Err(err), Some(fallback)) => {
            let rendered = render(fallback)?;
            emit_fallback_notice(&request.path, &err, &rendered);
            Ok(rendered)
        }
        (Err(err), None) => Err(Error::from(err).with_key(request.path.to_string())),
    }
}
