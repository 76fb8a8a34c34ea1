//! pond - run an event pipeline over JSON-lines input
//!
//! Reads events shaped `{"timestamp": "<rfc3339>", "data": {...}}` from a file
//! or stdin, applies the requested steps in order (select, script, window,
//! take) and prints every event that reaches the output as a JSON line.

use anyhow::{bail, Context};
use clap::Parser;
use crossbeam_channel::Sender;
use pond_rs::{
    config::EngineConfig,
    logging,
    pipeline::{
        nodes::{AggregateSpec, Reducer, ScriptSpec, SelectSpec, TakeSpec},
        BoundedInput, ChannelInput, Output, Pipeline, PipelineError, PipelineResult, Runner,
    },
    Event,
};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::thread::JoinHandle;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "pond",
    version,
    about = "Run a time-series event pipeline over JSON-lines input"
)]
struct Cli {
    /// Input file; stdin when omitted
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Configuration file
    #[arg(short, long, env = "POND_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Keep only these fields (comma separated)
    #[arg(long, value_delimiter = ',', value_name = "FIELDS")]
    select: Vec<String>,

    /// Rhai expression evaluated per event
    #[arg(long, value_name = "EXPR")]
    script: Option<String>,

    /// Field the script result is written to
    #[arg(long, default_value = "result")]
    script_field: String,

    /// Aggregation window, e.g. `500ms`, `30s`, `5m`, `1h` (bare numbers are seconds)
    #[arg(long, value_parser = parse_window, requires = "field")]
    window: Option<Duration>,

    /// Field to aggregate
    #[arg(long, requires = "window")]
    field: Option<String>,

    /// Reducer applied to each window
    #[arg(long, default_value = "avg")]
    reducer: Reducer,

    /// Stop after this many events reach the take step
    #[arg(long)]
    take: Option<usize>,

    /// Emit buffered state (e.g. the last open window) once input ends
    #[arg(long)]
    flush: bool,

    /// Stream stdin line by line instead of reading it up front. Events
    /// before a malformed line are processed; the line itself fails the run
    #[arg(long, conflicts_with = "input")]
    follow: bool,
}

fn parse_window(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    let split = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    let (number, unit) = s.split_at(split);
    let value: f64 = number
        .parse()
        .map_err(|_| format!("invalid window '{}'", s))?;
    let seconds = match unit.trim() {
        "" | "s" => value,
        "ms" => value / 1_000.0,
        "m" => value * 60.0,
        "h" => value * 3_600.0,
        other => return Err(format!("unknown window unit '{}'", other)),
    };
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(format!("window must be positive, got '{}'", s));
    }
    Ok(Duration::from_secs_f64(seconds))
}

fn build_pipeline(cli: &Cli) -> anyhow::Result<Pipeline> {
    let mut pipeline = Pipeline::new();

    if !cli.select.is_empty() {
        pipeline = pipeline.add_processor(SelectSpec::new(cli.select.iter().cloned()));
    }
    if let Some(source) = &cli.script {
        let spec = ScriptSpec::new(source.clone(), cli.script_field.clone())
            .context("Failed to compile script")?;
        pipeline = pipeline.add_processor(spec);
    }
    match (cli.window, &cli.field) {
        (Some(window), Some(field)) => {
            pipeline =
                pipeline.add_processor(AggregateSpec::new(window, field.clone(), cli.reducer)?);
        }
        (None, None) => {}
        _ => bail!("--window and --field must be given together"),
    }
    if let Some(limit) = cli.take {
        pipeline = pipeline.add_processor(TakeSpec::new(limit));
    }

    Ok(pipeline.attach_output(
        "stdout",
        Output::callback(|event: &Event| {
            let line = event.to_json_line()?;
            writeln!(std::io::stdout().lock(), "{}", line)?;
            Ok(())
        }),
    ))
}

/// Send JSON-lines events into `tx` until the reader ends or the receiving
/// run goes away. A malformed line ends the stream with the same error a
/// bounded read reports.
fn forward_json_lines(reader: impl BufRead, tx: Sender<Event>) -> PipelineResult<()> {
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let event = Event::from_json_line(&line)
            .map_err(|e| PipelineError::Input(format!("line {}: {}", lineno + 1, e)))?;
        if tx.send(event).is_err() {
            break;
        }
    }
    Ok(())
}

/// Feed stdin into a channel input from a reader thread.
fn follow_stdin() -> (ChannelInput, JoinHandle<PipelineResult<()>>) {
    let (tx, input) = ChannelInput::new(1024);
    let reader = std::thread::spawn(move || forward_json_lines(std::io::stdin().lock(), tx));
    (input.named("stdin"), reader)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = EngineConfig::load_or_default(cli.config.as_deref());
    let _guard = logging::init(&config.logging)?;

    let pipeline = build_pipeline(&cli)?;
    let (pipeline, reader) = if cli.follow {
        let (input, reader) = follow_stdin();
        (pipeline.with_input(input)?, Some(reader))
    } else {
        let input = match &cli.input {
            Some(path) => {
                let file = File::open(path)
                    .with_context(|| format!("Failed to open {}", path.display()))?;
                BoundedInput::from_json_lines(BufReader::new(file))?.named(path.display().to_string())
            }
            None => BoundedInput::from_json_lines(std::io::stdin().lock())?.named("stdin"),
        };
        (pipeline.with_input(input)?, None)
    };

    let mut runner = Runner::with_config(&pipeline, "stdout", config.runner.clone())?;
    runner.start(cli.flush || config.runner.force_flush)?;
    if let Some(reader) = reader {
        reader
            .join()
            .map_err(|_| anyhow::anyhow!("stdin reader panicked"))??;
    }

    let stats = runner.stats();
    tracing::info!(
        "Processed {} events, emitted {}",
        stats.events_in,
        stats.events_out
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_window_units() {
        assert_eq!(parse_window("30").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_window("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_window("5m").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_window("1h").unwrap(), Duration::from_secs(3_600));
        assert_eq!(parse_window("1.5s").unwrap(), Duration::from_millis(1_500));
    }

    #[test]
    fn test_parse_window_rejects_bad_input() {
        assert!(parse_window("0").is_err());
        assert!(parse_window("ten").is_err());
        assert!(parse_window("5d").is_err());
    }

    #[test]
    fn test_forward_json_lines_stops_at_malformed_line() {
        let input = concat!(
            r#"{"timestamp":"2024-01-01T00:00:00Z","data":{"value":1}}"#,
            "\n\n",
            "not json\n",
            r#"{"timestamp":"2024-01-01T00:00:01Z","data":{"value":2}}"#,
            "\n",
        );
        let (tx, rx) = crossbeam_channel::unbounded();

        let err = forward_json_lines(std::io::Cursor::new(input), tx).unwrap_err();
        assert!(matches!(&err, PipelineError::Input(msg) if msg.starts_with("line 3:")));

        let received: Vec<Event> = rx.try_iter().collect();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].get_f64("value"), Some(1.0));

        let bounded = BoundedInput::from_json_lines(std::io::Cursor::new(input)).unwrap_err();
        assert!(matches!(&bounded, PipelineError::Input(msg) if msg.starts_with("line 3:")));
    }

    #[test]
    fn test_cli_builds_chain_in_flag_order() {
        let cli = Cli::parse_from([
            "pond", "--select", "value,host", "--window", "1s", "--field", "value", "--take", "3",
        ]);
        let pipeline = build_pipeline(&cli).unwrap();
        let names: Vec<_> = pipeline.processors().iter().map(|s| s.name().to_string()).collect();
        assert_eq!(names, ["Select", "Aggregate(avg value)", "Take"]);
        assert_eq!(pipeline.outputs().len(), 1);
    }
}
