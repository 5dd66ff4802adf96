use std::env;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::process;

use index_parser::{IndexRecord, RecordStream, StreamError};

fn main() {
    if let Err(err) = run() {
        eprintln!("{}: {err}", env!("CARGO_PKG_NAME"));
        process::exit(1);
    }
}

/// What to print once the payload validates.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Pretty JSON array, printed only after every record passed.
    Pretty,
    /// One compact record per line, written as records stream in.
    Lines,
    /// Just the number of records.
    Count,
}

fn run() -> Result<(), String> {
    let mut args = env::args();
    let program = args
        .next()
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());

    let mut mode = Mode::Pretty;
    let mut input = None;
    for arg in args {
        match arg.as_str() {
            "-h" | "--help" => {
                println!("{}", help(&program));
                return Ok(());
            }
            "-V" | "--version" => {
                println!("{}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--jsonl" => mode = Mode::Lines,
            "--count" => mode = Mode::Count,
            flag if flag.starts_with("--") => {
                return Err(format!("unknown option: {flag}\n{}", usage(&program)));
            }
            _ if input.is_some() => {
                return Err(format!("unexpected argument: {arg}\n{}", usage(&program)));
            }
            _ => input = Some(arg),
        }
    }

    match input.as_deref() {
        None | Some("-") => emit(io::stdin().lock(), "stdin", mode),
        Some(path) => {
            let file =
                File::open(path).map_err(|err| format!("failed to open '{path}': {err}"))?;
            emit(file, path, mode)
        }
    }
}

fn emit<R: Read>(reader: R, label: &str, mode: Mode) -> Result<(), String> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut records = Vec::new();
    let mut write_failure = None;

    let count = RecordStream::new(reader)
        .for_each(|record| match mode {
            Mode::Pretty => records.push(record),
            Mode::Lines if write_failure.is_none() => {
                if let Err(err) = write_line(&mut out, &record) {
                    write_failure = Some(err);
                }
            }
            Mode::Lines | Mode::Count => {}
        })
        .map_err(|err| describe(err, label))?;
    if let Some(err) = write_failure {
        return Err(err);
    }

    match mode {
        Mode::Pretty => {
            let json = serde_json::to_string_pretty(&records)
                .map_err(|err| format!("failed to serialize JSON: {err}"))?;
            writeln!(out, "{json}").map_err(|err| format!("failed to write output: {err}"))?;
        }
        Mode::Count => {
            writeln!(out, "{count}").map_err(|err| format!("failed to write output: {err}"))?;
        }
        Mode::Lines => {}
    }
    out.flush()
        .map_err(|err| format!("failed to write output: {err}"))
}

fn write_line<W: Write>(out: &mut W, record: &IndexRecord) -> Result<(), String> {
    serde_json::to_writer(&mut *out, record)
        .map_err(|err| format!("failed to serialize JSON: {err}"))?;
    writeln!(out).map_err(|err| format!("failed to write output: {err}"))
}

fn describe(err: StreamError, label: &str) -> String {
    match err {
        StreamError::Io(err) => format!("failed to read {label}: {err}"),
        StreamError::Malformed(err) => format!("{label}: {err}"),
    }
}

fn help(program: &str) -> String {
    format!(
        "{}\n\n\
         Accepted payloads:\n  \
         var documenterSearchIndex = {{\"docs\": [...]}};   script assignment (var, let or const)\n  \
         {{\"docs\": [...]}}                                 bare JSON object\n\n\
         Every record needs string fields location, page, title, text and category.\n\n\
         Options:\n  \
         --jsonl         Stream one compact record per line instead of a pretty array\n  \
         --count         Print only the number of validated records\n  \
         -h, --help      Show this message\n  \
         -V, --version   Print package version",
        usage(program)
    )
}

fn usage(program: &str) -> String {
    format!(
        "Usage: {program} [--jsonl|--count] [INDEX_FILE|-]\n\n\
         Validates a documentation search index and prints its records as JSON. \
         Reads stdin when INDEX_FILE is '-' or omitted."
    )
}
