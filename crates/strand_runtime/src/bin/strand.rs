//! Strand CLI entry point.

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use strand_debug::{Explainer, FailureReport, Tracer, TracerConfig, caret_excerpt};
use strand_engine::{Parsed, ParserConfig};
use strand_runtime::serialize;
use strand_runtime::{Bencode, BencodeGrammar, GenerateConfig, Repl, generate_document};

/// CLI configuration parsed from arguments.
#[derive(Default)]
struct CliConfig {
    files: Vec<PathBuf>,
    literals: Vec<String>,
    show_help: bool,
    show_version: bool,
    json: bool,
    msgpack: bool,
    strict: bool,
    packrat: bool,
    generate: Option<u64>,
    repl: bool,
    // Debug flags
    trace: bool,
    trace_json: bool,
    explain: bool,
}

/// One document to parse and where it came from.
struct Input {
    label: String,
    bytes: Vec<u8>,
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("\x1b[31mError: {e}\x1b[0m");
            ExitCode::FAILURE
        }
    }
}

fn parse_args(args: Vec<String>) -> Result<CliConfig, Box<dyn std::error::Error>> {
    let mut config = CliConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => config.show_help = true,
            "-V" | "--version" => config.show_version = true,
            "-e" => {
                i += 1;
                if i >= args.len() {
                    return Err("-e requires a document".into());
                }
                config.literals.push(args[i].clone());
            }
            "--json" => config.json = true,
            "--msgpack" => config.msgpack = true,
            "--strict" => config.strict = true,
            "--packrat" => config.packrat = true,
            "--repl" => config.repl = true,
            "--trace" => config.trace = true,
            "--trace-json" => config.trace_json = true,
            "--explain" => config.explain = true,
            "--generate" => {
                i += 1;
                if i >= args.len() {
                    return Err("--generate requires a seed".into());
                }
                config.generate = Some(
                    args[i]
                        .parse()
                        .map_err(|_| format!("invalid --generate seed: {}", args[i]))?,
                );
            }
            arg if arg.starts_with('-') => {
                return Err(format!("unknown option: {arg}").into());
            }
            path => config.files.push(PathBuf::from(path)),
        }
        i += 1;
    }

    if config.json && config.msgpack {
        return Err("--json and --msgpack are mutually exclusive".into());
    }

    Ok(config)
}

/// Returns `Ok(false)` if any document failed to parse.
fn run(args: Vec<String>) -> Result<bool, Box<dyn std::error::Error>> {
    let config = parse_args(args)?;

    if config.show_help {
        print_help();
        return Ok(true);
    }

    if config.show_version {
        println!("strand {}", env!("CARGO_PKG_VERSION"));
        return Ok(true);
    }

    let mut inputs = Vec::new();
    if let Some(seed) = config.generate {
        let document = generate_document(seed, &GenerateConfig::new());
        println!("{}", document.escape_ascii());
        inputs.push(Input {
            label: format!("seed {seed}"),
            bytes: document,
        });
    }
    for literal in &config.literals {
        inputs.push(Input {
            label: "-e".to_string(),
            bytes: literal.clone().into_bytes(),
        });
    }
    for file in &config.files {
        let bytes = fs::read(file)
            .map_err(|e| format!("failed to read '{}': {e}", file.display()))?;
        inputs.push(Input {
            label: file.display().to_string(),
            bytes,
        });
    }

    if inputs.is_empty() || config.repl {
        let ok = parse_all(&config, &inputs)?;
        let mut repl = Repl::new()?;
        if config.trace || config.trace_json {
            repl = repl.with_trace();
        }
        if config.json {
            repl = repl.with_json();
        }
        if !inputs.is_empty() {
            repl = repl.without_banner();
        }
        repl.run()?;
        return Ok(ok);
    }

    parse_all(&config, &inputs)
}

fn parse_all(config: &CliConfig, inputs: &[Input]) -> Result<bool, Box<dyn std::error::Error>> {
    let grammar = BencodeGrammar::new()?;
    let mut parser_config = if config.strict {
        ParserConfig::strict()
    } else {
        ParserConfig::default()
    };
    if config.packrat {
        parser_config = parser_config.with_memoize(true);
    }
    let parser = grammar.parser().with_config(parser_config);

    let mut tracer_config = TracerConfig::new();
    if config.trace || config.trace_json {
        tracer_config = tracer_config.enabled().to_stderr();
    }
    if config.trace_json {
        tracer_config = tracer_config.json();
    }
    let mut tracer = Tracer::new(tracer_config);

    let mut all_ok = true;
    for input in inputs {
        let mut explainer = Explainer::new();
        let outcome = parser.parse_with_observer(&input.bytes, &mut (&mut tracer, &mut explainer));
        match outcome {
            Ok(parsed) => print_parsed(config, &parsed)?,
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                all_ok = false;
                eprintln!("\x1b[31mError: {}: {e}\x1b[0m", input.label);
                match explainer.report() {
                    Some(report) if config.explain => print_report(&report),
                    _ => eprintln!("{}", caret_excerpt(&input.bytes, e.position.unwrap_or(0))),
                }
            }
        }
    }
    Ok(all_ok)
}

fn print_parsed(config: &CliConfig, parsed: &Parsed) -> Result<(), Box<dyn std::error::Error>> {
    if config.msgpack {
        let bytes = serialize::to_msgpack(&parsed.token)?;
        let mut stdout = io::stdout();
        stdout.write_all(&bytes)?;
        stdout.flush()?;
    } else if config.json {
        let value = Bencode::from_token(&parsed.token)?;
        println!("{}", serialize::to_json_pretty(&value)?);
    } else {
        println!("{parsed}");
    }
    Ok(())
}

fn print_report(report: &FailureReport) {
    match report.expected.as_slice() {
        [] => {}
        [only] => eprintln!("expected: {only}"),
        many => eprintln!("expected one of: {}", many.join(", ")),
    }
    eprintln!("{}", report.excerpt);
}

fn print_help() {
    println!(
        "\x1b[1mStrand\x1b[0m - Parser combinators for byte buffers

\x1b[1mUSAGE:\x1b[0m
    strand [OPTIONS] [FILES...]

\x1b[1mARGUMENTS:\x1b[0m
    [FILES...]    Bencode files to parse

\x1b[1mOPTIONS:\x1b[0m
    -h, --help         Print help information
    -V, --version      Print version information
    -e DOCUMENT        Parse DOCUMENT given on the command line
    --json             Print decoded values as JSON
    --msgpack          Write token trees as MessagePack to stdout
    --strict           Reject input left over after the document
    --packrat          Memoize node results
    --generate SEED    Print and parse a random document
    --repl             Start the REPL after parsing any inputs

\x1b[1mDEBUG OPTIONS:\x1b[0m
    --trace            Trace node invocations to stderr
    --trace-json       Trace as JSON records
    --explain          List what was expected where a parse failed

\x1b[1mEXAMPLES:\x1b[0m
    strand                              Start the REPL
    strand torrent.bencode              Parse a file
    strand --json -e d1:ai1ee           Parse a literal and print JSON
    strand --strict --explain -e li1e   Show why a document is rejected
    strand --generate 42                Print and parse a random document

\x1b[1mREPL COMMANDS:\x1b[0m
    :help                Show commands
    :trace on|off        Print the parse trace after each document
    :strict on|off       Require each line to be exactly one document
    :json on|off         Print JSON instead of token trees
    :generate SEED       Print a random document
    Ctrl+D               Exit REPL"
    );
}
