//! Interactive bencode parser.
//!
//! Each line is parsed as one bencode document. Successful parses print the
//! token tree (or JSON), failures print what was expected at the furthest
//! position. Lines starting with `:` are commands.

use std::io::{self, Write};

use strand_debug::{Explainer, FailureReport, Tracer, TracerConfig};
use strand_engine::{Parsed, ParserConfig};
use strand_foundation::{Error, Result};

use crate::bencode::{Bencode, BencodeGrammar};
use crate::editor::{LineEditor, ReadResult, RustylineEditor};
use crate::generate::{GenerateConfig, generate_document};
use crate::serialize;

const COMMANDS: [&str; 6] = [":help", ":trace", ":strict", ":json", ":generate", ":quit"];

const HELP: &str = "\
Enter a bencode document to parse it.

Commands:
  :help             Show this help
  :trace on|off     Print the parse trace after each document
  :strict on|off    Require the whole line to be one document (default on)
  :json on|off      Print decoded values as JSON instead of token trees
  :generate <seed>  Print a random document
  :quit             Exit";

/// What evaluating one line produced.
#[derive(Debug)]
pub enum Reply {
    /// A successful parse, formatted for display.
    Parsed(String),
    /// A failed parse.
    Failed(FailureReport),
    /// Output of a command.
    Message(String),
    /// Nothing to print.
    Nothing,
    /// The user asked to leave.
    Quit,
}

/// The interactive REPL.
pub struct Repl<E: LineEditor = RustylineEditor> {
    editor: E,
    grammar: BencodeGrammar,
    tracer: Tracer,
    strict: bool,
    json: bool,
    show_banner: bool,
    prompt: String,
}

impl Repl<RustylineEditor> {
    /// Creates a REPL on the terminal.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor fails to initialize.
    pub fn new() -> Result<Self> {
        Self::with_editor(RustylineEditor::new()?)
    }
}

impl<E: LineEditor> Repl<E> {
    /// Creates a REPL reading from the given editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the bencode grammar fails to build.
    pub fn with_editor(mut editor: E) -> Result<Self> {
        editor.set_commands(COMMANDS.iter().map(ToString::to_string).collect());
        Ok(Self {
            editor,
            grammar: BencodeGrammar::new()?,
            tracer: Tracer::new(TracerConfig::new()),
            strict: true,
            json: false,
            show_banner: true,
            prompt: "bencode> ".to_string(),
        })
    }

    /// Disables the welcome banner.
    #[must_use]
    pub fn without_banner(mut self) -> Self {
        self.show_banner = false;
        self
    }

    /// Sets the prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Starts with tracing on.
    #[must_use]
    pub fn with_trace(mut self) -> Self {
        self.tracer.enable();
        self
    }

    /// Starts with JSON output on.
    #[must_use]
    pub fn with_json(mut self) -> Self {
        self.json = true;
        self
    }

    /// Returns the tracer.
    #[must_use]
    pub fn tracer(&self) -> &Tracer {
        &self.tracer
    }

    /// Runs the loop until end of input or `:quit`.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from the editor fails.
    pub fn run(&mut self) -> Result<()> {
        if self.show_banner {
            Self::print_banner();
        }

        while self.read_eval_print()? {}

        println!();
        Ok(())
    }

    /// Returns `Ok(false)` when the loop should stop.
    fn read_eval_print(&mut self) -> Result<bool> {
        let line = match self.editor.read_line(&self.prompt)? {
            ReadResult::Line(line) => line,
            ReadResult::Interrupted => return Ok(true),
            ReadResult::Eof => return Ok(false),
        };
        if line.trim().is_empty() {
            return Ok(true);
        }
        self.editor.add_history(&line);

        let reply = self.eval(&line);
        if self.tracer.is_enabled() && !line.starts_with(':') {
            eprintln!("{}", self.tracer.format_last_parse());
        }
        match reply {
            Ok(Reply::Parsed(text)) => println!("\x1b[1m{text}\x1b[0m"),
            Ok(Reply::Failed(report)) => Self::print_failure(&report),
            Ok(Reply::Message(text)) => println!("{text}"),
            Ok(Reply::Nothing) => {}
            Ok(Reply::Quit) => return Ok(false),
            Err(e) => Self::print_error(&e),
        }
        Ok(true)
    }

    /// Evaluates one line: a command or a document.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown command or a fatal parse error.
    pub fn eval(&mut self, line: &str) -> Result<Reply> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(Reply::Nothing);
        }
        if trimmed.starts_with(':') {
            return self.command(trimmed);
        }
        self.parse_document(line.as_bytes())
    }

    fn parse_document(&mut self, input: &[u8]) -> Result<Reply> {
        let config = if self.strict {
            ParserConfig::strict()
        } else {
            ParserConfig::default()
        };
        let parser = self.grammar.parser().with_config(config);

        let mut explainer = Explainer::new();
        let outcome = parser.parse_with_observer(input, &mut (&mut self.tracer, &mut explainer));

        match outcome {
            Ok(parsed) => self.format_parsed(parsed).map(Reply::Parsed),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => explainer.report().map(Reply::Failed).ok_or(e),
        }
    }

    fn format_parsed(&self, parsed: Parsed) -> Result<String> {
        if self.json {
            let value = Bencode::from_token(&parsed.token)?;
            serialize::to_json(&value)
        } else {
            Ok(parsed.to_string())
        }
    }

    fn command(&mut self, line: &str) -> Result<Reply> {
        let mut words = line.split_whitespace();
        let name = words.next().unwrap_or_default();
        let argument = words.next();

        match name {
            ":help" | ":h" => Ok(Reply::Message(HELP.to_string())),
            ":quit" | ":q" => Ok(Reply::Quit),
            ":trace" => {
                if switch(name, argument)? {
                    self.tracer.enable();
                } else {
                    self.tracer.disable();
                }
                Ok(Reply::Nothing)
            }
            ":strict" => {
                self.strict = switch(name, argument)?;
                Ok(Reply::Nothing)
            }
            ":json" => {
                self.json = switch(name, argument)?;
                Ok(Reply::Nothing)
            }
            ":generate" => {
                let seed = argument
                    .and_then(|s| s.parse::<u64>().ok())
                    .ok_or_else(|| Error::internal("usage: :generate <seed>"))?;
                let document = generate_document(seed, &GenerateConfig::new());
                Ok(Reply::Message(document.escape_ascii().to_string()))
            }
            _ => Err(Error::internal(format!("unknown command: {name} (try :help)"))),
        }
    }

    fn print_failure(report: &FailureReport) {
        eprintln!("\x1b[31m{}\x1b[0m", report.to_string().trim_end());
    }

    fn print_error(error: &Error) {
        eprintln!("\x1b[31mError: {error}\x1b[0m");
    }

    fn print_banner() {
        println!("\x1b[1;36mStrand\x1b[0m bencode REPL v{}", env!("CARGO_PKG_VERSION"));
        println!("Type a document to parse it, :help for commands, Ctrl+D to exit.\n");
        let _ = io::stdout().flush();
    }
}

fn switch(command: &str, argument: Option<&str>) -> Result<bool> {
    match argument {
        Some("on") => Ok(true),
        Some("off") => Ok(false),
        _ => Err(Error::internal(format!("usage: {command} on|off"))),
    }
}
