//! Integration tests for the REPL

use strand_foundation::{ErrorKind, Result};
use strand_runtime::{LineEditor, ReadResult, Repl, Reply};

/// Replays a fixed script of lines.
struct ScriptedEditor {
    lines: Vec<String>,
    history: Vec<String>,
}

impl ScriptedEditor {
    fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().rev().map(ToString::to_string).collect(),
            history: Vec::new(),
        }
    }
}

impl LineEditor for ScriptedEditor {
    fn read_line(&mut self, _prompt: &str) -> Result<ReadResult> {
        Ok(self.lines.pop().map_or(ReadResult::Eof, ReadResult::Line))
    }

    fn add_history(&mut self, line: &str) {
        self.history.push(line.to_string());
    }

    fn set_commands(&mut self, _commands: Vec<String>) {}
}

fn repl() -> Repl<ScriptedEditor> {
    Repl::with_editor(ScriptedEditor::new(&[]))
        .unwrap()
        .without_banner()
}

#[test]
fn truncated_dictionary_reports_furthest_failure() {
    let mut repl = repl();
    let Reply::Failed(report) = repl.eval("d1:Xi1e1:Yi2e1:Z5:hello").unwrap() else {
        panic!("expected a failure");
    };
    assert_eq!(report.error.kind, ErrorKind::InputExhausted);
    assert_eq!(report.error.position, Some(23));
    assert!(report.expected.contains(&"'e'".to_string()));
    assert!(report.excerpt.ends_with('^'));
}

#[test]
fn json_mode_prints_values() {
    let mut repl = repl().with_json();
    let Reply::Parsed(text) = repl.eval("d1:ai1ee").unwrap() else {
        panic!("expected a parse");
    };
    assert_eq!(text, r#"{"a":1}"#);

    repl.eval(":json off").unwrap();
    let Reply::Parsed(text) = repl.eval("d1:ai1ee").unwrap() else {
        panic!("expected a parse");
    };
    assert!(text.ends_with("(8 bytes)"));
}

#[test]
fn help_lists_commands() {
    let mut repl = repl();
    let Reply::Message(help) = repl.eval(":help").unwrap() else {
        panic!("expected help");
    };
    for command in [":trace", ":strict", ":json", ":generate", ":quit"] {
        assert!(help.contains(command), "{command}");
    }
}

#[test]
fn scripted_session_runs_to_eof() {
    let editor = ScriptedEditor::new(&["i1e", ":trace on", "le", "bogus"]);
    let mut repl = Repl::with_editor(editor).unwrap().without_banner();
    repl.run().unwrap();
    assert_eq!(repl.tracer().parse_count(), 2);
}
