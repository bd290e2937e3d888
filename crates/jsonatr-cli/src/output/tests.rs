// Tests for output formatting
//
// These tests capture both streams to check that results and status
// messages never mix.

use super::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).expect("utf-8 output")
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn writer(quiet: bool, verbose: u8) -> (OutputWriter, SharedBuffer, SharedBuffer) {
    let out = SharedBuffer::default();
    let status = SharedBuffer::default();
    let writer = OutputWriter::with_writers(
        false,
        quiet,
        verbose,
        Box::new(out.clone()),
        Box::new(status.clone()),
    );
    (writer, out, status)
}

#[test]
fn test_json_styles() {
    let value = json!({"b": 1, "a": [true, null]});

    let (mut output, out, _) = writer(false, 0);
    output.json(&value, JsonStyle::Compact).unwrap();
    output.json(&value, JsonStyle::Pretty).unwrap();

    assert_eq!(
        out.contents(),
        "{\"b\":1,\"a\":[true,null]}\n{\n  \"b\": 1,\n  \"a\": [\n    true,\n    null\n  ]\n}\n"
    );
}

#[test]
fn test_style_from_flags() {
    assert_eq!(JsonStyle::from_flags(true, false), JsonStyle::Pretty);
    assert_eq!(JsonStyle::from_flags(true, true), JsonStyle::Compact);
    assert_eq!(JsonStyle::from_flags(false, false), JsonStyle::Compact);
}

#[test]
fn test_status_messages_stay_off_the_output_stream() {
    let (mut output, out, status) = writer(false, 1);
    output.info("loading").unwrap();
    output.success("done").unwrap();
    output.warning("careful").unwrap();
    output.json(&json!(1), JsonStyle::Compact).unwrap();

    assert_eq!(out.contents(), "1\n");
    assert_eq!(status.contents(), "INFO: loading\ndone\nWARNING: careful\n");
}

#[test]
fn test_quiet_and_default_verbosity() {
    let (mut output, _, status) = writer(true, 0);
    output.info("loading").unwrap();
    output.success("done").unwrap();
    output.warning("careful").unwrap();
    assert_eq!(status.contents(), "WARNING: careful\n");

    let (mut output, _, status) = writer(false, 0);
    output.info("loading").unwrap();
    output.success("done").unwrap();
    assert_eq!(status.contents(), "done\n");
}

#[test]
fn test_table_alignment() {
    let (mut output, out, _) = writer(false, 0);
    output.section("Transformers").unwrap();
    output
        .table(
            &["NAME", "KIND"],
            vec![
                vec!["count".to_string(), "builtin".to_string()],
                vec!["summary".to_string(), "internal".to_string()],
            ],
        )
        .unwrap();

    assert_eq!(
        out.contents(),
        "=== Transformers ===\n\
         NAME    │ KIND\n\
         ────────┼─────────\n\
         count   │ builtin\n\
         summary │ internal\n"
    );
}
