//! Standalone one-shot mode over stdio.
//!
//! Bypasses the framing protocol entirely: read the whole source from
//! an input stream, run a single transform + encode cycle, and write
//! the pretty-printed document to an output stream. Used for offline
//! invocation (conventionally selected with a `-` argument by the
//! embedding process).
//!
//! # Important
//!
//! - **stdout**: the JSON document only
//! - **stderr**: logs (never parsed by the caller)

use std::io::{Read, Write};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Serializer;

use crate::codec::Document;
use crate::dispatch::Dispatcher;
use crate::error::Result;

/// Run one offline transform cycle between arbitrary streams.
///
/// Input bytes are decoded leniently (malformed sequences replaced).
/// The document is written 4-space-indented, newline-terminated, and
/// the output is flushed before returning.
///
/// # Errors
///
/// I/O failures on either stream and fatal encoding errors.
pub fn run_offline<R, W>(dispatcher: &Dispatcher, input: &mut R, output: &mut W) -> Result<()>
where
    R: Read,
    W: Write,
{
    let mut raw = Vec::new();
    input.read_to_end(&mut raw)?;
    let source = String::from_utf8_lossy(&raw);

    let doc = dispatcher.transform_to_document(&source)?;

    write_pretty(output, &doc)?;
    output.write_all(b"\n")?;
    output.flush()?;
    Ok(())
}

/// [`run_offline`] wired to the process's stdin and stdout.
pub fn run_stdin_stdout(dispatcher: &Dispatcher) -> Result<()> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run_offline(dispatcher, &mut stdin.lock(), &mut stdout.lock())
}

/// Serialize a document with 4-space indentation.
fn write_pretty<W: Write>(output: &mut W, doc: &Document) -> Result<()> {
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(output, formatter);
    doc.serialize(&mut serializer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{Attr, Scalar, TreeNode};
    use crate::transform::{CompileError, Transform};
    use serde_json::Value;
    use std::io::Cursor;
    use std::sync::Arc;

    struct StubTransform;

    struct SourceNode {
        source: String,
    }

    impl TreeNode for SourceNode {
        fn type_tag(&self) -> &str {
            "SourceNode"
        }
        fn attributes(&self) -> Vec<(String, Attr<'_>)> {
            vec![(
                "source".to_string(),
                Attr::Scalar(Scalar::Str(self.source.clone())),
            )]
        }
    }

    struct BadSourceNode;

    impl TreeNode for BadSourceNode {
        fn type_tag(&self) -> &str {
            "CompileError"
        }
        fn attributes(&self) -> Vec<(String, Attr<'_>)> {
            Vec::new()
        }
    }

    impl Transform for StubTransform {
        fn version(&self) -> &str {
            "2.0-test"
        }
        fn transform(&self, source: &str) -> std::result::Result<Box<dyn TreeNode>, CompileError> {
            if source.contains("bad") {
                Err(CompileError::new(Box::new(BadSourceNode)))
            } else {
                Ok(Box::new(SourceNode {
                    source: source.to_string(),
                }))
            }
        }
    }

    fn run(source: &[u8]) -> String {
        let dispatcher = Dispatcher::new(Arc::new(StubTransform));
        let mut input = Cursor::new(source.to_vec());
        let mut output = Vec::new();
        run_offline(&dispatcher, &mut input, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_offline_emits_parseable_document() {
        let text = run(b"x = 1");
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["__node__"], "Source");
        assert_eq!(value["__version__"], "2.0-test");
        assert_eq!(value["source"], "x = 1");
    }

    #[test]
    fn test_offline_uses_four_space_indent_and_trailing_newline() {
        let text = run(b"x = 1");
        assert!(text.contains("\n    \""), "expected 4-space indent: {text}");
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_offline_compile_error_marked() {
        let text = run(b"bad input");
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["__node__"], "CompileError");
        assert_eq!(value["is_error"], true);
    }

    #[test]
    fn test_offline_replaces_invalid_utf8() {
        let text = run(b"x = \xFF1");
        let value: Value = serde_json::from_str(&text).unwrap();
        let source = value["source"].as_str().unwrap();
        assert!(source.contains('\u{FFFD}'));
    }
}
