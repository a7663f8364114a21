//! Terminal rendering of turn chunks

use std::io::{self, Write};

use anyhow::Result;
use twinchat_core::{ToolResult, TurnChunk};

/// How chunks are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Text inline, tool output as a titled block
    Pretty,
    /// One JSON object per chunk
    JsonLines,
}

/// Write one chunk
pub fn render_chunk(out: &mut impl Write, chunk: &TurnChunk, mode: OutputMode) -> Result<()> {
    match mode {
        OutputMode::JsonLines => {
            serde_json::to_writer(&mut *out, chunk)?;
            writeln!(out)?;
        }
        OutputMode::Pretty => match chunk {
            TurnChunk::Text { content } => write!(out, "{}", content)?,
            TurnChunk::ToolResult {
                tool_name, result, ..
            } => {
                writeln!(out, "[{}]", tool_name)?;
                match result {
                    ToolResult::Text(text) => writeln!(out, "{}", text)?,
                    ToolResult::Structured(value) => {
                        serde_json::to_writer_pretty(&mut *out, value)?;
                        writeln!(out)?;
                    }
                }
            }
            TurnChunk::Error {
                error_kind,
                message,
                retryable,
                ..
            } => {
                writeln!(out, "{}", message)?;
                let hint = if *retryable { ", try again" } else { "" };
                writeln!(out, "({}{})", error_kind, hint)?;
            }
        },
    }
    out.flush()?;
    Ok(())
}

/// Finish the line after a text reply
pub fn end_turn(out: &mut impl Write, last: Option<&TurnChunk>, mode: OutputMode) -> io::Result<()> {
    if mode == OutputMode::Pretty && matches!(last, Some(TurnChunk::Text { .. })) {
        writeln!(out)?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(chunks: &[TurnChunk], mode: OutputMode) -> String {
        let mut out = Vec::new();
        for chunk in chunks {
            render_chunk(&mut out, chunk, mode).unwrap();
        }
        end_turn(&mut out, chunks.last(), mode).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_pretty_text() {
        let out = render(&[TurnChunk::text("Hey "), TurnChunk::text("there!")], OutputMode::Pretty);
        assert_eq!(out, "Hey there!\n");
    }

    #[test]
    fn test_pretty_tool_result() {
        let chunk = TurnChunk::ToolResult {
            tool_name: "getResume".into(),
            call_id: "c1".into(),
            input: json!({}),
            result: ToolResult::structured(json!({"title": "Résumé"})),
        };
        let out = render(&[chunk], OutputMode::Pretty);
        assert!(out.starts_with("[getResume]\n"));
        assert!(out.contains("\"title\": \"Résumé\""));
    }

    #[test]
    fn test_json_lines() {
        let out = render(&[TurnChunk::text("a"), TurnChunk::text("b")], OutputMode::JsonLines);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"kind":"text","content":"a"}"#);
    }
}
