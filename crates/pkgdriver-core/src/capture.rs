//! Line-by-line capture of a readable text stream.
//!
//! Both readers treat a zero-byte/terminal read as end-of-stream rather than
//! as an empty line; genuinely empty lines in the middle of the stream are
//! preserved. Lines come back in exactly the order the stream produced them.

use std::io::{self, BufRead};

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::line_buffer::LineBuffer;

/// Read every line of `reader` until end-of-stream, blocking the caller.
///
/// Trailing `\n` / `\r\n` terminators are stripped from each line.
pub fn read_all_lines<R: BufRead>(mut reader: R) -> io::Result<Vec<String>> {
    let mut buffer = LineBuffer::new();
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        trim_line_ending(&mut line);
        buffer.append(line.clone());
    }
    Ok(buffer.into_lines())
}

/// Read lines until end-of-stream or until `cancel` is triggered.
///
/// The token is checked once before each line read, never mid-read: a read
/// already in flight completes before cancellation takes effect. That
/// line-sized granularity is part of the contract. Cancellation is not an
/// error; the lines captured so far come back as a valid partial result.
pub async fn read_all_lines_cancellable<R>(
    reader: R,
    cancel: &CancellationToken,
) -> io::Result<Vec<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut buffer = LineBuffer::new();
    let mut lines = reader.lines();
    loop {
        if cancel.is_cancelled() {
            debug!(captured = buffer.len(), "line capture cancelled, returning partial output");
            break;
        }
        match lines.next_line().await? {
            Some(line) => buffer.append(line),
            None => break,
        }
    }
    Ok(buffer.into_lines())
}

fn trim_line_ending(line: &mut String) {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
}
