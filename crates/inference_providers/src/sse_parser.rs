use crate::{extract_error_message, ChatCompletionChunk, CompletionError};
use bytes::Bytes;
use futures_util::Stream;
use std::collections::VecDeque;
use std::fmt::Display;
use std::pin::Pin;
use std::task::{Context, Poll};

/// SSE (Server-Sent Events) stream parser that properly handles buffering
/// of incomplete events across HTTP chunks
///
/// A single network chunk may carry several events; they are queued and
/// yielded one per poll. The stream ends at the `[DONE]` marker or when the
/// underlying body ends.
pub struct SSEParser<S> {
    inner: S,
    buffer: Vec<u8>,
    pending: VecDeque<Result<ChatCompletionChunk, CompletionError>>,
    finished: bool,
}

impl<S, E> SSEParser<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Display,
{
    pub fn new(stream: S) -> Self {
        Self {
            inner: stream,
            buffer: Vec::new(),
            pending: VecDeque::new(),
            finished: false,
        }
    }

    fn parse_data(data: &str) -> Result<Option<ChatCompletionChunk>, CompletionError> {
        // Handle end-of-stream marker
        if data == "[DONE]" {
            return Ok(None);
        }

        let json: serde_json::Value = serde_json::from_str(data).map_err(|_| {
            CompletionError::InvalidResponse("Invalid JSON in SSE event".to_string())
        })?;

        // Gateways report mid-stream failures as an error object in a data line
        if json.get("error").is_some() {
            return Err(CompletionError::CompletionError(extract_error_message(
                data,
            )));
        }

        serde_json::from_value::<ChatCompletionChunk>(json)
            .map(Some)
            .map_err(|e| CompletionError::InvalidResponse(e.to_string()))
    }

    fn process_line(&mut self, line: &str) {
        let line = line.trim();

        // Skip empty lines and comments (keep-alives)
        if line.is_empty() || line.starts_with(':') {
            return;
        }

        if let Some(data) = line.strip_prefix("data:") {
            match Self::parse_data(data.trim_start()) {
                Ok(Some(chunk)) => self.pending.push_back(Ok(chunk)),
                Ok(None) => self.finished = true,
                Err(e) => {
                    self.pending.push_back(Err(e));
                    self.finished = true;
                }
            }
        }
    }

    fn process_buffer(&mut self) {
        while !self.finished {
            let Some(newline_pos) = self.buffer.iter().position(|b| *b == b'\n') else {
                break;
            };
            let line_bytes: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
            let line = String::from_utf8_lossy(&line_bytes).into_owned();
            self.process_line(&line);
        }
    }
}

impl<S, E> Stream for SSEParser<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Display,
{
    type Item = Result<ChatCompletionChunk, CompletionError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if let Some(item) = this.pending.pop_front() {
                return Poll::Ready(Some(item));
            }
            if this.finished {
                return Poll::Ready(None);
            }

            match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => {
                    this.buffer.extend_from_slice(&bytes);
                    this.process_buffer();
                }
                Poll::Ready(Some(Err(e))) => {
                    this.finished = true;
                    return Poll::Ready(Some(Err(CompletionError::CompletionError(
                        e.to_string(),
                    ))));
                }
                Poll::Ready(None) => {
                    // Body ended: a trailing line without newline is still an event
                    if !this.buffer.is_empty() {
                        let rest = std::mem::take(&mut this.buffer);
                        let line = String::from_utf8_lossy(&rest).into_owned();
                        this.process_line(&line);
                    }
                    this.finished = true;
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
