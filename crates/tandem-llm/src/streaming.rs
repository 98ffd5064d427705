use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::Stream;

/// A parsed server-sent event frame.
#[derive(Debug, Clone)]
pub struct SseFrame {
    pub event: Option<String>,
    pub data: String,
}

/// Incremental decoder for the SSE line protocol.
///
/// Frames are separated by a blank line. Within a frame, `event:` and
/// `data:` fields are honored; comment lines (leading `:`) and unknown
/// fields are skipped. Multiple `data:` lines concatenate with newlines.
#[derive(Default)]
pub struct SseDecoder {
    buffer: String,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of text; returns every frame completed by it.
    pub fn feed(&mut self, chunk: &str) -> Vec<SseFrame> {
        self.buffer.push_str(chunk);
        // CRLF-normalize once instead of handling both separators below
        if self.buffer.contains('\r') {
            self.buffer = self.buffer.replace("\r\n", "\n");
        }

        let mut frames = Vec::new();
        while let Some(boundary) = self.buffer.find("\n\n") {
            let raw: String = self.buffer.drain(..boundary + 2).collect();

            let mut event = None;
            let mut data_lines: Vec<&str> = Vec::new();
            for line in raw.lines() {
                if line.starts_with(':') {
                    continue; // keep-alive comment
                }
                if let Some(rest) = line.strip_prefix("event:") {
                    event = Some(rest.trim_start().to_string());
                } else if let Some(rest) = line.strip_prefix("data:") {
                    data_lines.push(rest.strip_prefix(' ').unwrap_or(rest));
                }
            }

            if !data_lines.is_empty() {
                frames.push(SseFrame {
                    event,
                    data: data_lines.join("\n"),
                });
            }
        }
        frames
    }
}

/// Adapts a reqwest byte stream into a stream of SSE frames.
pub struct SseStream<S> {
    inner: S,
    decoder: SseDecoder,
    ready: VecDeque<SseFrame>,
}

impl<S> SseStream<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            decoder: SseDecoder::new(),
            ready: VecDeque::new(),
        }
    }
}

impl<S> Stream for SseStream<S>
where
    S: Stream<Item = std::result::Result<bytes::Bytes, reqwest::Error>> + Unpin,
{
    type Item = SseFrame;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if let Some(frame) = this.ready.pop_front() {
                return Poll::Ready(Some(frame));
            }

            match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => {
                    // Chunks can split UTF-8 sequences mid-character only at
                    // chunk boundaries of the transport; SSE payloads are
                    // ASCII-framed, so lossy decode is acceptable here.
                    let text = String::from_utf8_lossy(&bytes);
                    this.ready.extend(this.decoder.feed(&text));
                    // Loop: either a frame is ready now or we poll for more
                }
                Poll::Ready(Some(Err(_))) | Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoder_single_frame() {
        let mut dec = SseDecoder::new();
        let frames = dec.feed("event: message_start\ndata: {\"type\":\"message_start\"}\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event.as_deref(), Some("message_start"));
        assert_eq!(frames[0].data, "{\"type\":\"message_start\"}");
    }

    #[test]
    fn test_decoder_multiple_frames() {
        let mut dec = SseDecoder::new();
        let frames = dec.feed("data: {\"x\":1}\n\ndata: {\"x\":2}\n\n");
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].data, "{\"x\":2}");
    }

    #[test]
    fn test_decoder_split_across_chunks() {
        let mut dec = SseDecoder::new();
        assert!(dec.feed("data: {\"x\":").is_empty());
        let frames = dec.feed("1}\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "{\"x\":1}");
    }

    #[test]
    fn test_decoder_crlf_and_comments() {
        let mut dec = SseDecoder::new();
        let frames = dec.feed(": keep-alive\r\ndata: {\"ok\":true}\r\n\r\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "{\"ok\":true}");
    }

    #[test]
    fn test_decoder_multiline_data() {
        let mut dec = SseDecoder::new();
        let frames = dec.feed("data: line1\ndata: line2\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "line1\nline2");
    }
}
