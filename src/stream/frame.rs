//! Incremental `text/event-stream` frame decoder.
//!
//! Bytes are buffered until a blank line closes a frame. Only the `event:`
//! and `data:` fields are read; `id:`, `retry:` and comments are ignored.

use crate::errors::FrameError;

/// Default cap on buffered, not yet terminated, stream data.
pub const DEFAULT_MAX_FRAME_BYTES: usize = 1024 * 1024;

const DEFAULT_EVENT: &str = "message";

/// One decoded server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: String,
    pub data: String,
}

#[derive(Debug, Default)]
pub struct DecodeReport {
    pub frames: Vec<SseFrame>,
    pub errors: Vec<FrameError>,
}

impl DecodeReport {
    fn push_frame(&mut self, frame: SseFrame) {
        self.frames.push(frame);
    }

    fn push_error(&mut self, err: FrameError) {
        self.errors.push(err);
    }
}

#[derive(Debug)]
pub struct SseDecoder {
    max_frame_bytes: usize,
    pending: Vec<u8>,
}

impl SseDecoder {
    pub fn new(max_frame_bytes: usize) -> Self {
        Self {
            max_frame_bytes,
            pending: Vec::new(),
        }
    }

    pub fn push_chunk(&mut self, chunk: &[u8]) -> DecodeReport {
        let mut report = DecodeReport::default();
        if !chunk.is_empty() {
            self.pending.extend_from_slice(chunk);
            normalize_line_endings(&mut self.pending);
        }

        while let Some(boundary) = find_boundary(&self.pending) {
            let raw: Vec<u8> = self.pending.drain(..boundary + 2).collect();
            report.push_frame(parse_frame(&raw[..boundary]));
        }

        if self.pending.len() > self.max_frame_bytes {
            report.push_error(FrameError::OversizedBuffer {
                size: self.pending.len(),
                max: self.max_frame_bytes,
            });
            self.pending.clear();
        }

        report
    }

    /// Bytes received but not yet closed by a blank line.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_BYTES)
    }
}

/// Rewrite every `\r\n` as `\n` in place. A trailing `\r` is kept so a pair
/// split across chunks is still collapsed on the next push.
fn normalize_line_endings(buf: &mut Vec<u8>) {
    if !buf.windows(2).any(|pair| pair == b"\r\n") {
        return;
    }
    let mut out = Vec::with_capacity(buf.len());
    let mut iter = buf.iter().copied().peekable();
    while let Some(byte) = iter.next() {
        if byte == b'\r' && iter.peek() == Some(&b'\n') {
            continue;
        }
        out.push(byte);
    }
    *buf = out;
}

fn find_boundary(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|pair| pair == b"\n\n")
}

fn parse_frame(raw: &[u8]) -> SseFrame {
    let text = String::from_utf8_lossy(raw);
    let mut event = DEFAULT_EVENT.to_string();
    let mut data = String::new();
    for line in text.split('\n') {
        if let Some(value) = line.strip_prefix("event:") {
            event = value.trim().to_string();
        } else if let Some(value) = line.strip_prefix("data:") {
            data.push_str(value.trim());
        }
    }
    SseFrame { event, data }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_single_frame() {
        let mut decoder = SseDecoder::default();
        let report = decoder.push_chunk(b"event: task\ndata: {\"a\":1}\n\n");
        assert_eq!(
            report.frames,
            vec![SseFrame {
                event: "task".to_string(),
                data: "{\"a\":1}".to_string()
            }]
        );
        assert!(report.errors.is_empty());
        assert_eq!(decoder.pending_len(), 0);
    }

    #[test]
    fn event_defaults_to_message() {
        let mut decoder = SseDecoder::default();
        let report = decoder.push_chunk(b"data: hi\n\n");
        assert_eq!(report.frames[0].event, "message");
        assert_eq!(report.frames[0].data, "hi");
    }

    #[test]
    fn frame_split_across_chunks() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.push_chunk(b"event: agent\nda").frames.is_empty());
        assert!(decoder.push_chunk(b"ta: {\"id\":\"a1\"}\n").frames.is_empty());
        let report = decoder.push_chunk(b"\nevent: agent\n");
        assert_eq!(report.frames.len(), 1);
        assert_eq!(report.frames[0].data, "{\"id\":\"a1\"}");
        assert!(decoder.pending_len() > 0);
    }

    #[test]
    fn crlf_is_normalised_even_when_split() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.push_chunk(b"event: memory\r\ndata: x\r").frames.is_empty());
        let report = decoder.push_chunk(b"\n\r\n");
        assert_eq!(report.frames.len(), 1);
        assert_eq!(report.frames[0].event, "memory");
        assert_eq!(report.frames[0].data, "x");
    }

    #[test]
    fn multiple_data_lines_are_concatenated_trimmed() {
        let mut decoder = SseDecoder::default();
        let report = decoder.push_chunk(b"data: {\"a\":\ndata:  1}\n\n");
        assert_eq!(report.frames[0].data, "{\"a\":1}");
    }

    #[test]
    fn comments_and_ids_are_ignored() {
        let mut decoder = SseDecoder::default();
        let report = decoder.push_chunk(b": keepalive\n\nid: 7\nevent: task\ndata: {}\n\n");
        assert_eq!(report.frames.len(), 2);
        assert_eq!(report.frames[0].data, "");
        assert_eq!(report.frames[1].event, "task");
    }

    #[test]
    fn oversized_pending_buffer_is_discarded() {
        let mut decoder = SseDecoder::new(16);
        let report = decoder.push_chunk(format!("data: {}", "x".repeat(32)).as_bytes());
        assert_eq!(report.errors.len(), 1);
        assert!(matches!(report.errors[0], FrameError::OversizedBuffer { max: 16, .. }));
        assert_eq!(decoder.pending_len(), 0);

        let report = decoder.push_chunk(b"data: ok\n\n");
        assert_eq!(report.frames[0].data, "ok");
    }
}
