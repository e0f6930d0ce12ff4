//! Server-sent event framing.
//!
//! [`FrameDecoder`] is a pull parser: push byte chunks in, pull decoded
//! messages out. It buffers until a blank line closes a frame, so chunk
//! boundaries may fall anywhere, including inside a UTF-8 sequence or
//! between `\r` and `\n`.
use super::{DecoderOptions, Sequencer, StreamEvent};
use crate::{codec, AnyValue, ResponsesError, ResponsesResult};
use std::collections::VecDeque;

/// Sentinel payload that ends a stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// The frame written after the last event.
pub const DONE_FRAME: &[u8] = b"data: [DONE]\n\n";

/// One decoded frame.
#[derive(Debug, Clone, PartialEq)]
pub enum SseMessage {
    Event(StreamEvent),
    /// The `[DONE]` sentinel. Distinct from the `done` event kind.
    Done,
}

#[derive(Debug, Default)]
struct PendingFrame {
    event: Option<String>,
    data: Vec<String>,
    size: usize,
    oversized: bool,
}

#[derive(Debug, Default)]
pub struct FrameDecoder {
    options: DecoderOptions,
    buffer: Vec<u8>,
    /// Bytes at the front of `buffer` already known to hold no line end.
    scanned: usize,
    /// Set while the rest of an overlong line is being dropped.
    discarding_line: bool,
    frame: PendingFrame,
    ready: VecDeque<ResponsesResult<SseMessage>>,
    finished: bool,
}

impl FrameDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_options(options: DecoderOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Feeds a chunk. Input after `[DONE]` or [`Self::finish`] is ignored.
    pub fn push(&mut self, chunk: &[u8]) {
        if self.finished {
            return;
        }
        self.buffer.extend_from_slice(chunk);

        let mut start = 0;
        let mut index = self.scanned;
        while index < self.buffer.len() && !self.finished {
            let terminator = match self.buffer[index] {
                b'\n' => 1,
                b'\r' => match self.buffer.get(index + 1) {
                    Some(b'\n') => 2,
                    Some(_) => 1,
                    // Wait for the next chunk to tell `\r` from `\r\n`.
                    None => break,
                },
                _ => {
                    index += 1;
                    continue;
                }
            };
            if self.discarding_line {
                self.frame.size += index - start;
                self.discarding_line = false;
            } else {
                let line = String::from_utf8_lossy(&self.buffer[start..index]).into_owned();
                self.process_line(&line);
            }
            index += terminator;
            start = index;
        }

        if self.finished {
            self.buffer.clear();
            self.scanned = 0;
            return;
        }
        self.buffer.drain(..start);
        self.scanned = index - start;
        self.limit_pending_line();
    }

    /// Counts the unterminated line against the frame limit. Once over it,
    /// the frame is marked oversized and the line is dropped as it arrives.
    fn limit_pending_line(&mut self) {
        let pending = self.buffer.len();
        if !self.discarding_line {
            let Some(max) = self.options.max_frame_bytes else {
                return;
            };
            if self.frame.size + pending <= max {
                return;
            }
            self.frame.oversized = true;
            self.frame.data.clear();
            self.discarding_line = true;
        }
        // A trailing `\r` may still pair with a `\n` in the next chunk.
        let keep = usize::from(self.buffer.last() == Some(&b'\r'));
        let dropped = pending - keep;
        self.frame.size += dropped;
        self.buffer.drain(..dropped);
        self.scanned = 0;
    }

    /// Signals the end of input. A frame without its closing blank line is
    /// discarded.
    pub fn finish(&mut self) {
        if !self.buffer.is_empty() || !self.frame.data.is_empty() {
            tracing::debug!(
                buffered = self.buffer.len(),
                "discarding incomplete frame at end of stream"
            );
        }
        self.buffer.clear();
        self.scanned = 0;
        self.discarding_line = false;
        self.frame = PendingFrame::default();
        self.finished = true;
    }

    /// Whether `[DONE]` was seen or [`Self::finish`] was called.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn process_line(&mut self, line: &str) {
        if line.is_empty() {
            self.dispatch();
            return;
        }
        if line.starts_with(':') {
            return;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        self.frame.size += line.len();
        if let Some(max) = self.options.max_frame_bytes {
            if self.frame.size > max {
                self.frame.oversized = true;
                self.frame.data.clear();
            }
        }
        if self.frame.oversized {
            return;
        }

        match field {
            "event" => self.frame.event = Some(value.to_string()),
            "data" => self.frame.data.push(value.to_string()),
            // `id` and `retry` carry nothing this protocol uses.
            _ => {}
        }
    }

    fn dispatch(&mut self) {
        let frame = std::mem::take(&mut self.frame);
        if frame.oversized {
            let max = self.options.max_frame_bytes.unwrap_or_default();
            tracing::warn!(size = frame.size, max, "dropping oversized frame");
            self.ready.push_back(Err(ResponsesError::decode(format!(
                "frame of {} bytes exceeds the limit of {max} bytes",
                frame.size
            ))));
            return;
        }
        if frame.data.is_empty() {
            return;
        }

        let data = frame.data.join("\n");
        if data.trim() == DONE_SENTINEL {
            self.ready.push_back(Ok(SseMessage::Done));
            self.finished = true;
            return;
        }

        let message = decode_event(&data, frame.event.as_deref()).map(SseMessage::Event);
        if let Err(error) = &message {
            tracing::warn!(%error, "failed to decode stream frame");
        }
        self.ready.push_back(message);
    }
}

impl Iterator for FrameDecoder {
    type Item = ResponsesResult<SseMessage>;

    fn next(&mut self) -> Option<Self::Item> {
        self.ready.pop_front()
    }
}

/// Parses a frame's `data` into an event. The `event:` line stands in for a
/// missing `type`.
fn decode_event(data: &str, event_name: Option<&str>) -> ResponsesResult<StreamEvent> {
    let mut value: AnyValue = codec::decode_str(data)?;
    if let (AnyValue::Object(map), Some(name)) = (&mut value, event_name) {
        if !map.contains_key("type") && !name.is_empty() && name != "message" {
            map.insert("type".to_string(), AnyValue::String(name.to_string()));
        }
    }
    StreamEvent::from_value(value)
}

/// Renders `event: <type>\ndata: <json>\n\n`. An event without a sequence
/// number takes the next one from `sequencer`.
pub fn encode_frame(event: &StreamEvent, sequencer: &Sequencer) -> ResponsesResult<Vec<u8>> {
    let json = if event.sequence_number.is_some() {
        codec::encode_to_string(event)?
    } else {
        let numbered = event.clone().with_sequence_number(sequencer.next());
        codec::encode_to_string(&numbered)?
    };
    Ok(format!("event: {}\ndata: {json}\n\n", event.type_str()).into_bytes())
}

/// Decodes a complete byte buffer, e.g. a recorded stream.
#[must_use]
pub fn decode_frames(bytes: &[u8]) -> Vec<ResponsesResult<SseMessage>> {
    let mut decoder = FrameDecoder::new();
    decoder.push(bytes);
    decoder.finish();
    decoder.collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::StreamEventKind;

    fn events(messages: Vec<ResponsesResult<SseMessage>>) -> Vec<SseMessage> {
        messages.into_iter().map(|m| m.unwrap()).collect()
    }

    #[test]
    fn splits_frames_across_arbitrary_chunks() {
        let wire = "event: response.output_text.delta\r\ndata: {\"type\":\"response.output_text.delta\",\"sequence_number\":1,\"delta\":\"H\u{e9}\"}\r\n\r\ndata: [DONE]\r\n\r\n";
        let mut decoder = FrameDecoder::new();
        for byte in wire.as_bytes() {
            decoder.push(std::slice::from_ref(byte));
        }
        let messages = events(decoder.by_ref().collect());
        assert_eq!(messages.len(), 2);
        match &messages[0] {
            SseMessage::Event(event) => {
                assert_eq!(event.kind(), StreamEventKind::OutputTextDelta);
                assert_eq!(event.delta_text(), Some("H\u{e9}"));
                assert_eq!(event.sequence_number(), Some(1));
            }
            other => panic!("expected event, got {other:?}"),
        }
        assert_eq!(messages[1], SseMessage::Done);
        assert!(decoder.is_finished());
    }

    #[test]
    fn joins_multi_line_data_and_skips_comments() {
        let wire = b": keep-alive\n\ndata: {\"type\":\"done\",\ndata: \"sequence_number\":3}\n\n";
        let messages = events(decode_frames(wire));
        assert_eq!(messages.len(), 1);
        match &messages[0] {
            SseMessage::Event(event) => {
                assert_eq!(event.kind(), StreamEventKind::Done);
                assert_eq!(event.sequence_number(), Some(3));
            }
            other => panic!("expected event, got {other:?}"),
        }
    }

    #[test]
    fn event_line_fills_in_missing_type() {
        let messages = events(decode_frames(
            b"event: response.created\ndata: {\"response\":null}\n\n",
        ));
        match &messages[0] {
            SseMessage::Event(event) => assert_eq!(event.kind(), StreamEventKind::ResponseCreated),
            other => panic!("expected event, got {other:?}"),
        }
    }

    #[test]
    fn malformed_frame_fails_alone() {
        let wire = b"data: {not json\n\ndata: {\"type\":\"done\"}\n\n";
        let messages = decode_frames(wire);
        assert_eq!(messages.len(), 2);
        assert!(matches!(messages[0], Err(ResponsesError::Decode(_))));
        assert!(matches!(messages[1], Ok(SseMessage::Event(_))));
    }

    #[test]
    fn partial_frame_is_discarded_on_finish() {
        let mut decoder = FrameDecoder::new();
        decoder.push(b"data: {\"type\":\"done\"}\n");
        decoder.finish();
        assert!(decoder.next().is_none());
    }

    #[test]
    fn input_after_done_is_ignored() {
        let messages = decode_frames(b"data: [DONE]\n\ndata: {\"type\":\"done\"}\n\n");
        assert_eq!(events(messages), vec![SseMessage::Done]);
    }

    #[test]
    fn oversized_frame_is_rejected() {
        let mut decoder = FrameDecoder::with_options(DecoderOptions {
            max_frame_bytes: Some(16),
        });
        decoder.push(b"data: {\"type\":\"done\",\"padding\":\"xxxxxxxxxxxxxxxx\"}\n\n");
        decoder.push(b"data: [DONE]\n\n");
        let messages: Vec<_> = decoder.collect();
        assert!(matches!(messages[0], Err(ResponsesError::Decode(_))));
        assert!(matches!(messages[1], Ok(SseMessage::Done)));
    }

    #[test]
    fn unterminated_line_is_bounded_by_the_frame_limit() {
        let mut decoder = FrameDecoder::with_options(DecoderOptions {
            max_frame_bytes: Some(64),
        });
        decoder.push(b"data: ");
        let chunk = vec![b'x'; 1024];
        for _ in 0..1024 {
            decoder.push(&chunk);
            assert!(decoder.buffer.len() <= 64);
        }
        decoder.push(b"\r");
        decoder.push(b"\n\ndata: {\"type\":\"done\"}\n\n");

        let messages: Vec<_> = decoder.collect();
        assert_eq!(messages.len(), 2);
        assert!(matches!(messages[0], Err(ResponsesError::Decode(_))));
        assert!(matches!(messages[1], Ok(SseMessage::Event(_))));
    }

    #[test]
    fn long_line_split_across_chunks_is_decoded() {
        let padding = "y".repeat(4096);
        let wire = format!("data: {{\"type\":\"done\",\"padding\":\"{padding}\"}}\n\n");
        let mut decoder = FrameDecoder::new();
        for piece in wire.as_bytes().chunks(3) {
            decoder.push(piece);
        }
        let messages = events(decoder.collect());
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn encode_assigns_sequence_number_once() {
        let sequencer = Sequencer::new(7);
        let frame = encode_frame(&StreamEvent::done(), &sequencer).unwrap();
        assert_eq!(
            String::from_utf8(frame).unwrap(),
            "event: done\ndata: {\"type\":\"done\",\"sequence_number\":7}\n\n"
        );

        let numbered = StreamEvent::done().with_sequence_number(42);
        encode_frame(&numbered, &sequencer).unwrap();
        assert_eq!(sequencer.peek(), 8);
    }
}
