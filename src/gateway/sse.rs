//! Server-sent events decoding
//!
//! Turns the line-oriented `text/event-stream` body into discrete events.
//! Only the `event` and `data` fields are used; `id` and `retry` are ignored
//! since the client never reconnects on its own.

use futures::stream::Stream;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::core::ChatResult;

const DEFAULT_EVENT_NAME: &str = "message";

/// One dispatched server-sent event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event: String,
    pub data: String,
}

/// Incremental decoder fed one line at a time
#[derive(Debug, Default)]
pub struct SseDecoder {
    event: Option<String>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line (without its terminator)
    ///
    /// Returns an event when `line` is the blank line that ends one.
    pub fn push_line(&mut self, line: &str) -> Option<SseEvent> {
        let line = line.strip_suffix('\r').unwrap_or(line);

        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseEvent {
            event: event.unwrap_or_else(|| DEFAULT_EVENT_NAME.to_string()),
            data,
        })
    }
}

/// Decode a buffered event-stream body into a stream of events
///
/// An event left incomplete when the body ends is discarded.
pub fn sse_events<R>(reader: R) -> impl Stream<Item = ChatResult<SseEvent>>
where
    R: AsyncBufRead + Unpin,
{
    async_stream::try_stream! {
        let mut lines = reader.lines();
        let mut decoder = SseDecoder::new();

        while let Some(line) = lines.next_line().await? {
            if let Some(event) = decoder.push_line(&line) {
                yield event;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn decode_all(lines: &[&str]) -> Vec<SseEvent> {
        let mut decoder = SseDecoder::new();
        lines.iter().filter_map(|l| decoder.push_line(l)).collect()
    }

    #[test]
    fn test_named_event() {
        let events = decode_all(&["event: ui", r#"data: {"payload":{"message":"hi"}}"#, ""]);
        assert_eq!(
            events,
            vec![SseEvent {
                event: "ui".into(),
                data: r#"{"payload":{"message":"hi"}}"#.into(),
            }]
        );
    }

    #[test]
    fn test_multiline_data_and_default_name() {
        let events = decode_all(&["data: one", "data:two", "", "event: error", "data: boom\r", "\r"]);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event, "message");
        assert_eq!(events[0].data, "one\ntwo");
        assert_eq!(events[1].event, "error");
        assert_eq!(events[1].data, "boom");
    }

    #[test]
    fn test_comments_and_empty_events_are_skipped() {
        let events = decode_all(&[": keep-alive", "", "event: ui", "", "id: 7", "retry: 10", ""]);
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_stream_decoding_drops_trailing_partial_event() {
        let body = "event: ui\ndata: {}\n\nevent: ui\ndata: partial\n";
        let reader = tokio::io::BufReader::new(body.as_bytes());

        let events: Vec<_> = Box::pin(sse_events(reader)).collect().await;
        assert_eq!(events.len(), 1);
        let event = events.into_iter().next().unwrap().unwrap();
        assert_eq!(event.event, "ui");
        assert_eq!(event.data, "{}");
    }
}
