use crate::{
    any_value::{object_at, string_at, u64_at},
    stream::{EventStream, StreamEvent, StreamEventKind},
};
use futures::StreamExt;
use opentelemetry::trace::Status;
use std::time::Instant;
use tracing::{info_span, Span};
use tracing_futures::Instrument;
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Span covering one response stream from first byte to end.
pub struct StreamSpan {
    span: Span,
    start_time: Instant,
    event_count: u64,
    time_to_first_delta: Option<f64>,
    response_id: Option<String>,
    model: Option<String>,
    input_tokens: Option<u64>,
    output_tokens: Option<u64>,
    ended: bool,
}

impl StreamSpan {
    #[must_use]
    pub fn new() -> Self {
        let span = info_span!("open_responses.stream");
        span.set_attribute("gen_ai.operation.name", "response_stream");

        Self {
            span,
            start_time: Instant::now(),
            event_count: 0,
            time_to_first_delta: None,
            response_id: None,
            model: None,
            input_tokens: None,
            output_tokens: None,
            ended: false,
        }
    }

    fn span(&self) -> Span {
        self.span.clone()
    }

    pub fn on_event(&mut self, event: &StreamEvent) {
        self.event_count += 1;

        if event.delta_text().is_some() && self.time_to_first_delta.is_none() {
            self.time_to_first_delta = Some(self.elapsed_seconds());
        }

        if let Some(response) = object_at(&event.payload, "response") {
            if let Some(id) = string_at(response, "id") {
                self.response_id = Some(id.to_string());
            }
            if let Some(model) = string_at(response, "model") {
                self.model = Some(model.to_string());
            }
            if let Some(usage) = object_at(response, "usage") {
                self.input_tokens = u64_at(usage, "input_tokens");
                self.output_tokens = u64_at(usage, "output_tokens");
            }
        }

        if event.is_known_event_type() && event.kind() == StreamEventKind::Error {
            let message = event
                .stream_error()
                .and_then(|error| error.message)
                .unwrap_or_else(|| "stream error".to_string());
            self.span.set_status(Status::error(message));
        }
    }

    pub fn on_error(&mut self, error: &(dyn std::error::Error + 'static)) {
        self.span
            .set_attribute("exception.message", error.to_string());
        self.span.set_status(Status::error(error.to_string()));
    }

    pub fn on_end(&mut self) {
        if self.ended {
            return;
        }
        self.ended = true;

        if let Some(response_id) = &self.response_id {
            self.span
                .set_attribute("gen_ai.response.id", response_id.clone());
        }
        if let Some(model) = &self.model {
            self.span
                .set_attribute("gen_ai.response.model", model.clone());
        }
        if let Some(input_tokens) = self.input_tokens {
            self.span
                .set_attribute("gen_ai.usage.input_tokens", saturating_i64(input_tokens));
        }
        if let Some(output_tokens) = self.output_tokens {
            self.span
                .set_attribute("gen_ai.usage.output_tokens", saturating_i64(output_tokens));
        }
        if let Some(time_to_first_delta) = self.time_to_first_delta {
            self.span
                .set_attribute("gen_ai.server.time_to_first_token", time_to_first_delta);
        }
        self.span.set_attribute(
            "open_responses.event_count",
            saturating_i64(self.event_count),
        );
    }

    fn elapsed_seconds(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }
}

impl Default for StreamSpan {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for StreamSpan {
    fn drop(&mut self) {
        self.on_end();
    }
}

fn saturating_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Wraps an event stream in an `open_responses.stream` span. Events pass
/// through unchanged.
pub fn trace_event_stream(mut stream: EventStream<'_>) -> EventStream<'_> {
    let span = StreamSpan::new();
    let span_handle = span.span();
    let instrumented = async_stream::stream! {
        let mut span_state = span;

        while let Some(item) = stream.next().await {
            match &item {
                Ok(event) => span_state.on_event(event),
                Err(error) => span_state.on_error(error),
            }
            yield item;
        }
        span_state.on_end();
    }
    .instrument(span_handle);

    EventStream::from_stream(instrumented)
}
