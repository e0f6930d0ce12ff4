use super::{DecoderOptions, FrameDecoder, SseMessage, StreamEvent};
use crate::{codec, ApiErrorBody, ResponsesError, ResponsesResult, TransportError};
use futures::{stream::BoxStream, Stream, StreamExt};
use std::{
    pin::Pin,
    task::{Context, Poll},
};

/// Decoded events of one response stream.
///
/// Malformed frames surface as `Err` items without ending the stream. The
/// stream ends at `[DONE]`, when the byte source ends, or after a transport
/// error.
pub struct EventStream<'a>(BoxStream<'a, ResponsesResult<StreamEvent>>);

impl<'a> EventStream<'a> {
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = ResponsesResult<StreamEvent>> + Send + 'a,
    {
        Self(Box::pin(stream))
    }
}

impl EventStream<'static> {
    /// Turns an already-sent HTTP response into an event stream. A
    /// non-success status is reported with the message from the API error
    /// body when there is one.
    pub async fn from_response(
        response: reqwest::Response,
        options: DecoderOptions,
    ) -> ResponsesResult<Self> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = codec::decode_str::<ApiErrorBody>(&body)
                .map_or(body, |api_error| api_error.error.message);
            tracing::warn!(%status, %message, "stream request was rejected");
            return Err(ResponsesError::StatusCode(status, message));
        }
        Ok(decode_byte_stream(response.bytes_stream(), options))
    }
}

impl Stream for EventStream<'_> {
    type Item = ResponsesResult<StreamEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.0.as_mut().poll_next(cx)
    }
}

/// Decodes a stream of byte chunks into events.
pub fn decode_byte_stream<'a, S, B, E>(bytes: S, options: DecoderOptions) -> EventStream<'a>
where
    S: Stream<Item = Result<B, E>> + Send + 'a,
    B: AsRef<[u8]> + Send + 'a,
    E: Into<TransportError> + Send + 'a,
{
    let stream = async_stream::stream! {
        let mut decoder = FrameDecoder::with_options(options);
        let mut bytes = Box::pin(bytes);
        let mut saw_done = false;

        'read: while let Some(chunk) = bytes.next().await {
            match chunk {
                Ok(chunk) => decoder.push(chunk.as_ref()),
                Err(error) => {
                    yield Err(ResponsesError::Transport(error.into()));
                    break;
                }
            }
            for message in decoder.by_ref() {
                match message {
                    Ok(SseMessage::Event(event)) => yield Ok(event),
                    Ok(SseMessage::Done) => {
                        saw_done = true;
                        break 'read;
                    }
                    Err(error) => yield Err(error),
                }
            }
        }

        if !saw_done {
            tracing::debug!("byte stream ended without [DONE]");
        }
        decoder.finish();
    };
    EventStream::from_stream(stream)
}
