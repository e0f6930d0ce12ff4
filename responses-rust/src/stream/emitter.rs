use super::{encode_frame, EmitterOptions, Sequencer, StreamEvent, DONE_FRAME};
use crate::{ResponsesError, ResponsesResult};
use futures::{
    channel::mpsc::{self, Receiver, Sender},
    SinkExt,
};
use std::sync::Arc;

/// Producer side of a stream: numbers events, renders them as frames and
/// pushes the bytes into a channel read by the transport.
#[derive(Debug, Clone)]
pub struct StreamEmitter {
    sender: Sender<Vec<u8>>,
    sequencer: Arc<Sequencer>,
}

impl StreamEmitter {
    #[must_use]
    pub fn new(sender: Sender<Vec<u8>>, sequencer: Arc<Sequencer>) -> Self {
        Self { sender, sequencer }
    }

    /// Creates an emitter with its own sequencer and the receiving end of its
    /// channel.
    #[must_use]
    pub fn channel(options: &EmitterOptions) -> (Self, Receiver<Vec<u8>>) {
        let (sender, receiver) = mpsc::channel(options.channel_capacity);
        let sequencer = Arc::new(Sequencer::new(options.sequence_start));
        (Self::new(sender, sequencer), receiver)
    }

    #[must_use]
    pub fn sequencer(&self) -> &Arc<Sequencer> {
        &self.sequencer
    }

    /// Sends one event and returns the sequence number it went out with.
    /// Waits while the channel is full.
    pub async fn emit(&mut self, event: StreamEvent) -> ResponsesResult<u64> {
        let sequence_number = event
            .sequence_number
            .unwrap_or_else(|| self.sequencer.next());
        let event = event.with_sequence_number(sequence_number);
        let frame = encode_frame(&event, &self.sequencer)?;

        tracing::trace!(
            event_type = event.type_str(),
            sequence_number,
            "emitting stream event"
        );
        self.send(frame).await?;
        Ok(sequence_number)
    }

    /// Sends the `[DONE]` frame and closes the channel.
    pub async fn finish(mut self) -> ResponsesResult<()> {
        self.send(DONE_FRAME.to_vec()).await?;
        self.sender.close_channel();
        Ok(())
    }

    async fn send(&mut self, frame: Vec<u8>) -> ResponsesResult<()> {
        self.sender
            .send(frame)
            .await
            .map_err(|error| ResponsesError::Transport(Box::new(error)))
    }
}
