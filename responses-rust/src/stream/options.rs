/// Options for [`super::FrameDecoder`] and the byte-stream adapters.
#[derive(Debug, Clone, Default)]
pub struct DecoderOptions {
    /// Largest accepted frame, counted over its field lines including a line
    /// still being received. Larger frames are dropped with a decode error and
    /// are never buffered past the limit. Unbounded when `None`.
    pub max_frame_bytes: Option<usize>,
}

/// Options for [`super::StreamEmitter::channel`].
#[derive(Debug, Clone)]
pub struct EmitterOptions {
    /// First sequence number handed out.
    pub sequence_start: u64,
    /// Frames buffered before `emit` waits on the consumer.
    pub channel_capacity: usize,
}

impl Default for EmitterOptions {
    fn default() -> Self {
        Self {
            sequence_start: 0,
            channel_capacity: 32,
        }
    }
}
