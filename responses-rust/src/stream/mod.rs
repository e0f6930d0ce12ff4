//! The event-stream protocol: event kinds, sequence numbering, framing, and
//! reduction of events into application state.

mod emitter;
mod event;
mod event_stream;
mod frame;
mod kind;
mod options;
mod reducer;
mod sequencer;

pub use emitter::StreamEmitter;
pub use event::{EventType, StreamEvent};
pub use event_stream::{decode_byte_stream, EventStream};
pub use frame::{decode_frames, encode_frame, FrameDecoder, SseMessage, DONE_FRAME, DONE_SENTINEL};
pub use kind::StreamEventKind;
pub use options::{DecoderOptions, EmitterOptions};
pub use reducer::{
    reduce, reduce_message, ConversationMessage, ConversationStreamState, FileSearchPhase,
    ReasoningPhase, ResponsePhase, ToolCallPhase, WebSearchPhase,
};
pub use sequencer::Sequencer;
