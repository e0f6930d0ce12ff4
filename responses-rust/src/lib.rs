mod accumulator;
pub mod any_value;
pub mod codec;
mod content;
mod conversation;
mod errors;
pub mod opentelemetry;
mod output;
mod request;
mod response;
pub mod schema;
pub mod stream;
mod tool;
mod tool_call;
pub mod tool_choice;

pub use accumulator::ResponseAccumulator;
pub use any_value::{AnyMap, AnyValue};
pub use content::*;
pub use conversation::*;
pub use errors::*;
pub use output::*;
pub use request::*;
pub use response::*;
pub use schema::{BoolOrSchema, JsonSchema, PrimitiveType};
pub use tool::*;
pub use tool_call::*;
pub use tool_choice::{AllowedTool, ToolChoice, ToolChoiceMode, WireDirection};
