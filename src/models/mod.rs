pub mod content;
pub mod frame;
pub mod request;

pub use content::StructuredContent;
pub use frame::{FrameAction, FramePayload, StreamFrame};
pub use request::GenerateRequest;
