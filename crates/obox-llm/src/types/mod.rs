pub mod message;
pub mod request;

pub use message::{Part, Role, Turn};
pub use request::{GenerateContentRequest, SystemInstruction};
