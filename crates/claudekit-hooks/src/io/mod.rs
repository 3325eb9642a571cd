//! JSON I/O with the host: payload intake and response emission

mod payload;
mod processor;
pub mod response;

pub use payload::{EditOperation, HookPayload};
pub use processor::StdinProcessor;
pub use response::{RenderedResponse, render};
