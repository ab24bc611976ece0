mod line_framer;
mod sse_parser;

pub use line_framer::LineFramer;
pub use sse_parser::{dispatch_line, Dispatch, Ignored, DATA_PREFIX};
