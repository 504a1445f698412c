//! Domain model types (pure data, no I/O).

pub mod error;
pub mod key_action;
pub mod line;
pub mod notice;

pub use error::{PagerError, PatternError, StreamError};
pub use key_action::KeyAction;
pub use line::{
    chunk_at, ChunkSpan, Continuation, LineRecord, LineType, QuoteId, SearchChunk, StyleChunk,
};
pub use notice::Notice;
