//! Pager state.
//!
//! Search state is a pure state machine; [`PagerSession`] drives the line
//! store, classifier and painter for one text.

pub mod search;
pub mod session;

pub use search::{SearchDirection, SearchQuery, SearchState};
pub use session::{
    PagerOptions, PagerSession, Progress, RenderStatus, ResumePosition, SessionSummary, Viewport,
};
