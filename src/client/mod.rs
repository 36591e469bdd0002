//! Client side of Recap: search dispatch, selection, re-summarization,
//! and audio playback over one [`SessionState`].

mod api;
mod audio;
mod dispatcher;
mod orchestrator;
mod session;

pub use api::{GatewayApi, HttpGateway};
pub use audio::{AudioController, AudioState};
pub use dispatcher::{Delivery, Dispatcher, PendingSearch};
pub use orchestrator::{Orchestrator, PendingSummary, ResummarizeOutcome};
pub use session::{
    Entry, FailureKind, FinalView, ListKind, Panel, SelectableList, SessionState, UiState,
};
