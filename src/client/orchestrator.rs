//! Selection, re-summarization, and navigation between the results and
//! final-summary screens.

use super::api::GatewayApi;
use super::session::{FailureKind, FinalView, ListKind, SessionState, UiState};
use crate::error::{RecapError, Result};
use crate::models::{AudioClip, ResummarizeReply, ResummarizeRequest, ResummarizeResult};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// How a re-summarize call ended. Exactly one applies per response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResummarizeOutcome {
    Success(ResummarizeResult),
    /// A readable answer that reported failure.
    ApplicationError { message: String },
    /// The call failed or the answer was unreadable.
    TransportFailure { message: String },
}

impl ResummarizeOutcome {
    /// Classify the raw result of a re-summarize call.
    pub fn classify(reply: Result<ResummarizeReply>) -> Self {
        match reply {
            Ok(reply) => match reply.into_result() {
                Ok(result) => ResummarizeOutcome::Success(result),
                Err(message) => ResummarizeOutcome::ApplicationError { message },
            },
            Err(e) => ResummarizeOutcome::TransportFailure {
                message: e.to_string(),
            },
        }
    }
}

/// A re-summarize request issued from the results of one search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSummary {
    generation: u64,
    pub request: ResummarizeRequest,
}

impl PendingSummary {
    /// Generation of the search whose results were summarized.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Drives selection and the results/final-summary flow.
pub struct Orchestrator {
    api: Arc<dyn GatewayApi>,
}

impl Orchestrator {
    pub fn new(api: Arc<dyn GatewayApi>) -> Self {
        Self { api }
    }

    /// Select or unselect one item. Unknown keys are rejected.
    pub fn select(
        &self,
        session: &mut SessionState,
        list: ListKind,
        key: &str,
        selected: bool,
    ) -> Result<()> {
        if session.set_selected(list, key, selected) {
            Ok(())
        } else {
            Err(RecapError::Validation(format!("No {} item with key {}", list, key)))
        }
    }

    /// Select every item of one list.
    pub fn select_all(&self, session: &mut SessionState, list: ListKind) {
        session.set_all(list, true);
    }

    /// Collect the selection, snapshot the lists, and leave the results
    /// screen. No request is issued here.
    pub fn begin_resummarize(&self, session: &mut SessionState) -> Result<PendingSummary> {
        if !session.trigger_enabled {
            return Err(RecapError::Validation(
                "A summary request is already in progress".to_string(),
            ));
        }
        if session.screen != UiState::ResultsShown {
            return Err(RecapError::Validation(
                "There are no results to summarize".to_string(),
            ));
        }

        let request = match ResummarizeRequest::new(session.selected_originals()) {
            Ok(request) => request,
            Err(e) => {
                session.prompt = Some(e.to_string());
                return Err(e);
            }
        };

        session.prompt = None;
        session.snapshot();
        session.screen = UiState::Resummarizing;
        session.final_view = FinalView::Pending;
        session.trigger_enabled = false;
        Ok(PendingSummary {
            generation: session.generation(),
            request,
        })
    }

    /// Settle an in-flight request and render its outcome.
    ///
    /// The outcome is only rendered while the session still waits on this
    /// request. A reply arriving after the user navigated away is returned
    /// but leaves the screen and audio untouched.
    pub fn complete(
        &self,
        session: &mut SessionState,
        pending: PendingSummary,
        reply: Result<ResummarizeReply>,
    ) -> ResummarizeOutcome {
        session.trigger_enabled = true;
        let outcome = ResummarizeOutcome::classify(reply);
        if session.screen == UiState::Resummarizing && session.is_current(pending.generation) {
            render_outcome(session, &outcome);
        } else {
            debug!(
                generation = pending.generation,
                current = session.generation(),
                "discarding summary for a screen that is no longer shown"
            );
        }
        outcome
    }

    /// Re-summarize the selected originals.
    ///
    /// Errors only when nothing can be sent; every response, including a
    /// failed call, comes back as an outcome.
    #[instrument(skip(self, session))]
    pub async fn resummarize(&self, session: &mut SessionState) -> Result<ResummarizeOutcome> {
        let pending = self.begin_resummarize(session)?;
        info!(
            originals = pending.request.originals.len(),
            "requesting consolidated summary"
        );

        let reply = self.api.resummarize(&pending.request).await;
        if let Err(e) = &reply {
            warn!("Re-summarize failed: {}", e);
        }
        Ok(self.complete(session, pending, reply))
    }

    /// Fetch and start the audio attached to the final summary.
    pub async fn play_audio<'s>(&self, session: &'s mut SessionState) -> Result<&'s AudioClip> {
        if session.screen != UiState::FinalShown {
            return Err(RecapError::Validation("No audio is available".to_string()));
        }
        session.audio.play(self.api.as_ref()).await
    }

    /// Return to the lists as they were when re-summarization began.
    ///
    /// Allowed from the final-summary screen, and again right after a
    /// previous restore while the snapshot is still held.
    pub fn back_to_results(&self, session: &mut SessionState) -> Result<()> {
        let restorable = match session.screen {
            UiState::FinalShown => true,
            UiState::ResultsShown => session.has_snapshot(),
            _ => false,
        };
        if !restorable {
            return Err(RecapError::Validation(
                "There are no previous results to return to".to_string(),
            ));
        }

        session.audio.stop();
        session.restore_snapshot();
        session.final_view = FinalView::Hidden;
        session.prompt = None;
        session.screen = UiState::ResultsShown;
        Ok(())
    }

    /// Discard everything and return to an empty search screen.
    pub fn start_new_search(&self, session: &mut SessionState) {
        session.reset();
    }
}

/// Single render step for every outcome.
fn render_outcome(session: &mut SessionState, outcome: &ResummarizeOutcome) {
    session.audio.stop();
    session.final_view = match outcome {
        ResummarizeOutcome::Success(result) => {
            if let Some(audio) = &result.audio_ref {
                session.audio.load(audio.clone());
            }
            FinalView::Summary(result.summary.clone())
        }
        ResummarizeOutcome::ApplicationError { message } => FinalView::Failed {
            kind: FailureKind::Application,
            message: message.clone(),
        },
        ResummarizeOutcome::TransportFailure { message } => FinalView::Failed {
            kind: FailureKind::Transport,
            message: format!("Summary request failed: {}", message),
        },
    };
    session.screen = UiState::FinalShown;
}
