//! Playback state for the synthesized summary audio.

use super::api::GatewayApi;
use crate::error::{RecapError, Result};
use crate::models::{AudioClip, AudioRef};
use tracing::{debug, info};

/// Where the audio player is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AudioState {
    #[default]
    Hidden,
    /// A clip is attached and the controls are shown.
    Ready(AudioRef),
    /// The clip has been fetched and is playing.
    Playing { source: AudioRef, clip: AudioClip },
}

/// Attaches and detaches the audio tied to the final-summary screen.
#[derive(Debug, Default)]
pub struct AudioController {
    state: AudioState,
}

impl AudioController {
    pub fn state(&self) -> &AudioState {
        &self.state
    }

    pub fn is_hidden(&self) -> bool {
        matches!(self.state, AudioState::Hidden)
    }

    /// Attach a clip, replacing whatever was attached before.
    pub fn load(&mut self, source: AudioRef) {
        debug!("Audio ready: {}", source.0);
        self.state = AudioState::Ready(source);
    }

    /// Fetch the attached clip through the gateway and start playing it.
    pub async fn play(&mut self, api: &dyn GatewayApi) -> Result<&AudioClip> {
        if let AudioState::Ready(source) = &self.state {
            let source = source.clone();
            let clip = api.audio(&source.file_id()).await?;
            info!("Playing audio {} ({} bytes)", source.0, clip.bytes.len());
            self.state = AudioState::Playing { source, clip };
        }

        match &self.state {
            AudioState::Playing { clip, .. } => Ok(clip),
            _ => Err(RecapError::Validation("No audio is available".to_string())),
        }
    }

    /// Stop playback and drop the clip.
    pub fn stop(&mut self) {
        if !self.is_hidden() {
            debug!("Audio stopped");
        }
        self.state = AudioState::Hidden;
    }
}
