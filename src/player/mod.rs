use crate::model::Track;
use crate::output::{AudioOutput, OutputError};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
#[error("playback was rejected: {0}")]
pub(crate) struct PlaybackRejectedError(#[from] pub(crate) OutputError);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Phase {
    Idle,
    Loading,
    Ready,
    Playing,
    Paused,
    Ended,
}

impl Phase {
    pub(crate) fn is_playing(self) -> bool {
        matches!(self, Phase::Playing)
    }
}

#[derive(Clone, Debug)]
pub(crate) struct PlaybackState {
    pub(crate) current_track: Option<Track>,
    pub(crate) phase: Phase,
    pub(crate) position: Duration,
    pub(crate) duration: Option<Duration>,
    pub(crate) volume: f32,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            current_track: None,
            phase: Phase::Idle,
            position: Duration::ZERO,
            duration: None,
            volume: 1.0,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum LoadOutcome {
    Applied,
    /// A newer load has started since this one began; its completion was
    /// dropped without touching the output.
    Superseded,
}

/// The transport controller. Owns the one audio output handle and the one
/// playback state; every mutation of either goes through these methods.
pub(crate) struct Player<O: AudioOutput> {
    output: O,
    state: PlaybackState,
    load_generation: u64,
}

impl<O: AudioOutput> Player<O> {
    pub(crate) fn new(output: O) -> Self {
        Self {
            output,
            state: PlaybackState::default(),
            load_generation: 0,
        }
    }

    pub(crate) fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub(crate) fn snapshot(&self) -> PlaybackState {
        self.state.clone()
    }

    /// Stops whatever is playing, resets the position and opens a new load
    /// generation for `track`. The returned token must come back through
    /// [`Self::finish_load`] or [`Self::fail_load`]; a completion carrying an
    /// outdated token is discarded, so of several in-flight loads the one
    /// started last always wins, however their resolutions are ordered.
    pub(crate) fn begin_load(&mut self, track: Track) -> u64 {
        self.output.stop();
        self.load_generation += 1;
        self.state.current_track = Some(track);
        self.state.phase = Phase::Loading;
        self.state.position = Duration::ZERO;
        self.state.duration = None;
        self.load_generation
    }

    pub(crate) async fn finish_load(
        &mut self,
        generation: u64,
        audio_url: &str,
    ) -> Result<LoadOutcome, PlaybackRejectedError> {
        if generation != self.load_generation {
            debug!("discarding a stale load completion");
            return Ok(LoadOutcome::Superseded);
        }

        match self.output.load(audio_url).await {
            Err(load_error) => {
                self.state.phase = Phase::Idle;
                Err(PlaybackRejectedError(load_error))
            }
            Ok(duration) => {
                self.state.duration = duration;
                self.state.phase = Phase::Ready;
                self.play()?;
                Ok(LoadOutcome::Applied)
            }
        }
    }

    /// Resolution failed: leave the transport stopped. A stale token means a
    /// newer load owns the state and there is nothing to roll back.
    pub(crate) fn fail_load(&mut self, generation: u64) {
        if generation != self.load_generation {
            return;
        }
        self.state.phase = Phase::Idle;
    }

    pub(crate) fn play(&mut self) -> Result<(), PlaybackRejectedError> {
        match self.state.phase {
            Phase::Idle | Phase::Loading => Err(PlaybackRejectedError(OutputError::NoSource)),
            Phase::Ended => {
                self.output.seek(Duration::ZERO);
                self.state.position = Duration::ZERO;
                self.output.play()?;
                self.state.phase = Phase::Playing;
                Ok(())
            }
            Phase::Ready | Phase::Playing | Phase::Paused => {
                self.output.play()?;
                self.state.phase = Phase::Playing;
                Ok(())
            }
        }
    }

    pub(crate) fn pause(&mut self) {
        self.output.pause();
        if self.state.phase == Phase::Playing {
            self.state.phase = Phase::Paused;
        }
    }

    /// Jumps to `fraction * duration`, with the fraction clamped to `[0, 1]`.
    /// Does nothing while no source with a known duration is loaded.
    pub(crate) fn seek(&mut self, fraction: f64) {
        if matches!(self.state.phase, Phase::Idle | Phase::Loading) {
            return;
        }
        let Some(duration) = self.state.duration else {
            return;
        };

        let target = duration.mul_f64(fraction.clamp(0.0, 1.0));
        self.output.seek(target);
        self.state.position = target;
        if self.state.phase == Phase::Ended {
            self.state.phase = Phase::Paused;
        }
    }

    pub(crate) fn set_volume(&mut self, fraction: f32) {
        let volume = fraction.clamp(0.0, 1.0);
        self.output.set_volume(volume);
        self.state.volume = volume;
    }

    /// The STOP_PLAYBACK behavior: pause and rewind to zero, keeping the
    /// current track loaded.
    pub(crate) fn stop_and_reset(&mut self) {
        self.output.pause();
        self.state.position = Duration::ZERO;
        if !matches!(self.state.phase, Phase::Idle | Phase::Loading) {
            self.output.seek(Duration::ZERO);
            self.state.phase = Phase::Paused;
        }
    }

    /// Timer tick: pull the position from the output and notice the end of
    /// the track.
    pub(crate) fn refresh(&mut self) {
        if !self.state.phase.is_playing() {
            return;
        }

        self.state.position = self.output.position();
        if self.output.is_finished() {
            self.state.phase = Phase::Ended;
            if let Some(duration) = self.state.duration {
                self.state.position = duration;
            }
            if let Some(next) = self.next_track() {
                debug!("would advance to \"{}\"", next.title);
            }
        }
    }

    // Queueing never shipped; the end of a track never auto-advances.
    fn next_track(&mut self) -> Option<Track> {
        None
    }
}
