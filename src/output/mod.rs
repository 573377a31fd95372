mod device;

pub(crate) use device::RodioOutput;

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub(crate) enum OutputError {
    #[error("no audio source is loaded")]
    NoSource,
    #[error("audio source fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("audio source could not be decoded: {0}")]
    Decode(String),
    #[error("the audio device is gone")]
    DeviceGone,
}

/// The single playback handle the transport controller owns. Keeping it
/// behind a trait lets the controller run against a fake in tests, with no
/// audio device or network in sight.
pub(crate) trait AudioOutput: Send {
    /// Replaces the current source with the one streamed from `url` and
    /// leaves it paused at position zero. Returns the source duration when
    /// the container reports one.
    async fn load(&mut self, url: &str) -> Result<Option<Duration>, OutputError>;

    /// Starts or resumes playback; rejected when no source is loaded.
    fn play(&mut self) -> Result<(), OutputError>;

    fn pause(&mut self);

    /// Drops the current source entirely.
    fn stop(&mut self);

    fn set_volume(&mut self, volume: f32);

    fn seek(&mut self, position: Duration);

    fn position(&self) -> Duration;

    /// True once the loaded source has played to its end.
    fn is_finished(&self) -> bool;
}
