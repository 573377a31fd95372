use crate::model::Track;
use std::env;
use thiserror::Error;

const BACKEND_URL: &str = "KAZETA_BACKEND_URL";
const VIDEO_ID: &str = "KAZETA_VIDEO_ID";
const TITLE: &str = "KAZETA_TITLE";
const ARTIST: &str = "KAZETA_ARTIST";
const THUMBNAIL: &str = "KAZETA_THUMBNAIL";
const QUERY: &str = "KAZETA_QUERY";
const VOLUME: &str = "KAZETA_VOLUME";

#[derive(Error, Debug)]
pub(crate) enum ConfigError {
    #[error("the KAZETA_BACKEND_URL environment variable is not set")]
    MissingBackendUrl,
    #[error("the KAZETA_VOLUME environment variable is not a number")]
    InvalidVolume,
}

/// What to start playing, when anything: the standalone view either names a
/// track outright or hands over a search query.
#[derive(Clone, Debug)]
pub(crate) enum Bootstrap {
    Track(Track),
    Query(String),
}

#[derive(Clone, Debug)]
pub(crate) struct Config {
    pub(crate) backend_url: String,
    pub(crate) bootstrap: Option<Bootstrap>,
    pub(crate) initial_volume: f32,
}

impl Config {
    pub(crate) fn from_env() -> Result<Self, ConfigError> {
        let backend_url = env::var(BACKEND_URL).map_err(|_| ConfigError::MissingBackendUrl)?;

        let bootstrap = match env::var(VIDEO_ID) {
            Ok(video_id) => Some(Bootstrap::Track(Track::new(
                video_id,
                env::var(TITLE).unwrap_or_default(),
                env::var(ARTIST).unwrap_or_default(),
                env::var(THUMBNAIL).ok(),
            ))),
            Err(_) => env::var(QUERY).ok().map(Bootstrap::Query),
        };

        let initial_volume = match env::var(VOLUME) {
            Err(_) => 1.0,
            Ok(volume) => volume
                .parse::<f32>()
                .map_err(|_| ConfigError::InvalidVolume)?
                .clamp(0.0, 1.0),
        };

        Ok(Self {
            backend_url,
            bootstrap,
            initial_volume,
        })
    }
}
