mod execution;

pub(crate) use execution::*;

use crate::model::Track;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

#[derive(Debug, PartialEq)]
pub(crate) enum Command {
    PlaySong(Track),
    PlayQuery(String),
    StopPlayback,
    Play,
    Pause,
    Seek(f64),
    SetVolume(f32),
    Quit,
}

#[derive(Error, Debug)]
pub(crate) enum MessageError {
    #[error("message is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("a PLAY_SONG message arrived without a song")]
    MissingSong,
}

#[derive(Deserialize)]
struct BridgeMessage {
    #[serde(rename = "type")]
    kind: String,
    song: Option<SongPayload>,
}

#[derive(Deserialize)]
struct SongPayload {
    #[serde(rename = "videoId")]
    video_id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    artist: String,
    thumbnail: Option<String>,
}

impl From<SongPayload> for Track {
    fn from(song: SongPayload) -> Self {
        Track::new(song.video_id, song.title, song.artist, song.thumbnail)
    }
}

/// One input line is either a structured message from the hosting process
/// (JSON) or a plain text console command, both landing in the same
/// [`Command`]. Lines that carry no command come back as `None`.
pub(crate) fn parse(line: &str) -> Result<Option<Command>, MessageError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    if line.starts_with('{') {
        Command::try_from_message(line)
    } else {
        Ok(Command::try_from_line(line))
    }
}

impl Command {
    /// Structured bridge messages. An unrecognized kind is the host's
    /// business, not an error: it is logged and reported as `None`.
    fn try_from_message(message: &str) -> Result<Option<Self>, MessageError> {
        let message: BridgeMessage = serde_json::from_str(message)?;
        Ok(match message.kind.as_str() {
            "PLAY_SONG" => {
                let song = message.song.ok_or(MessageError::MissingSong)?;
                Some(Self::PlaySong(song.into()))
            }
            "STOP_PLAYBACK" => Some(Self::StopPlayback),
            kind => {
                info!("ignoring a message of unrecognized kind {kind:?}");
                None
            }
        })
    }

    /// Plain text transport commands typed into the standalone console.
    fn try_from_line(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let command = match words.next()? {
            "play" => Self::Play,
            "pause" => Self::Pause,
            "stop" => Self::StopPlayback,
            "seek" => Self::Seek(words.next()?.parse().ok()?),
            "volume" => Self::SetVolume(words.next()?.parse().ok()?),
            "search" => {
                let query = words.collect::<Vec<_>>().join(" ");
                if query.is_empty() {
                    return None;
                }
                return Some(Self::PlayQuery(query));
            }
            "quit" => Self::Quit,
            other => {
                info!("ignoring an unknown console command {other:?}");
                return None;
            }
        };
        match words.next() {
            None => Some(command),
            Some(_) => None,
        }
    }
}
