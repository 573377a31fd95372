use crate::command::{Error, Executed};
use crate::notice::Notice;
use crate::player::{Phase, PlaybackState};
use crate::progress;

const PROGRESS_BAR_WIDTH: usize = 24;
const VOLUME_BAR_WIDTH: usize = 8;

/// The one line the standalone console shows: a transient notice when one is
/// up, the transport status otherwise.
pub(crate) fn status_line(state: &PlaybackState, notice: Option<&Notice>) -> String {
    if let Some(notice) = notice {
        return format!("! {}", notice.message());
    }

    let Some(track) = &state.current_track else {
        return "(nothing loaded)".to_owned();
    };

    let marker = match state.phase {
        Phase::Loading => "...",
        Phase::Playing => " > ",
        Phase::Ended => " # ",
        Phase::Idle | Phase::Ready | Phase::Paused => " | ",
    };
    let elapsed = progress::format_time(state.position.as_secs_f64());
    let total = progress::format_time(
        state
            .duration
            .map_or(f64::NAN, |duration| duration.as_secs_f64()),
    );
    let bar = filled_bar(
        progress::percent(state.position, state.duration) / 100.0,
        PROGRESS_BAR_WIDTH,
    );
    let volume = filled_bar(state.volume as f64, VOLUME_BAR_WIDTH);

    format!(
        "{marker} {} - {}  [{bar}] {elapsed} / {total}  vol [{volume}]",
        track.title, track.artist
    )
}

/// A fixed-width bar whose filled prefix is proportional to `fraction`.
fn filled_bar(fraction: f64, width: usize) -> String {
    let filled = (fraction.clamp(0.0, 1.0) * width as f64).round() as usize;
    let mut bar = "=".repeat(filled);
    bar.push_str(&" ".repeat(width - filled));
    bar
}

pub(crate) fn error_message(error: &Error) -> String {
    match error {
        Error::Resolution(resolution_error) => {
            format!("Could not load the track: {resolution_error}")
        }
        Error::Playback(_) => "Playback could not be started.".to_owned(),
        Error::Search(_) => "Search failed. Please try again.".to_owned(),
    }
}

pub(crate) fn message_failure_text() -> String {
    "The last control message could not be understood.".to_owned()
}

pub(crate) fn executed_message(executed: &Executed) -> Option<String> {
    match executed {
        Executed::Loaded(track) => Some(format!("Now playing: {} - {}", track.title, track.artist)),
        Executed::NothingFound(query) => Some(format!("Nothing was found for \"{query}\".")),
        Executed::LoadSuperseded
        | Executed::Playing
        | Executed::Paused
        | Executed::Stopped
        | Executed::SeekedTo(_)
        | Executed::VolumeSet(_)
        | Executed::Quit => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Track;
    use std::time::Duration;

    fn state() -> PlaybackState {
        PlaybackState {
            current_track: Some(Track::new(
                "abc".to_owned(),
                "One More Time".to_owned(),
                "Daft Punk".to_owned(),
                None,
            )),
            phase: Phase::Playing,
            position: Duration::from_secs(65),
            duration: Some(Duration::from_secs(130)),
            volume: 0.5,
        }
    }

    #[test]
    fn the_status_line_shows_times_and_a_half_full_bar() {
        let line = status_line(&state(), None);
        assert!(line.contains("One More Time - Daft Punk"));
        assert!(line.contains("1:05 / 2:10"));
        assert!(line.contains(&format!(
            "[{}{}]",
            "=".repeat(PROGRESS_BAR_WIDTH / 2),
            " ".repeat(PROGRESS_BAR_WIDTH / 2)
        )));
    }

    #[test]
    fn an_unknown_duration_renders_as_zero() {
        let mut state = state();
        state.duration = None;
        let line = status_line(&state, None);
        assert!(line.contains("/ 0:00"));
    }

    #[test]
    fn a_notice_takes_over_the_line() {
        let mut board = crate::notice::NoticeBoard::new();
        board.post("No results found.");
        let line = status_line(&state(), board.current());
        assert_eq!(line, "! No results found.");
    }

    #[test]
    fn nothing_loaded_renders_a_placeholder() {
        let line = status_line(&PlaybackState::default(), None);
        assert_eq!(line, "(nothing loaded)");
    }

    #[test]
    fn the_volume_bar_width_follows_the_fraction() {
        assert_eq!(filled_bar(0.0, 8), "        ");
        assert_eq!(filled_bar(0.5, 8), "====    ");
        assert_eq!(filled_bar(1.0, 8), "========");
    }
}
