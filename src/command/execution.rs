use super::Command;
use crate::model::Track;
use crate::output::AudioOutput;
use crate::player::{LoadOutcome, PlaybackRejectedError, Player};
use crate::resolver::{self, Resolve};
use crate::search::{self, Search};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Error, Debug)]
pub(crate) enum Error {
    #[error("could not resolve an audio stream: {0}")]
    Resolution(#[from] resolver::Error),
    #[error("could not start playback: {0}")]
    Playback(#[from] PlaybackRejectedError),
    #[error("search failed: {0}")]
    Search(#[from] search::Error),
}

#[derive(Debug)]
pub(crate) enum Executed {
    Loaded(Track),
    /// A newer load overtook this one; nothing changed.
    LoadSuperseded,
    NothingFound(String),
    Playing,
    Paused,
    Stopped,
    SeekedTo(f64),
    VolumeSet(f32),
    Quit,
}

/// Runs commands against the player. The resolver and searcher round trips
/// happen outside the player lock, which is what makes the load generation
/// token in [`Player`] necessary at all.
pub(crate) struct Executor<R: Resolve, S: Search, O: AudioOutput> {
    resolver: R,
    searcher: S,
    player: Arc<Mutex<Player<O>>>,
}

impl<R: Resolve, S: Search, O: AudioOutput> Executor<R, S, O> {
    pub(crate) fn new(resolver: R, searcher: S, player: Arc<Mutex<Player<O>>>) -> Self {
        Self {
            resolver,
            searcher,
            player,
        }
    }

    pub(crate) async fn execute(&self, command: Command) -> Result<Executed, Error> {
        Ok(match command {
            Command::PlaySong(track) => self.load_track(track).await?,
            Command::PlayQuery(query) => match self.searcher.search(&query).await? {
                Some(track) => self.load_track(track).await?,
                None => Executed::NothingFound(query),
            },
            Command::StopPlayback => {
                self.player.lock().await.stop_and_reset();
                Executed::Stopped
            }
            Command::Play => {
                self.player.lock().await.play()?;
                Executed::Playing
            }
            Command::Pause => {
                self.player.lock().await.pause();
                Executed::Paused
            }
            Command::Seek(fraction) => {
                self.player.lock().await.seek(fraction);
                Executed::SeekedTo(fraction)
            }
            Command::SetVolume(fraction) => {
                self.player.lock().await.set_volume(fraction);
                Executed::VolumeSet(fraction)
            }
            Command::Quit => Executed::Quit,
        })
    }

    async fn load_track(&self, track: Track) -> Result<Executed, Error> {
        info!("loading \"{}\" ({})", track.title, track.video_id);

        let generation = self.player.lock().await.begin_load(track.clone());

        let resolved = match self.resolver.resolve(&track.video_id).await {
            Ok(resolved) => resolved,
            Err(resolution_error) => {
                self.player.lock().await.fail_load(generation);
                return Err(resolution_error.into());
            }
        };

        let mut player = self.player.lock().await;
        match player.finish_load(generation, &resolved.audio_url).await? {
            LoadOutcome::Applied => Ok(Executed::Loaded(track)),
            LoadOutcome::Superseded => Ok(Executed::LoadSuperseded),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::testing::FakeOutput;
    use crate::player::Phase;
    use crate::resolver::testing::FakeResolver;
    use crate::search::testing::FakeSearcher;
    use std::time::Duration;
    use tokio::sync::Notify;

    fn track(video_id: &str) -> Track {
        Track::new(
            video_id.to_owned(),
            format!("title of {video_id}"),
            "artist".to_owned(),
            None,
        )
    }

    fn executor(
        resolver: FakeResolver,
        searcher: FakeSearcher,
        output: FakeOutput,
    ) -> Executor<FakeResolver, FakeSearcher, FakeOutput> {
        Executor::new(resolver, searcher, Arc::new(Mutex::new(Player::new(output))))
    }

    #[tokio::test]
    async fn play_song_resolves_and_starts_playback() {
        let resolver = FakeResolver::new().succeed("a", "https://cdn/a.mp3");
        let output = FakeOutput::with_duration(180);
        let executor = executor(resolver, FakeSearcher::empty(), output.clone());

        let executed = executor
            .execute(Command::PlaySong(track("a")))
            .await
            .unwrap();

        assert!(matches!(executed, Executed::Loaded(_)));
        let player = executor.player.lock().await;
        assert_eq!(player.state().phase, Phase::Playing);
        assert_eq!(player.state().current_track, Some(track("a")));
        assert_eq!(
            output.state().loaded_url.as_deref(),
            Some("https://cdn/a.mp3")
        );
    }

    #[tokio::test]
    async fn a_resolution_error_surfaces_its_message_and_stops() {
        let resolver = FakeResolver::new().fail("a", "x");
        let executor = executor(resolver, FakeSearcher::empty(), FakeOutput::new());

        let error = executor
            .execute(Command::PlaySong(track("a")))
            .await
            .unwrap_err();

        assert!(matches!(
            &error,
            Error::Resolution(resolver::Error::Backend(message)) if message == "x"
        ));
        let player = executor.player.lock().await;
        assert_eq!(player.state().phase, Phase::Idle);
    }

    #[tokio::test]
    async fn stop_playback_while_playing_pauses_and_rewinds() {
        let resolver = FakeResolver::new().succeed("a", "https://cdn/a.mp3");
        let output = FakeOutput::with_duration(180);
        let executor = executor(resolver, FakeSearcher::empty(), output.clone());
        executor
            .execute(Command::PlaySong(track("a")))
            .await
            .unwrap();
        output.state().position = Duration::from_secs(42);

        executor.execute(Command::StopPlayback).await.unwrap();

        let player = executor.player.lock().await;
        assert!(!player.state().phase.is_playing());
        assert_eq!(player.state().position, Duration::ZERO);
        assert!(!output.state().playing);
    }

    #[tokio::test]
    async fn the_later_of_two_rapid_loads_wins_regardless_of_arrival_order() {
        let gate = Arc::new(Notify::new());
        let resolver = FakeResolver::new()
            .succeed("first", "https://cdn/first.mp3")
            .succeed("second", "https://cdn/second.mp3")
            .gate("first", gate.clone());
        let output = FakeOutput::with_duration(180);
        let executor = executor(resolver, FakeSearcher::empty(), output.clone());

        // The first load parks inside its resolution until the second one has
        // fully landed, so the first resolution arrives last.
        let first = executor.execute(Command::PlaySong(track("first")));
        let second = async {
            let second = executor.execute(Command::PlaySong(track("second"))).await;
            gate.notify_one();
            second
        };
        let (first, second) = tokio::join!(first, second);

        assert!(matches!(first.unwrap(), Executed::LoadSuperseded));
        assert!(matches!(second.unwrap(), Executed::Loaded(_)));

        let player = executor.player.lock().await;
        assert_eq!(player.state().current_track, Some(track("second")));
        assert_eq!(player.state().phase, Phase::Playing);
        assert_eq!(
            output.state().loaded_url.as_deref(),
            Some("https://cdn/second.mp3")
        );
    }

    #[tokio::test]
    async fn a_search_hit_is_loaded_and_played() {
        let resolver = FakeResolver::new().succeed("found", "https://cdn/found.mp3");
        let searcher = FakeSearcher::finding(track("found"));
        let output = FakeOutput::with_duration(180);
        let executor = executor(resolver, searcher, output.clone());

        let executed = executor
            .execute(Command::PlayQuery("anything".to_owned()))
            .await
            .unwrap();

        assert!(matches!(executed, Executed::Loaded(_)));
        assert_eq!(
            output.state().loaded_url.as_deref(),
            Some("https://cdn/found.mp3")
        );
    }

    #[tokio::test]
    async fn a_search_miss_reports_nothing_found() {
        let executor = executor(
            FakeResolver::new(),
            FakeSearcher::empty(),
            FakeOutput::new(),
        );

        let executed = executor
            .execute(Command::PlayQuery("nothing".to_owned()))
            .await
            .unwrap();

        assert!(matches!(executed, Executed::NothingFound(_)));
        let player = executor.player.lock().await;
        assert_eq!(player.state().phase, Phase::Idle);
    }

    #[tokio::test]
    async fn volume_and_seek_commands_reach_the_player() {
        let resolver = FakeResolver::new().succeed("a", "https://cdn/a.mp3");
        let output = FakeOutput::with_duration(200);
        let executor = executor(resolver, FakeSearcher::empty(), output.clone());
        executor
            .execute(Command::PlaySong(track("a")))
            .await
            .unwrap();

        executor.execute(Command::SetVolume(2.0)).await.unwrap();
        executor.execute(Command::Seek(0.25)).await.unwrap();

        let player = executor.player.lock().await;
        assert_eq!(player.state().volume, 1.0);
        assert_eq!(player.state().position, Duration::from_secs(50));
    }
}
