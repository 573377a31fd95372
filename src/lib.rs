mod command;
mod env;
mod log;
mod model;
mod notice;
mod output;
mod player;
mod progress;
mod resolver;
mod search;
mod view;

use crate::command::{Command, Executor};
use crate::env::{Bootstrap, Config};
use crate::notice::NoticeBoard;
use crate::output::RodioOutput;
use crate::player::Player;
use crate::resolver::BackendResolver;
use crate::search::BackendSearcher;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tracing::{debug, error, info};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const REFRESH_INTERVAL: Duration = Duration::from_millis(500);

pub async fn run() -> anyhow::Result<()> {
    log::initialize_logger();

    let config = Config::from_env()?;
    info!("kazeta v{VERSION}, backend at {}", config.backend_url);

    let http_client = reqwest::Client::new();
    let resolver = BackendResolver::new(http_client.clone(), config.backend_url.clone());
    let searcher = BackendSearcher::new(http_client.clone(), config.backend_url.clone());

    let player = Arc::new(Mutex::new(Player::new(RodioOutput::new(http_client))));
    player.lock().await.set_volume(config.initial_volume);

    let executor = Executor::new(resolver, searcher, player.clone());
    let mut notices = NoticeBoard::new();

    if let Some(bootstrap) = config.bootstrap {
        let command = match bootstrap {
            Bootstrap::Track(track) => Command::PlaySong(track),
            Bootstrap::Query(query) => Command::PlayQuery(query),
        };
        handle_command(command, &executor, &mut notices).await;
    }

    // The dispatch loop: one handler at a time, run to completion, and a
    // refresh tick in between to follow the playback position.
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut refresh = tokio::time::interval(REFRESH_INTERVAL);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match command::parse(&line) {
                    Err(message_error) => {
                        error!("{message_error}");
                        notices.post(view::message_failure_text());
                    }
                    Ok(None) => {}
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(command)) => handle_command(command, &executor, &mut notices).await,
                }
            }
            _ = refresh.tick() => {
                player.lock().await.refresh();
            }
        }

        let state = player.lock().await.snapshot();
        render(&view::status_line(&state, notices.current()));
    }

    Ok(())
}

// Every failure ends here: logged in full, shown to the user in short, and
// the session keeps running.
async fn handle_command<R, S, O>(
    command: Command,
    executor: &Executor<R, S, O>,
    notices: &mut NoticeBoard,
) where
    R: resolver::Resolve,
    S: search::Search,
    O: output::AudioOutput,
{
    match executor.execute(command).await {
        Err(execution_error) => {
            error!("{execution_error}");
            notices.post(view::error_message(&execution_error));
        }
        Ok(executed) => {
            debug!("{executed:?}");
            if let Some(message) = view::executed_message(&executed) {
                info!("{message}");
            }
        }
    }
}

fn render(line: &str) {
    print!("\r\x1b[2K{line}");
    _ = std::io::stdout().flush();
}
