use super::{AudioOutput, OutputError};
use rodio::{Decoder, OutputStream, Sink, Source};
use std::io::Cursor;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{error, warn};

const WORKER_POLL_INTERVAL: Duration = Duration::from_millis(10);

enum WorkerCommand {
    Load(
        Vec<u8>,
        oneshot::Sender<Result<Option<Duration>, OutputError>>,
    ),
    Play,
    Pause,
    Stop,
    SetVolume(f32),
    Seek(Duration),
}

#[derive(Default)]
struct SharedState {
    elapsed: Duration,
    has_source: bool,
    finished: bool,
}

/// The production output: a dedicated thread owns the rodio sink (the output
/// stream must stay on one thread) and the rest of the program talks to it
/// through a command channel.
pub(crate) struct RodioOutput {
    http_client: reqwest::Client,
    commands: Sender<WorkerCommand>,
    shared: Arc<Mutex<SharedState>>,
}

impl RodioOutput {
    pub(crate) fn new(http_client: reqwest::Client) -> Self {
        let (commands, receiver) = mpsc::channel();
        let shared = Arc::new(Mutex::new(SharedState::default()));
        let worker_shared = Arc::clone(&shared);

        thread::spawn(move || worker(receiver, worker_shared));

        Self {
            http_client,
            commands,
            shared,
        }
    }

    fn send(&self, command: WorkerCommand) -> Result<(), OutputError> {
        self.commands
            .send(command)
            .map_err(|_| OutputError::DeviceGone)
    }
}

impl AudioOutput for RodioOutput {
    async fn load(&mut self, url: &str) -> Result<Option<Duration>, OutputError> {
        let data = self
            .http_client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?
            .to_vec();

        let (reply, response) = oneshot::channel();
        self.send(WorkerCommand::Load(data, reply))?;
        response.await.map_err(|_| OutputError::DeviceGone)?
    }

    fn play(&mut self) -> Result<(), OutputError> {
        if !self.shared.lock().unwrap().has_source {
            return Err(OutputError::NoSource);
        }
        self.send(WorkerCommand::Play)
    }

    fn pause(&mut self) {
        _ = self.send(WorkerCommand::Pause);
    }

    fn stop(&mut self) {
        _ = self.send(WorkerCommand::Stop);
    }

    fn set_volume(&mut self, volume: f32) {
        _ = self.send(WorkerCommand::SetVolume(volume));
    }

    fn seek(&mut self, position: Duration) {
        _ = self.send(WorkerCommand::Seek(position));
    }

    fn position(&self) -> Duration {
        self.shared.lock().unwrap().elapsed
    }

    fn is_finished(&self) -> bool {
        self.shared.lock().unwrap().finished
    }
}

fn worker(receiver: Receiver<WorkerCommand>, shared: Arc<Mutex<SharedState>>) {
    let (_stream, stream_handle) = match OutputStream::try_default() {
        Ok(output) => output,
        Err(creation_error) => {
            error!("could not open an audio output stream: {creation_error}");
            refuse_loads(receiver);
            return;
        }
    };
    let sink = match Sink::try_new(&stream_handle) {
        Ok(sink) => sink,
        Err(creation_error) => {
            error!("could not create an audio sink: {creation_error}");
            refuse_loads(receiver);
            return;
        }
    };

    loop {
        match receiver.recv_timeout(WORKER_POLL_INTERVAL) {
            Ok(command) => handle_command(command, &sink, &shared),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        let mut shared = shared.lock().unwrap();
        shared.elapsed = sink.get_pos();
        shared.finished = shared.has_source && sink.empty();
    }
}

fn handle_command(command: WorkerCommand, sink: &Sink, shared: &Arc<Mutex<SharedState>>) {
    match command {
        WorkerCommand::Load(data, reply) => {
            sink.stop();
            let result = Decoder::new(Cursor::new(data))
                .map_err(|decode_error| OutputError::Decode(decode_error.to_string()))
                .map(|source| {
                    let duration = source.total_duration();
                    sink.append(source);
                    sink.pause();

                    let mut shared = shared.lock().unwrap();
                    shared.has_source = true;
                    shared.finished = false;
                    shared.elapsed = Duration::ZERO;
                    duration
                });
            _ = reply.send(result);
        }
        WorkerCommand::Play => sink.play(),
        WorkerCommand::Pause => sink.pause(),
        WorkerCommand::Stop => {
            sink.stop();
            let mut shared = shared.lock().unwrap();
            shared.has_source = false;
            shared.finished = false;
            shared.elapsed = Duration::ZERO;
        }
        WorkerCommand::SetVolume(volume) => sink.set_volume(volume),
        WorkerCommand::Seek(position) => match sink.try_seek(position) {
            Ok(()) => shared.lock().unwrap().elapsed = position,
            // Some decoders cannot seek; playback simply continues.
            Err(seek_error) => warn!("seek failed: {seek_error}"),
        },
    }
}

// A worker without a device still answers load requests so callers never
// hang on a reply.
fn refuse_loads(receiver: Receiver<WorkerCommand>) {
    for command in receiver.iter() {
        if let WorkerCommand::Load(_, reply) = command {
            _ = reply.send(Err(OutputError::DeviceGone));
        }
    }
}
