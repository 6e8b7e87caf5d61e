use std::{
    panic,
    sync::mpsc::{self, Receiver, RecvTimeoutError, Sender},
    thread::{self, JoinHandle},
    time::Instant,
};

use crate::DriverClosedError;

use super::{
    game_controller::{GameCommand, GameController},
    game_event::GameEvent,
};

#[derive(Debug)]
enum Message {
    Command(GameCommand),
    SetHighScore(Option<usize>),
    Shutdown,
}

/// Runs a [`GameController`] on its own thread against the wall clock.
///
/// The worker thread is the only owner of the game. Player commands arrive over a
/// channel and the clock deadline is awaited with a receive timeout, so a command and
/// a penalty tick can never interleave. Every event the game produces is forwarded on
/// the receiver returned by [`Self::spawn`]; failed commands are reported there as
/// [`GameEvent::CommandRejected`].
///
/// # Example
///
/// ```
/// use std::time::{Duration, Instant};
/// use tetrecs_engine::{GameCommand, GameController, GameDriver, GameEvent, GameRules, PieceSeed};
///
/// let controller =
///     GameController::new(GameRules::default(), PieceSeed::from_bytes([3; 16]), Instant::now())?;
/// let (driver, events) = GameDriver::spawn(controller);
///
/// driver.send(GameCommand::PlaceAt { x: 2, y: 2 }).unwrap();
/// let controller = driver.shutdown();
///
/// let events: Vec<GameEvent> = events.try_iter().collect();
/// assert!(events.iter().any(GameEvent::is_piece_placed));
/// assert_eq!(controller.stats().placements(), 1);
/// # Ok::<(), tetrecs_engine::RulesError>(())
/// ```
#[derive(Debug)]
pub struct GameDriver {
    messages: Sender<Message>,
    worker: Option<JoinHandle<GameController>>,
}

impl GameDriver {
    /// Moves `controller` onto a new worker thread.
    #[must_use]
    pub fn spawn(controller: GameController) -> (Self, Receiver<GameEvent>) {
        let (message_tx, message_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let worker = thread::spawn(move || run(controller, &message_rx, &event_tx));
        let driver = Self {
            messages: message_tx,
            worker: Some(worker),
        };
        (driver, event_rx)
    }

    /// Posts a command. Never blocks.
    pub fn send(&self, command: GameCommand) -> Result<(), DriverClosedError> {
        self.post(Message::Command(command))
    }

    /// Forwards the score to beat to the running game.
    pub fn set_high_score(&self, high_score: Option<usize>) -> Result<(), DriverClosedError> {
        self.post(Message::SetHighScore(high_score))
    }

    fn post(&self, message: Message) -> Result<(), DriverClosedError> {
        self.messages.send(message).map_err(|_| DriverClosedError)
    }

    /// Stops the worker after the commands already posted and returns the game.
    ///
    /// # Panics
    ///
    /// Re-raises a panic of the worker thread.
    #[must_use]
    pub fn shutdown(mut self) -> GameController {
        let _ = self.messages.send(Message::Shutdown);
        let worker = self.worker.take().expect("worker is only taken on shutdown");
        worker
            .join()
            .unwrap_or_else(|payload| panic::resume_unwind(payload))
    }
}

impl Drop for GameDriver {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = self.messages.send(Message::Shutdown);
            let _ = worker.join();
        }
    }
}

fn forward_events(controller: &mut GameController, events: &Sender<GameEvent>) {
    for event in controller.drain_events() {
        // A dropped receiver only means nobody is listening; the game goes on.
        let _ = events.send(event);
    }
}

fn run(
    mut controller: GameController,
    messages: &Receiver<Message>,
    events: &Sender<GameEvent>,
) -> GameController {
    loop {
        let now = Instant::now();
        controller.tick(now);
        forward_events(&mut controller, events);

        let received = match controller.next_deadline() {
            Some(deadline) => messages.recv_timeout(deadline.saturating_duration_since(now)),
            None => messages.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };
        let message = match received {
            Ok(message) => message,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        let now = Instant::now();
        controller.tick(now);
        match message {
            Message::Command(command) => {
                if let Err(err) = controller.apply(command, now) {
                    forward_events(&mut controller, events);
                    let _ = events.send(GameEvent::CommandRejected {
                        reason: err.to_string(),
                    });
                }
            }
            Message::SetHighScore(high_score) => controller.set_high_score(high_score),
            Message::Shutdown => break,
        }
    }
    forward_events(&mut controller, events);
    controller
}
