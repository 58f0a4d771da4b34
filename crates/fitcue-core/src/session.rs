//! Session driver: owns an engine and ticks it once per second.
//!
//! One task per active session is the only writer of the engine's state.
//! Front-ends talk to it through a [`SessionHandle`]: commands go in over a
//! channel, snapshots come out on a `watch` channel after every mutation
//! and events on a `broadcast` channel.
//!
//! The ticker is a `tokio::time::Interval` anchored when ticking starts, so
//! deadlines are fixed offsets from that anchor instead of "one second
//! after the last handler finished". A late deadline is replayed
//! immediately (`MissedTickBehavior::Burst`) so every second is still
//! evaluated. Commands are polled before ticks, and a pause drops the
//! ticker in the same step that mutates the engine.

use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use crate::audio::{Cue, CueRouter};
use crate::events::Event;

pub const TICK: Duration = Duration::from_secs(1);

const EVENT_CAPACITY: usize = 64;

/// An engine the driver can run.
pub trait SessionEngine: Send + 'static {
    type Snapshot: Clone + Send + Sync + 'static;

    /// Advance by one second.
    fn tick(&mut self) -> Option<Event>;

    /// Whether the driver should be ticking right now.
    fn is_ticking(&self) -> bool;

    fn take_cues(&mut self) -> Vec<Cue>;

    fn snapshot(&self) -> Self::Snapshot;
}

type Command<E> = Box<dyn FnOnce(&mut E) -> Option<Event> + Send>;

pub struct SessionHandle<E: SessionEngine> {
    commands: mpsc::UnboundedSender<Command<E>>,
    snapshots: watch::Receiver<E::Snapshot>,
    events: broadcast::Sender<Event>,
    task: JoinHandle<E>,
}

/// Start driving `engine`. Must be called inside a tokio runtime.
pub fn spawn_session<E: SessionEngine>(engine: E, router: CueRouter) -> SessionHandle<E> {
    let (commands_tx, commands_rx) = mpsc::unbounded_channel();
    let (snapshot_tx, snapshot_rx) = watch::channel(engine.snapshot());
    let (events_tx, _) = broadcast::channel(EVENT_CAPACITY);

    let task = tokio::spawn(drive(
        engine,
        router,
        commands_rx,
        snapshot_tx,
        events_tx.clone(),
    ));

    SessionHandle {
        commands: commands_tx,
        snapshots: snapshot_rx,
        events: events_tx,
        task,
    }
}

impl<E: SessionEngine> SessionHandle<E> {
    /// Queue an action on the engine. Returns false once the session is gone.
    pub fn send<F>(&self, action: F) -> bool
    where
        F: FnOnce(&mut E) -> Option<Event> + Send + 'static,
    {
        self.commands.send(Box::new(action)).is_ok()
    }

    pub fn snapshots(&self) -> watch::Receiver<E::Snapshot> {
        self.snapshots.clone()
    }

    pub fn latest(&self) -> E::Snapshot {
        self.snapshots.borrow().clone()
    }

    /// Events produced after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// Stop the driver and get the engine back.
    ///
    /// Speech already queued is given a bounded time to finish, and the
    /// audio lease is released before this returns.
    pub async fn shutdown(self) -> Option<E> {
        drop(self.commands);
        self.task.await.ok()
    }
}

async fn drive<E: SessionEngine>(
    mut engine: E,
    router: CueRouter,
    mut commands: mpsc::UnboundedReceiver<Command<E>>,
    snapshots: watch::Sender<E::Snapshot>,
    events: broadcast::Sender<Event>,
) -> E {
    let mut ticker: Option<Interval> = None;
    tracing::debug!(session = %router.session(), "session driver started");

    loop {
        sync_ticker(engine.is_ticking(), &mut ticker);

        let event = tokio::select! {
            biased;
            command = commands.recv() => match command {
                Some(command) => command(&mut engine),
                None => break,
            },
            _ = next_tick(&mut ticker) => engine.tick(),
        };

        router.dispatch_all(engine.take_cues());
        snapshots.send_replace(engine.snapshot());
        if let Some(event) = event {
            // No subscribers is fine.
            let _ = events.send(event);
        }
    }

    tracing::debug!(session = %router.session(), "session driver stopped");
    router.close().await;
    engine
}

fn sync_ticker(ticking: bool, ticker: &mut Option<Interval>) {
    match (ticking, ticker.is_some()) {
        (true, false) => {
            let mut interval = interval_at(Instant::now() + TICK, TICK);
            interval.set_missed_tick_behavior(MissedTickBehavior::Burst);
            *ticker = Some(interval);
        }
        (false, true) => *ticker = None,
        _ => {}
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioOutput, MemoryAudio, RouterOptions, Speaker};
    use std::sync::Arc;
    use uuid::Uuid;

    #[derive(Default)]
    struct Counter {
        running: bool,
        ticks: u32,
    }

    impl SessionEngine for Counter {
        type Snapshot = u32;

        fn tick(&mut self) -> Option<Event> {
            self.ticks += 1;
            None
        }

        fn is_ticking(&self) -> bool {
            self.running
        }

        fn take_cues(&mut self) -> Vec<Cue> {
            Vec::new()
        }

        fn snapshot(&self) -> u32 {
            self.ticks
        }
    }

    fn router() -> CueRouter {
        let audio = Arc::new(MemoryAudio::new());
        let output = AudioOutput::new(audio.clone(), 1.0, 0.5);
        let lease = output.acquire(Uuid::new_v4()).unwrap();
        CueRouter::spawn(lease, audio.clone(), Speaker::new(audio), RouterOptions::default())
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_second_while_running() {
        let handle = spawn_session(Counter::default(), router());
        handle.send(|c: &mut Counter| {
            c.running = true;
            None
        });
        tokio::time::sleep(Duration::from_millis(5_500)).await;
        assert_eq!(handle.latest(), 5);

        handle.send(|c: &mut Counter| {
            c.running = false;
            None
        });
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(handle.latest(), 5);

        let engine = handle.shutdown().await.unwrap();
        assert_eq!(engine.ticks, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn resume_anchors_a_fresh_second() {
        let handle = spawn_session(Counter::default(), router());
        handle.send(|c: &mut Counter| {
            c.running = true;
            None
        });
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        handle.send(|c: &mut Counter| {
            c.running = false;
            None
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.send(|c: &mut Counter| {
            c.running = true;
            None
        });
        // 0.9s after resuming: no tick yet, the half second before the
        // pause is not carried over.
        tokio::time::sleep(Duration::from_millis(900)).await;
        assert_eq!(handle.latest(), 1);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(handle.latest(), 2);
    }

    #[tokio::test]
    async fn shutdown_returns_engine_and_releases_output() {
        let audio = Arc::new(MemoryAudio::new());
        let output = AudioOutput::new(audio.clone(), 1.0, 0.5);
        let lease = output.acquire(Uuid::new_v4()).unwrap();
        let router = CueRouter::spawn(
            lease,
            audio.clone(),
            Speaker::new(audio),
            RouterOptions::default(),
        );

        let handle = spawn_session(Counter::default(), router);
        assert!(handle.send(|c: &mut Counter| {
            c.ticks = 42;
            None
        }));
        let engine = handle.shutdown().await.unwrap();
        assert_eq!(engine.ticks, 42);
        assert!(output.owner().is_none());
    }
}
