//! Runs a [`SearchSession`] on a tokio task.

use super::{Command, Event, SearchSession};
use crate::error::Result;
use crate::search::{QueryResult, ShardStore};
use anyhow::Context;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

const CHANNEL_CAPACITY: usize = 64;

/// What the session asks the page to show.
#[derive(Debug, Clone)]
pub enum SessionOutput {
    Render(Box<QueryResult>),
    Hide,
}

/// Handle to a running session.
///
/// Events go in through [`SessionDriver::send`]; renders come out of the receiver
/// returned by [`SessionDriver::spawn`]. Each render is acknowledged as soon as it
/// is handed to that channel.
#[derive(Debug)]
pub struct SessionDriver {
    events: mpsc::Sender<Event>,
    cancel: CancellationToken,
    task: JoinHandle<SearchSession>,
}

impl SessionDriver {
    pub fn spawn(
        session: SearchSession,
        store: Arc<ShardStore>,
    ) -> (Self, mpsc::Receiver<SessionOutput>) {
        let (events, inbox) = mpsc::channel(CHANNEL_CAPACITY);
        let (outbox, outputs) = mpsc::channel(CHANNEL_CAPACITY);
        let cancel = CancellationToken::new();

        let task = tokio::spawn(run(session, store, inbox, outbox, cancel.clone()));
        (
            Self {
                events,
                cancel,
                task,
            },
            outputs,
        )
    }

    pub async fn send(&self, event: Event) -> Result<()> {
        self.events
            .send(event)
            .await
            .context("Search session has stopped")
    }

    /// A sender for feeding events from elsewhere.
    pub fn sender(&self) -> mpsc::Sender<Event> {
        self.events.clone()
    }

    /// Stop the loop and hand back the disposed session.
    pub async fn dispose(self) -> Result<SearchSession> {
        self.cancel.cancel();
        self.task.await.context("Search session task failed")
    }
}

async fn run(
    mut session: SearchSession,
    store: Arc<ShardStore>,
    mut inbox: mpsc::Receiver<Event>,
    outbox: mpsc::Sender<SessionOutput>,
    cancel: CancellationToken,
) -> SearchSession {
    // Shard completions come back through here so they are handled in order with input.
    let (loaded_tx, mut loaded_rx) = mpsc::unbounded_channel();

    let debounce = tokio::time::sleep(Duration::ZERO);
    tokio::pin!(debounce);
    let mut armed = false;

    'events: loop {
        let event = tokio::select! {
            biased;
            _ = cancel.cancelled() => break 'events,
            Some(event) = loaded_rx.recv() => event,
            () = &mut debounce, if armed => {
                armed = false;
                Event::DebounceElapsed
            }
            event = inbox.recv() => match event {
                Some(event) => event,
                None => break 'events,
            },
        };

        let mut pending = VecDeque::from([event]);
        while let Some(event) = pending.pop_front() {
            for command in session.handle(event) {
                match command {
                    Command::ArmDebounce(delay) => {
                        debounce.as_mut().reset(Instant::now() + delay);
                        armed = true;
                    }
                    Command::FetchShard(shard) => {
                        let store = Arc::clone(&store);
                        let loaded_tx = loaded_tx.clone();
                        tokio::spawn(async move {
                            let result = store.load(&shard).await;
                            // The session may be gone by now.
                            let _ = loaded_tx.send(Event::ShardLoaded { shard, result });
                        });
                    }
                    Command::Render(result) => {
                        if outbox.send(SessionOutput::Render(result)).await.is_err() {
                            tracing::debug!("Render receiver dropped, stopping session");
                            break 'events;
                        }
                        pending.push_back(Event::Rendered);
                    }
                    Command::HideResults => {
                        if outbox.send(SessionOutput::Hide).await.is_err() {
                            break 'events;
                        }
                    }
                }
            }
        }
    }

    session.dispose();
    session
}
