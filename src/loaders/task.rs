use std::path::PathBuf;
use std::thread;

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::gltf_model::load_model;
use super::progress::Progress;
use crate::error::LoadError;
use crate::scene::Model;

/// Message sent from the loader thread to the render loop
#[derive(Debug)]
pub enum LoadEvent {
    Progress(Progress),
    Loaded(Model),
    Failed(LoadError),
}

/// Lifecycle of the single model load
#[derive(Debug)]
pub enum LoadState {
    Pending { progress: Option<Progress> },
    Succeeded,
    Failed(LoadError),
}

impl LoadState {
    pub fn is_pending(&self) -> bool {
        matches!(self, LoadState::Pending { .. })
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_pending()
    }
}

impl Default for LoadState {
    fn default() -> Self {
        LoadState::Pending { progress: None }
    }
}

/// Background model load feeding events into an unbounded channel
pub struct LoadTask {
    receiver: UnboundedReceiver<LoadEvent>,
    finished: bool,
}

impl LoadTask {
    /// Starts reading `path` on a worker thread
    pub fn spawn(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (sender, receiver) = mpsc::unbounded();

        let spawned = thread::Builder::new()
            .name("gltf-loader".to_string())
            .spawn(move || run(path, sender));
        if let Err(e) = spawned {
            log::error!("Failed to start loader thread: {}", e);
        }

        Self {
            receiver,
            finished: false,
        }
    }

    /// Task fed by an existing channel, used to drive the viewer without a worker thread
    pub fn from_receiver(receiver: UnboundedReceiver<LoadEvent>) -> Self {
        Self {
            receiver,
            finished: false,
        }
    }

    /// Drains every event available now without blocking.
    ///
    /// A closed channel with no terminal event yields `Failed(Disconnected)`
    /// once. Nothing is returned after a terminal event.
    pub fn poll(&mut self) -> Vec<LoadEvent> {
        let mut events = Vec::new();
        while !self.finished {
            match self.receiver.try_next() {
                Ok(Some(event)) => {
                    self.finished = matches!(event, LoadEvent::Loaded(_) | LoadEvent::Failed(_));
                    events.push(event);
                }
                Ok(None) => {
                    self.finished = true;
                    events.push(LoadEvent::Failed(LoadError::Disconnected));
                }
                Err(_) => break,
            }
        }
        events
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

fn run(path: PathBuf, sender: UnboundedSender<LoadEvent>) {
    let progress_sender = sender.clone();
    let result = load_model(&path, |progress| {
        let _ = progress_sender.unbounded_send(LoadEvent::Progress(progress));
    });

    let event = match result {
        Ok(model) => LoadEvent::Loaded(model),
        Err(e) => LoadEvent::Failed(e),
    };
    if sender.unbounded_send(event).is_err() {
        log::debug!("Viewer dropped before {:?} finished loading", path);
    }
}
