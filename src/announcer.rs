use std::sync::mpsc::{self, SyncSender, TrySendError};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};

use crate::gesture::Gesture;
use crate::speech::SpeechEngine;

/// What happened to an announcement request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Queued(&'static str),
    /// The gesture has no phrase.
    Silent,
    /// The worker is backed up; the phrase was discarded.
    Dropped,
}

/// Hands confirmed gestures to a single speech worker thread.
///
/// The frame loop never waits on speech: requests go through a bounded queue
/// with `try_send`, and the worker owns the engine so utterances never overlap.
pub struct Announcer {
    tx: Option<SyncSender<&'static str>>,
    worker: Option<JoinHandle<()>>,
}

impl Announcer {
    pub fn spawn(mut engine: Box<dyn SpeechEngine>, queue_depth: usize) -> Result<Self> {
        let (tx, rx) = mpsc::sync_channel::<&'static str>(queue_depth.max(1));
        let engine_name = engine.name();

        let worker = thread::Builder::new()
            .name("announcer".to_string())
            .spawn(move || {
                while let Ok(phrase) = rx.recv() {
                    match engine.speak(phrase) {
                        Ok(()) => debug!(phrase, "announced"),
                        Err(e) => error!("Speech error: {}", e),
                    }
                }
                debug!("announcer worker stopped");
            })
            .context("Failed to start announcer thread")?;

        info!(engine = %engine_name, "Announcer ready");
        Ok(Self {
            tx: Some(tx),
            worker: Some(worker),
        })
    }

    pub fn announce(&self, gesture: Gesture) -> Dispatch {
        let Some(phrase) = gesture.phrase() else {
            return Dispatch::Silent;
        };
        let Some(tx) = &self.tx else {
            return Dispatch::Dropped;
        };

        match tx.try_send(phrase) {
            Ok(()) => Dispatch::Queued(phrase),
            Err(TrySendError::Full(_)) => {
                warn!(phrase, "speech queue full, dropping announcement");
                Dispatch::Dropped
            }
            Err(TrySendError::Disconnected(_)) => {
                warn!(phrase, "announcer worker is gone");
                Dispatch::Dropped
            }
        }
    }

    /// Close the queue and wait for pending phrases to finish.
    pub fn shutdown(&mut self) {
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("announcer worker panicked");
            }
        }
    }
}

impl Drop for Announcer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
