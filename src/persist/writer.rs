//! Ordered background writer for cart snapshots.

use crate::error::{CartError, Result};
use crate::storage::KeyValueStorage;
use crate::types::Version;
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error};

/// A serialized snapshot waiting to be written.
#[derive(Debug)]
struct PendingWrite {
    version: Version,
    payload: String,
}

enum WriteCommand {
    Write(PendingWrite),
    /// Acknowledged once every write queued before it has been attempted.
    Flush(Sender<()>),
}

/// Counters shared between the writer thread and the store.
#[derive(Debug, Default)]
struct WriterProgress {
    persisted: AtomicU64,
    failures: AtomicU64,
}

/// Writes snapshots to storage on a dedicated thread, in queue order.
///
/// When several snapshots are waiting, only the newest one is written. The
/// record always ends up holding the last snapshot that was enqueued.
pub struct SnapshotWriter {
    sender: Option<Sender<WriteCommand>>,
    handle: Option<JoinHandle<()>>,
    progress: Arc<WriterProgress>,
}

impl SnapshotWriter {
    /// Start a writer for `key` in `storage`.
    pub fn spawn(storage: Arc<dyn KeyValueStorage>, key: String) -> Result<Self> {
        let (sender, receiver) = unbounded();
        let progress = Arc::new(WriterProgress::default());

        let worker_progress = Arc::clone(&progress);
        let handle = thread::Builder::new()
            .name("cartstore-writer".into())
            .spawn(move || run(receiver, storage.as_ref(), &key, &worker_progress))?;

        Ok(Self {
            sender: Some(sender),
            handle: Some(handle),
            progress,
        })
    }

    /// Queue a snapshot. Returns immediately.
    pub fn enqueue(&self, version: Version, payload: String) -> Result<()> {
        self.send(WriteCommand::Write(PendingWrite { version, payload }))
    }

    /// Block until every snapshot queued so far has been written or has failed.
    pub fn flush(&self) -> Result<()> {
        let (ack, done) = bounded(1);
        self.send(WriteCommand::Flush(ack))?;
        done.recv().map_err(|_| CartError::WriterStopped)
    }

    /// Newest version written successfully.
    pub fn persisted_version(&self) -> Version {
        Version(self.progress.persisted.load(Ordering::Acquire))
    }

    /// Number of failed writes.
    pub fn write_failures(&self) -> u64 {
        self.progress.failures.load(Ordering::Acquire)
    }

    fn send(&self, command: WriteCommand) -> Result<()> {
        self.sender
            .as_ref()
            .ok_or(CartError::WriterStopped)?
            .send(command)
            .map_err(|_| CartError::WriterStopped)
    }
}

impl Drop for SnapshotWriter {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain what is queued and exit.
        self.sender.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run(
    receiver: Receiver<WriteCommand>,
    storage: &dyn KeyValueStorage,
    key: &str,
    progress: &WriterProgress,
) {
    while let Ok(command) = receiver.recv() {
        match command {
            WriteCommand::Write(first) => {
                let mut latest = first;
                let mut acks = Vec::new();

                // Coalesce everything already queued up to the next flush.
                while let Ok(next) = receiver.try_recv() {
                    match next {
                        WriteCommand::Write(newer) => latest = newer,
                        WriteCommand::Flush(ack) => {
                            acks.push(ack);
                            break;
                        }
                    }
                }

                write_snapshot(storage, key, latest, progress);

                for ack in acks {
                    let _ = ack.send(());
                }
            }
            WriteCommand::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
}

fn write_snapshot(
    storage: &dyn KeyValueStorage,
    key: &str,
    write: PendingWrite,
    progress: &WriterProgress,
) {
    match storage.set(key, &write.payload) {
        Ok(()) => {
            progress.persisted.store(write.version.0, Ordering::Release);
            debug!(key, version = write.version.0, bytes = write.payload.len(), "cart snapshot persisted");
        }
        Err(e) => {
            // Not retried; the next mutation writes a fresh snapshot anyway.
            progress.failures.fetch_add(1, Ordering::AcqRel);
            let failure = CartError::StorageWrite(e.to_string());
            error!(key, version = write.version.0, error = %failure, "cart snapshot write failed");
        }
    }
}
