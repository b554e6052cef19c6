//! Background execution for engine calls.
//!
//! Engine and store calls block. [`SyncWorker`] runs them on one dedicated
//! thread, in submission order, and hands back a [`JobHandle`] that can be
//! awaited from async code or waited on from a plain thread.

use crate::engine::SyncEngine;
use crate::error::{SyncResult, WorkerError};
use crate::query::{Projection, ViewQuery};
use crate::source::RemoteUserSource;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::thread::JoinHandle;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};
use usersync_protocol::{NewUser, UserId, UserPatch, UserRecord};
use usersync_store::LocalUserStore;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Name of the worker thread.
pub const WORKER_THREAD_NAME: &str = "usersync-worker";

/// Result of a submitted job.
///
/// Await it, or call [`wait`](Self::wait) outside of an async runtime.
#[derive(Debug)]
pub struct JobHandle<T> {
    receiver: oneshot::Receiver<T>,
}

impl<T> JobHandle<T> {
    /// Blocks the current thread until the job finishes.
    ///
    /// Must not be called from within an async runtime; await the handle
    /// there instead.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Stopped`] if the worker went away first.
    pub fn wait(self) -> Result<T, WorkerError> {
        self.receiver
            .blocking_recv()
            .map_err(|_| WorkerError::Stopped)
    }
}

impl<T> Future for JobHandle<T> {
    type Output = Result<T, WorkerError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|result| result.map_err(|_| WorkerError::Stopped))
    }
}

/// Runs engine calls on a dedicated background thread.
pub struct SyncWorker<S: RemoteUserSource, L: LocalUserStore> {
    engine: Arc<SyncEngine<S, L>>,
    sender: Option<mpsc::UnboundedSender<Job>>,
    thread: Option<JoinHandle<()>>,
}

impl<S, L> SyncWorker<S, L>
where
    S: RemoteUserSource + 'static,
    L: LocalUserStore + 'static,
{
    /// Starts the worker thread.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Spawn`] if the thread cannot be created.
    pub fn spawn(engine: Arc<SyncEngine<S, L>>) -> Result<Self, WorkerError> {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();

        let thread = std::thread::Builder::new()
            .name(WORKER_THREAD_NAME.into())
            .spawn(move || {
                debug!("worker started");
                while let Some(job) = receiver.blocking_recv() {
                    job();
                }
                debug!("worker stopped");
            })?;

        Ok(Self {
            engine,
            sender: Some(sender),
            thread: Some(thread),
        })
    }

    /// Returns the engine the worker drives.
    pub fn engine(&self) -> &Arc<SyncEngine<S, L>> {
        &self.engine
    }

    /// Queues a call against the engine.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Stopped`] if the worker thread has exited.
    pub fn submit<T, F>(&self, job: F) -> Result<JobHandle<T>, WorkerError>
    where
        T: Send + 'static,
        F: FnOnce(&SyncEngine<S, L>) -> T + Send + 'static,
    {
        let sender = self.sender.as_ref().ok_or(WorkerError::Stopped)?;
        let engine = Arc::clone(&self.engine);
        let (reply, receiver) = oneshot::channel();

        sender
            .send(Box::new(move || {
                // The caller may have dropped the handle.
                let _ = reply.send(job(&engine));
            }))
            .map_err(|_| WorkerError::Stopped)?;

        Ok(JobHandle { receiver })
    }

    /// Queues [`SyncEngine::sync_from_remote`].
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Stopped`] if the worker thread has exited.
    pub fn sync_from_remote(&self) -> Result<JobHandle<SyncResult<Vec<UserRecord>>>, WorkerError> {
        self.submit(|engine| engine.sync_from_remote())
    }

    /// Queues [`SyncEngine::load_local`].
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Stopped`] if the worker thread has exited.
    pub fn load_local(&self) -> Result<JobHandle<SyncResult<Vec<UserRecord>>>, WorkerError> {
        self.submit(|engine| engine.load_local())
    }

    /// Queues [`SyncEngine::query`].
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Stopped`] if the worker thread has exited.
    pub fn query(
        &self,
        query: ViewQuery,
    ) -> Result<JobHandle<SyncResult<Projection>>, WorkerError> {
        self.submit(move |engine| engine.query(&query))
    }

    /// Queues [`SyncEngine::add_local_user`].
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Stopped`] if the worker thread has exited.
    pub fn add_local_user(
        &self,
        new_user: NewUser,
    ) -> Result<JobHandle<SyncResult<UserRecord>>, WorkerError> {
        self.submit(move |engine| engine.add_local_user(new_user))
    }

    /// Queues [`SyncEngine::update_local_user`].
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Stopped`] if the worker thread has exited.
    pub fn update_local_user(
        &self,
        id: UserId,
        patch: UserPatch,
    ) -> Result<JobHandle<SyncResult<UserRecord>>, WorkerError> {
        self.submit(move |engine| engine.update_local_user(id, patch))
    }

    /// Queues [`SyncEngine::delete_local_user`].
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Stopped`] if the worker thread has exited.
    pub fn delete_local_user(
        &self,
        id: UserId,
    ) -> Result<JobHandle<SyncResult<UserRecord>>, WorkerError> {
        self.submit(move |engine| engine.delete_local_user(id))
    }

    /// Runs the remaining queued jobs, then stops the thread.
    pub fn shutdown(mut self) {
        self.stop();
    }
}

impl<S: RemoteUserSource, L: LocalUserStore> SyncWorker<S, L> {
    fn stop(&mut self) {
        self.sender.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("worker thread panicked");
            }
        }
    }
}

impl<S: RemoteUserSource, L: LocalUserStore> Drop for SyncWorker<S, L> {
    fn drop(&mut self) {
        self.stop();
    }
}
