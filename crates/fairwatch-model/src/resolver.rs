//! Serialized status resolution shared by concurrent group sweeps.
//!
//! One detached worker owns the oracle and processes lookups one at a time.
//! Group threads hand it a player handle and wait a bounded time for the
//! reply; on timeout they degrade to [`AccountStatus::Unknown`] while the
//! worker keeps going, so the eventual result still lands in the shared
//! cache. The worker exits once every handle to it is dropped.

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        mpsc::{self, Receiver, RecvTimeoutError},
    },
    thread,
    time::Duration,
};

use fairwatch_oracle::{AccountOracle, AccountStatus};
use tracing::warn;

pub(crate) type StatusCache = Arc<Mutex<HashMap<String, AccountStatus>>>;

pub(crate) fn lock_cache(cache: &Mutex<HashMap<String, AccountStatus>>) -> MutexGuard<'_, HashMap<String, AccountStatus>> {
    cache.lock().unwrap_or_else(PoisonError::into_inner)
}

struct ResolveRequest {
    player: String,
    reply: mpsc::Sender<AccountStatus>,
}

/// Cloneable handle to the resolver worker.
#[derive(Clone)]
pub(crate) struct StatusResolver {
    requests: mpsc::Sender<ResolveRequest>,
    cache: StatusCache,
    wait: Duration,
}

impl StatusResolver {
    /// Spawns the worker thread and returns a handle to it.
    pub(crate) fn spawn(
        oracle: Arc<dyn AccountOracle>,
        cache: StatusCache,
        wait: Duration,
    ) -> Self {
        let (requests, inbox) = mpsc::channel();
        let worker_cache = Arc::clone(&cache);
        thread::spawn(move || resolver_loop(&inbox, oracle.as_ref(), &worker_cache));
        Self {
            requests,
            cache,
            wait,
        }
    }

    /// Resolves one player, cache first, waiting at most the bounded wait.
    pub(crate) fn lookup(&self, player: &str) -> AccountStatus {
        if let Some(&status) = lock_cache(&self.cache).get(player) {
            return status;
        }

        let (reply, answer) = mpsc::channel();
        let request = ResolveRequest {
            player: player.to_owned(),
            reply,
        };
        if self.requests.send(request).is_err() {
            return AccountStatus::Unknown;
        }
        match answer.recv_timeout(self.wait) {
            Ok(status) => status,
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => {
                warn!(player, "account status resolution timed out");
                AccountStatus::Unknown
            }
        }
    }
}

fn resolver_loop(
    inbox: &Receiver<ResolveRequest>,
    oracle: &dyn AccountOracle,
    cache: &Mutex<HashMap<String, AccountStatus>>,
) {
    while let Ok(request) = inbox.recv() {
        // Two groups flagging the same player race to this point; the second
        // request finds the first one's result already cached.
        let cached = lock_cache(cache).get(&request.player).copied();
        let status = match cached {
            Some(status) => status,
            None => {
                let status = match oracle.resolve(&request.player) {
                    Ok(status) => status,
                    Err(err) => {
                        warn!(player = request.player, error = %err, "account status resolution failed");
                        AccountStatus::Unknown
                    }
                };
                lock_cache(cache).insert(request.player.clone(), status);
                status
            }
        };
        // The requester may have timed out and gone away.
        let _ = request.reply.send(status);
    }
}
