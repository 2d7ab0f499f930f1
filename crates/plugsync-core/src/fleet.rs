// ── Fleet of synchronized plugs ──
//
// Owns the worker pool every device shares and a poller per device.
// Pollers share nothing else: a dead plug only ever holds its own task
// and, while a call is in flight, one pool permit.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use plugsync_api::PlugClient;

use crate::config::FleetConfig;
use crate::error::CoreError;
use crate::model::PlugState;
use crate::poller::PlugHandle;
use crate::synchronizer::PlugSynchronizer;
use crate::worker::WorkerPool;

/// Registry of running pollers keyed by plug name.
pub struct Fleet {
    config: FleetConfig,
    pool: WorkerPool,
    cancel: CancellationToken,
    plugs: BTreeMap<String, PlugHandle>,
}

impl Fleet {
    pub fn new(config: FleetConfig) -> Self {
        let pool = WorkerPool::new(config.workers);
        Self {
            config,
            pool,
            cancel: CancellationToken::new(),
            plugs: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &FleetConfig {
        &self.config
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// A synchronizer bound to this fleet's pool and retry policy, not
    /// registered with any poller. Useful for one-shot reads.
    pub fn synchronizer(&self, client: Arc<dyn PlugClient>) -> PlugSynchronizer {
        PlugSynchronizer::new(client, self.pool.clone(), self.config.sync.clone())
    }

    /// Start polling `client` under `name`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        client: Arc<dyn PlugClient>,
    ) -> Result<PlugHandle, CoreError> {
        let synchronizer = self.synchronizer(client);
        self.add_synchronizer(name, synchronizer)
    }

    /// Start polling a pre-built synchronizer under `name`.
    pub fn add_synchronizer(
        &mut self,
        name: impl Into<String>,
        synchronizer: PlugSynchronizer,
    ) -> Result<PlugHandle, CoreError> {
        let name = name.into();
        if self.plugs.contains_key(&name) {
            return Err(CoreError::DuplicatePlug { name });
        }

        debug!(plug = %name, host = %synchronizer.host(), "registering plug");
        let handle = PlugHandle::spawn(name.clone(), synchronizer, self.cancel.child_token());
        self.plugs.insert(name, handle.clone());
        Ok(handle)
    }

    pub fn get(&self, name: &str) -> Result<&PlugHandle, CoreError> {
        self.plugs.get(name).ok_or_else(|| CoreError::PlugNotFound {
            name: name.to_owned(),
        })
    }

    /// Stop and forget one plug.
    pub async fn remove(&mut self, name: &str) -> Result<(), CoreError> {
        let handle = self.plugs.remove(name).ok_or_else(|| CoreError::PlugNotFound {
            name: name.to_owned(),
        })?;
        handle.shutdown().await;
        Ok(())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.plugs.keys().map(String::as_str)
    }

    pub fn handles(&self) -> impl Iterator<Item = &PlugHandle> {
        self.plugs.values()
    }

    /// Latest published state of every plug, in name order.
    pub fn states(&self) -> Vec<(String, PlugState)> {
        self.plugs
            .iter()
            .map(|(name, handle)| (name.clone(), handle.state()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.plugs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugs.is_empty()
    }

    /// Stop every poller, wait for them, and close the pool.
    pub async fn shutdown(&mut self) {
        self.cancel.cancel();
        for handle in self.plugs.values() {
            handle.shutdown().await;
        }
        self.pool.close();
        info!(plugs = self.plugs.len(), "fleet stopped");
    }
}

impl std::fmt::Debug for Fleet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fleet")
            .field("config", &self.config)
            .field("plugs", &self.plugs.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
