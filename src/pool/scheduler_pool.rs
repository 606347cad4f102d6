use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::rpc::scheduler_client::{SchedulerClient, TcpSchedulerClient};

/// Connection pool for scheduler clients, keyed by `schedulerAddress`
/// (spec §4.3 point 1, §9 "Connection pools keyed by network address").
///
/// `borrow` creates on miss; `drop_client` removes an entry on a transport
/// error rather than returning it (spec §4.3 "On error response: do not
/// return the client to the pool; drop it"). Borrowing never holds the
/// policy lock (spec §4.3 point 1).
pub struct SchedulerPool {
    clients: DashMap<String, Arc<Mutex<Box<dyn SchedulerClient>>>>,
}

impl SchedulerPool {
    pub fn new() -> Self {
        SchedulerPool { clients: DashMap::new() }
    }

    /// Borrows the pooled client for `address`, connecting on miss.
    pub async fn borrow(&self, address: &str) -> crate::error::Result<Arc<Mutex<Box<dyn SchedulerClient>>>> {
        if let Some(existing) = self.clients.get(address) {
            return Ok(existing.clone());
        }
        let client: Box<dyn SchedulerClient> = Box::new(TcpSchedulerClient::connect(address).await?);
        let handle = Arc::new(Mutex::new(client));
        self.clients.insert(address.to_string(), handle.clone());
        Ok(handle)
    }

    /// Drops the pooled client for `address` after a transport error
    /// (spec §4.3 "On error response").
    pub fn drop_client(&self, address: &str) {
        self.clients.remove(address);
    }

    /// Preloads a client for `address`, bypassing `connect`. Used by tests
    /// to seed a `MockSchedulerClient` in place of a real TCP connection.
    pub fn insert(&self, address: &str, client: Box<dyn SchedulerClient>) {
        self.clients.insert(address.to_string(), Arc::new(Mutex::new(client)));
    }
}

impl Default for SchedulerPool {
    fn default() -> Self {
        Self::new()
    }
}
