//! Shared test doubles for the integration suite, implementing the
//! production `SchedulerClient`/`BackendClient` traits rather than mocking
//! the network, mirroring the reference repo's `tests/simulator_mock.rs`
//! pattern (`SystemSimulator` / `MockSimulator`).

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use node_monitor::domain::ids::{RequestId, UserId};
use node_monitor::domain::reservation::{FullTaskId, TaskLaunchSpec};
use node_monitor::domain::resources::ResourceVector;
use node_monitor::error::Result;
use node_monitor::pool::backend_pool::BackendClient;
use node_monitor::rpc::scheduler_client::SchedulerClient;

/// A scheduler double that returns one canned `getTask` response per call,
/// in the order it was constructed with.
pub struct MockSchedulerClient {
    responses: VecDeque<Result<Vec<TaskLaunchSpec>>>,
}

impl MockSchedulerClient {
    pub fn with_responses(responses: Vec<Result<Vec<TaskLaunchSpec>>>) -> Box<dyn SchedulerClient> {
        Box::new(MockSchedulerClient { responses: responses.into() })
    }
}

#[async_trait]
impl SchedulerClient for MockSchedulerClient {
    async fn get_task(&mut self, _request_id: &RequestId, _node_monitor_address: &str) -> Result<Vec<TaskLaunchSpec>> {
        Ok(self.responses.pop_front().transpose()?.unwrap_or_default())
    }
}

/// A backend double that records every `launchTask` call it receives. The
/// recorded `FullTaskId`s let a test construct the matching `tasksFinished`
/// call without a real application backend.
pub struct MockBackendClient {
    launched: Mutex<Vec<FullTaskId>>,
}

impl MockBackendClient {
    pub fn new() -> Arc<Self> {
        Arc::new(MockBackendClient { launched: Mutex::new(Vec::new()) })
    }

    pub fn launched(&self) -> Vec<FullTaskId> {
        self.launched.lock().unwrap().clone()
    }
}

impl BackendClient for MockBackendClient {
    fn launch_task(&self, _message: &[u8], full_task_id: &FullTaskId, _user: &UserId, _estimated_resources: ResourceVector) -> Result<()> {
        self.launched.lock().unwrap().push(full_task_id.clone());
        Ok(())
    }
}

/// Polls `predicate` until it is true or the budget is spent, since the
/// puller/launcher pathway runs on spawned tasks rather than inline with
/// the call that triggers it.
pub async fn wait_until(mut predicate: impl FnMut() -> bool) {
    for _ in 0..200 {
        if predicate() {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    panic!("condition did not become true within the test's wait budget");
}
