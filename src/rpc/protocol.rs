use serde::{Deserialize, Serialize};

use crate::domain::ids::{AppId, RequestId, UserId};
use crate::domain::reservation::{FullTaskId, TaskLaunchSpec};
use crate::domain::resources::ResourceVector;

/// All request and response payloads the node monitor sends or receives
/// over the wire, framed by [`crate::rpc::codec::FrameCodec`].
///
/// Adapted from the reference repo's `Envelope`/`Payload` pair
/// (`grid_component::component_communication::protocol`), generalized from
/// one fixed payload type to the full set of RPCs spec §6 names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Frame {
    /// Scheduler -> node monitor: one `enqueueTaskReservations` call,
    /// carrying `numTasks` reservations for a single job (spec §4.1, §6).
    EnqueueTaskReservations {
        request_id: RequestId,
        app_id: AppId,
        user: UserId,
        estimated_resources: ResourceVector,
        scheduler_address: String,
        app_backend_address: String,
        num_tasks: u32,
    },
    /// Node monitor -> scheduler: synchronous acknowledgement. Spec §4.1
    /// notes the RPC has "no placement guarantee" beyond success.
    Ack,

    /// Application backend -> node monitor: completion notifications
    /// (spec §6).
    TasksFinished { tasks: Vec<FullTaskId> },

    /// Any peer -> node monitor: load reporting (spec §6).
    GetResourceUsage { app_id: AppId },
    ResourceUsage { in_use: ResourceVector, queue_length_for_app: usize },

    /// Node monitor -> scheduler: pull the concrete task spec for a
    /// released reservation (spec §4.3, §6).
    GetTask { request_id: RequestId, node_monitor_address: String },
    /// Scheduler -> node monitor: at most one spec in practice (spec §4.3).
    GetTaskResponse { specs: Vec<TaskLaunchSpec> },

    /// A peer-reported protocol-level failure (spec §7 "Malformed
    /// request").
    Error { message: String },
}
