//! The inbound RPC listener: accepts `enqueueTaskReservations`,
//! `tasksFinished`, and `getResourceUsage` calls (spec §2, §6).
//!
//! Grounded on the reference repo's
//! `grid_component::component_communication::session.rs` (`TcpSession`
//! actor), reworked as a plain tokio accept-loop plus one task per
//! connection per the decision (DESIGN.md) to drop `actix`.

use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::Framed;

use crate::error::{Error, Result};
use crate::intake;
use crate::node_monitor::NodeMonitor;
use crate::rpc::codec::FrameCodec;
use crate::rpc::protocol::Frame;

/// Binds `address` and serves connections until the listener itself fails.
pub async fn serve(monitor: Arc<NodeMonitor>, address: &str) -> Result<()> {
    let listener = TcpListener::bind(address).await.map_err(|source| Error::Bind { address: address.to_string(), source })?;
    tracing::info!(%address, "node monitor listening");

    loop {
        let (stream, peer) = listener.accept().await.map_err(|source| Error::Bind { address: address.to_string(), source })?;
        let monitor = monitor.clone();
        tokio::spawn(async move {
            if let Err(error) = handle_connection(monitor, stream).await {
                tracing::warn!(%peer, %error, "connection ended with an error");
            }
        });
    }
}

async fn handle_connection(monitor: Arc<NodeMonitor>, stream: TcpStream) -> Result<()> {
    let mut framed = Framed::new(stream, FrameCodec::new());

    while let Some(frame) = framed.next().await {
        let frame = frame.map_err(|source| Error::Transport { address: "peer".into(), source })?;
        let response = dispatch(&monitor, frame).await;
        framed.send(response).await.map_err(|source| Error::Transport { address: "peer".into(), source })?;
    }
    Ok(())
}

async fn dispatch(monitor: &Arc<NodeMonitor>, frame: Frame) -> Frame {
    match frame {
        Frame::EnqueueTaskReservations { request_id, app_id, user, estimated_resources, scheduler_address, app_backend_address, num_tasks } => {
            match intake::enqueue_task_reservations(monitor, request_id, app_id, user, estimated_resources, scheduler_address, app_backend_address, num_tasks).await {
                Ok(()) => Frame::Ack,
                Err(error) => Frame::Error { message: error.to_string() },
            }
        }
        Frame::TasksFinished { tasks } => {
            monitor.tasks_finished(tasks).await;
            Frame::Ack
        }
        Frame::GetResourceUsage { app_id } => {
            let (in_use, queue_length_for_app) = monitor.get_resource_usage(&app_id);
            Frame::ResourceUsage { in_use, queue_length_for_app }
        }
        other => Frame::Error { message: format!("unexpected frame on the intake connection: {other:?}") },
    }
}
