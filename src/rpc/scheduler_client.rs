use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;

use crate::domain::ids::RequestId;
use crate::domain::reservation::TaskLaunchSpec;
use crate::error::{Error, Result};
use crate::rpc::codec::FrameCodec;
use crate::rpc::protocol::Frame;

/// Asynchronous client for the `getTask` RPC (spec §4.3, §6).
///
/// Implemented as a trait so tests can substitute an in-memory double
/// (`MockSchedulerClient`) without standing up a real TCP listener, the
/// same separation the reference repo achieves with `SystemSimulator` /
/// `MockSimulator` (`tests/simulator_mock.rs`).
#[async_trait]
pub trait SchedulerClient: Send + Sync {
    async fn get_task(&mut self, request_id: &RequestId, node_monitor_address: &str) -> Result<Vec<TaskLaunchSpec>>;
}

/// Production [`SchedulerClient`]: one TCP connection, framed with
/// [`FrameCodec`], matching the reference repo's `TcpSession` wire format.
pub struct TcpSchedulerClient {
    address: String,
    framed: Framed<TcpStream, FrameCodec>,
}

impl TcpSchedulerClient {
    pub async fn connect(address: &str) -> Result<Self> {
        let stream = TcpStream::connect(address).await.map_err(|source| Error::Transport { address: address.to_string(), source })?;
        Ok(TcpSchedulerClient { address: address.to_string(), framed: Framed::new(stream, FrameCodec::new()) })
    }
}

#[async_trait]
impl SchedulerClient for TcpSchedulerClient {
    async fn get_task(&mut self, request_id: &RequestId, node_monitor_address: &str) -> Result<Vec<TaskLaunchSpec>> {
        let io_err = |source: std::io::Error| Error::Transport { address: self.address.clone(), source };

        self.framed
            .send(Frame::GetTask { request_id: request_id.clone(), node_monitor_address: node_monitor_address.to_string() })
            .await
            .map_err(io_err)?;

        match self.framed.next().await {
            Some(Ok(Frame::GetTaskResponse { specs })) => Ok(specs),
            Some(Ok(Frame::Error { message })) => Err(Error::Transport {
                address: self.address.clone(),
                source: std::io::Error::new(std::io::ErrorKind::Other, message),
            }),
            Some(Ok(_)) => Err(Error::Transport {
                address: self.address.clone(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, "unexpected frame in reply to getTask"),
            }),
            Some(Err(source)) => Err(io_err(source)),
            None => Err(Error::Transport {
                address: self.address.clone(),
                source: std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "scheduler closed connection"),
            }),
        }
    }
}
