//! Object manager RPC client for one peer node.
//!
//! Constructing a client does no I/O. The TCP connection is opened by the
//! first call and reused by later ones; a call that fails on the wire drops
//! the connection so the next call opens a fresh one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use peerpool_proto::constants::OM_PROTO_VER;
use peerpool_proto::{
    Address, NodeId, ObjectId, ObjectManagerRequest, ObjectManagerResponse, RequestHeader,
    RpcError, RpcResult,
};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::call_manager::ClientCallManager;
use crate::frame;
use crate::net;

/// Client to a single peer's object manager.
///
/// Calls on one client are serialized over its single connection.
pub struct ObjectManagerClient {
    address: Address,
    call_manager: Arc<ClientCallManager>,
    stream: Mutex<Option<TcpStream>>,
    connected: AtomicBool,
}

impl ObjectManagerClient {
    pub fn new(address: Address, call_manager: Arc<ClientCallManager>) -> Self {
        Self {
            address,
            call_manager,
            stream: Mutex::new(None),
            connected: AtomicBool::new(false),
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn node_id(&self) -> NodeId {
        self.address.node_id
    }

    /// Whether a connection is currently held open.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Push a whole object, split into chunks of the configured size.
    ///
    /// `payload` holds the object data followed by `metadata_size` bytes of
    /// metadata. Chunks are sent in order; the first failure stops the push.
    pub async fn push_object(
        &self,
        object_id: ObjectId,
        owner: &Address,
        payload: &[u8],
        metadata_size: u64,
    ) -> RpcResult<()> {
        let total_size = payload.len() as u64;
        if metadata_size > total_size {
            return Err(RpcError::InvalidArgument);
        }

        let chunk_size = self.call_manager.config().push_chunk_size.max(1);
        let chunks: Vec<&[u8]> = if payload.is_empty() {
            vec![payload]
        } else {
            payload.chunks(chunk_size).collect()
        };
        let total_chunks = u32::try_from(chunks.len()).map_err(|_| RpcError::InvalidArgument)?;
        let push_id = self.call_manager.next_push_id();

        debug!(
            "push {:?} to {}: {} bytes in {} chunks",
            object_id, self.address, total_size, total_chunks
        );

        for (chunk_index, chunk) in chunks.into_iter().enumerate() {
            self.call(ObjectManagerRequest::Push {
                push_id,
                object_id,
                owner: owner.clone(),
                chunk_index: chunk_index as u32,
                total_chunks,
                data_size: total_size - metadata_size,
                metadata_size,
                data: chunk.to_vec(),
            })
            .await?;
        }
        Ok(())
    }

    /// Ask the peer to push `object_id` to `node_id`.
    pub async fn pull(&self, node_id: NodeId, object_id: ObjectId) -> RpcResult<()> {
        self.call(ObjectManagerRequest::Pull { node_id, object_id })
            .await
    }

    /// Ask the peer to free its copies of `object_ids`.
    pub async fn free_objects(&self, object_ids: Vec<ObjectId>) -> RpcResult<()> {
        if object_ids.is_empty() {
            return Ok(());
        }
        self.call(ObjectManagerRequest::FreeObjects { object_ids })
            .await
    }

    async fn call(&self, req: ObjectManagerRequest) -> RpcResult<()> {
        let (id, guard) = self.call_manager.begin_call();
        let name = req.name();

        let result = self.exchange(id, req).await;
        if let Err(e) = &result {
            warn!("{} #{} to {} failed: {}", name, id, self.address, e);
        }
        guard.finish(&result);
        result
    }

    /// Send one request and wait for its response on the shared connection.
    async fn exchange(&self, id: u64, req: ObjectManagerRequest) -> RpcResult<()> {
        let config = self.call_manager.config();
        let header = RequestHeader {
            proto_ver: OM_PROTO_VER,
            id,
        };
        // Encoding errors are local; fail before touching the connection
        let request = frame::encode_frame(&(header, req), config.max_frame_size)?;

        let mut slot = self.stream.lock().await;
        let mut stream = match slot.take() {
            Some(stream) => stream,
            None => net::connect_to_addr(&self.address, config.tcp_nodelay).await?,
        };
        // The stream is out of the slot until the exchange completes. A
        // cancelled call drops it here, leaving the client disconnected.
        self.connected.store(false, Ordering::Release);

        let wire_result = async {
            frame::write_encoded(&mut stream, &request).await?;
            let resp: ObjectManagerResponse =
                frame::read_frame(&mut stream, config.max_frame_size).await?;
            if resp.id != id {
                return Err(RpcError::ProtocolMismatch);
            }
            Ok::<ObjectManagerResponse, RpcError>(resp)
        }
        .await;

        // On a wire error the stream is dropped: its state is unknown
        let resp = wire_result?;

        // Return the connection for the next call
        *slot = Some(stream);
        self.connected.store(true, Ordering::Release);
        resp.into_result()
    }
}

impl std::fmt::Debug for ObjectManagerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectManagerClient")
            .field("address", &self.address)
            .field("connected", &self.is_connected())
            .finish()
    }
}
