/// Request and response messages for the object manager RPC.
///
/// Each request frame carries a `(RequestHeader, ObjectManagerRequest)`
/// tuple; each response frame carries one `ObjectManagerResponse`. Both are
/// serialized with serde+bincode.

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::error::{RpcError, RpcResult};
use crate::id::{NodeId, ObjectId};

/// Common header for all requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestHeader {
    /// Protocol version
    pub proto_ver: u8,
    /// Request ID (echoed back in the response)
    pub id: u64,
}

/// Object manager requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ObjectManagerRequest {
    /// Push one chunk of an object to the remote node.
    Push {
        /// Identifies one push of one object; shared by all its chunks
        push_id: u64,
        object_id: ObjectId,
        /// Owner of the object, so the receiver can report back
        owner: Address,
        chunk_index: u32,
        total_chunks: u32,
        data_size: u64,
        metadata_size: u64,
        data: Vec<u8>,
    },
    /// Ask the remote node to push an object to `node_id`.
    Pull {
        node_id: NodeId,
        object_id: ObjectId,
    },
    /// Ask the remote node to drop its copies of these objects.
    FreeObjects {
        object_ids: Vec<ObjectId>,
    },
}

impl ObjectManagerRequest {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Push { .. } => "Push",
            Self::Pull { .. } => "Pull",
            Self::FreeObjects { .. } => "FreeObjects",
        }
    }
}

/// Object manager response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectManagerResponse {
    /// ID of the request this answers
    pub id: u64,
    /// 0 on success, otherwise an [`RpcError`] wire code
    pub status: u32,
}

impl ObjectManagerResponse {
    pub fn ok(id: u64) -> Self {
        Self { id, status: 0 }
    }

    pub fn error(id: u64, err: RpcError) -> Self {
        Self {
            id,
            status: err.to_code(),
        }
    }

    /// Convert the wire status into a result.
    pub fn into_result(self) -> RpcResult<()> {
        match RpcError::from_code(self.status) {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }
}
