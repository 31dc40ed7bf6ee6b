//! Async TCP connect helpers.

use peerpool_proto::{Address, RpcError, RpcResult};
use tokio::net::TcpStream;
use tracing::debug;

/// Connect to a peer's object manager.
pub async fn connect_to_addr(addr: &Address, nodelay: bool) -> RpcResult<TcpStream> {
    let target = addr.endpoint();
    debug!("connecting to {} ({})", target, addr.node_id);

    let stream = TcpStream::connect(&target).await.map_err(|e| {
        debug!("connect to {} failed: {}", target, e);
        RpcError::NetworkError
    })?;

    if nodelay {
        stream.set_nodelay(true).ok();
    }
    Ok(stream)
}
