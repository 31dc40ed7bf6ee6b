//! Shared pool of RPC clients to peer nodes.
//!
//! Holds at most one client per peer `NodeId`. Clients are handed out as
//! `Arc`s: removing a peer from the pool does not close a client that a
//! caller still holds; it is dropped once the last holder lets go.
//!
//! A single lock guards the map, and the factory runs while it is held.
//! Concurrent first requests for the same peer therefore build exactly one
//! client. Factories must be cheap: the default one only builds an
//! unconnected [`ObjectManagerClient`].

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use peerpool_proto::{Address, NodeId};
use tracing::debug;

use crate::call_manager::ClientCallManager;
use crate::client::ObjectManagerClient;

/// Builds a new client for a peer address.
pub type ClientFactory<C> = Box<dyn Fn(&Address) -> Arc<C> + Send + Sync>;

/// A pool of clients keyed by NodeId.
///
/// Not `Clone`: share the pool itself behind an `Arc` instead.
pub struct ClientPool<C> {
    clients: Mutex<HashMap<NodeId, Arc<C>>>,
    factory: ClientFactory<C>,
}

/// Pool of object manager clients, the common instantiation.
pub type ObjectManagerClientPool = ClientPool<ObjectManagerClient>;

impl<C> ClientPool<C> {
    /// Create a pool that builds clients with `factory`.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(&Address) -> Arc<C> + Send + Sync + 'static,
    {
        Self {
            clients: Mutex::new(HashMap::new()),
            factory: Box::new(factory),
        }
    }

    /// Return the cached client for `node_id`, if any.
    ///
    /// Never connects: without an address there is nothing to connect to.
    /// On a miss the caller resolves the peer's address and falls back to
    /// [`get_or_connect_by_address`](Self::get_or_connect_by_address).
    pub fn get_or_connect_by_id(&self, node_id: &NodeId) -> Option<Arc<C>> {
        self.clients.lock().get(node_id).cloned()
    }

    /// Return the cached client for the address's node, building and caching
    /// one on a miss.
    ///
    /// Only `address.node_id` is used as the key. A cached client is returned
    /// even if it was built for a different host or port.
    pub fn get_or_connect_by_address(&self, address: &Address) -> Arc<C> {
        let mut clients = self.clients.lock();
        if let Some(client) = clients.get(&address.node_id) {
            return client.clone();
        }

        debug!("client_pool: new client for {}", address);
        let client = (self.factory)(address);
        clients.insert(address.node_id, client.clone());
        client
    }

    /// Remove the client for `node_id` from the pool, if one exists.
    ///
    /// Holders of the client keep using it until they drop it.
    pub fn disconnect(&self, node_id: &NodeId) {
        // Dropped after the lock is released
        let removed = self.clients.lock().remove(node_id);
        if removed.is_some() {
            debug!("client_pool: disconnected {}", node_id);
        }
    }

    /// Remove every client from the pool.
    pub fn disconnect_all(&self) {
        let removed = std::mem::take(&mut *self.clients.lock());
        debug!("client_pool: disconnected {} clients", removed.len());
    }

    /// Check if a client for `node_id` is cached.
    pub fn contains(&self, node_id: &NodeId) -> bool {
        self.clients.lock().contains_key(node_id)
    }

    /// Get the NodeIds with a cached client.
    pub fn connected_peers(&self) -> Vec<NodeId> {
        self.clients.lock().keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.clients.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.lock().is_empty()
    }
}

impl ClientPool<ObjectManagerClient> {
    /// Create a pool whose clients all share `call_manager`.
    pub fn with_call_manager(call_manager: Arc<ClientCallManager>) -> Self {
        Self::new(move |addr: &Address| {
            Arc::new(ObjectManagerClient::new(addr.clone(), call_manager.clone()))
        })
    }
}

impl<C> std::fmt::Debug for ClientPool<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientPool")
            .field("clients", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::time::Duration;

    /// Stand-in client that reports when it is dropped.
    struct FakeClient {
        addr: Address,
        serial: usize,
        drops: Arc<AtomicUsize>,
    }

    impl Drop for FakeClient {
        fn drop(&mut self) {
            self.drops.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Harness {
        pool: ClientPool<FakeClient>,
        built: Arc<AtomicUsize>,
        drops: Arc<AtomicUsize>,
    }

    fn harness_with_delay(delay: Duration) -> Harness {
        let built = Arc::new(AtomicUsize::new(0));
        let drops = Arc::new(AtomicUsize::new(0));
        let (b, d) = (built.clone(), drops.clone());
        let pool = ClientPool::new(move |addr: &Address| {
            if !delay.is_zero() {
                std::thread::sleep(delay);
            }
            Arc::new(FakeClient {
                addr: addr.clone(),
                serial: b.fetch_add(1, Ordering::SeqCst),
                drops: d.clone(),
            })
        });
        Harness { pool, built, drops }
    }

    fn harness() -> Harness {
        harness_with_delay(Duration::ZERO)
    }

    fn make_addr(port: u16) -> Address {
        Address::new(NodeId::from_random(), "10.0.0.1", port)
    }

    #[test]
    fn test_unknown_id_is_absent() {
        let h = harness();
        assert!(h.pool.get_or_connect_by_id(&NodeId::from_random()).is_none());
        assert!(h.pool.is_empty());
        assert_eq!(h.built.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_address_lookup_is_cached() {
        let h = harness();
        let addr = make_addr(8076);

        let c1 = h.pool.get_or_connect_by_address(&addr);
        let c2 = h.pool.get_or_connect_by_address(&addr);

        assert!(Arc::ptr_eq(&c1, &c2));
        assert_eq!(c1.addr, addr);
        assert_eq!(h.built.load(Ordering::SeqCst), 1);
        assert_eq!(h.pool.len(), 1);
    }

    #[test]
    fn test_id_lookup_after_address_lookup() {
        let h = harness();
        let addr = make_addr(8076);

        let c1 = h.pool.get_or_connect_by_address(&addr);
        let c2 = h.pool.get_or_connect_by_id(&addr.node_id).unwrap();

        assert!(Arc::ptr_eq(&c1, &c2));
        assert!(h.pool.contains(&addr.node_id));
        assert_eq!(h.pool.connected_peers(), vec![addr.node_id]);
    }

    #[test]
    fn test_identity_is_the_only_key() {
        let h = harness();
        let addr = make_addr(8076);
        let moved = Address::new(addr.node_id, "10.0.0.99", 9000);

        let c1 = h.pool.get_or_connect_by_address(&addr);
        let c2 = h.pool.get_or_connect_by_address(&moved);

        assert!(Arc::ptr_eq(&c1, &c2));
        assert_eq!(c2.addr.port, 8076);
        assert_eq!(h.built.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_disconnect_then_id_lookup() {
        let h = harness();
        let addr = make_addr(8076);

        let _ = h.pool.get_or_connect_by_address(&addr);
        h.pool.disconnect(&addr.node_id);

        assert!(h.pool.get_or_connect_by_id(&addr.node_id).is_none());
        assert!(h.pool.is_empty());
    }

    #[test]
    fn test_disconnect_then_address_lookup_builds_new_client() {
        let h = harness();
        let addr = make_addr(8076);

        let c1 = h.pool.get_or_connect_by_address(&addr);
        h.pool.disconnect(&addr.node_id);
        let c2 = h.pool.get_or_connect_by_address(&addr);

        assert!(!Arc::ptr_eq(&c1, &c2));
        assert_eq!(c1.serial, 0);
        assert_eq!(c2.serial, 1);
        assert_eq!(h.built.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_disconnect_unknown_is_noop() {
        let h = harness();
        let addr = make_addr(8076);
        let _ = h.pool.get_or_connect_by_address(&addr);

        h.pool.disconnect(&NodeId::from_random());
        h.pool.disconnect(&NodeId::from_random());

        assert_eq!(h.pool.len(), 1);
        assert!(h.pool.contains(&addr.node_id));
    }

    #[test]
    fn test_held_client_outlives_disconnect() {
        let h = harness();
        let addr = make_addr(8076);

        let held = h.pool.get_or_connect_by_address(&addr);
        h.pool.disconnect(&addr.node_id);

        // Still usable while held
        assert_eq!(held.addr, addr);
        assert_eq!(h.drops.load(Ordering::SeqCst), 0);

        drop(held);
        assert_eq!(h.drops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_disconnect_all() {
        let h = harness();
        for port in 1..=4 {
            let _ = h.pool.get_or_connect_by_address(&make_addr(port));
        }
        assert_eq!(h.pool.len(), 4);

        h.pool.disconnect_all();
        assert!(h.pool.is_empty());
        assert!(h.pool.connected_peers().is_empty());
        assert_eq!(h.drops.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_concurrent_first_connect_builds_once() {
        const THREADS: usize = 16;
        // Slow factory widens the race window
        let h = harness_with_delay(Duration::from_millis(20));
        let addr = make_addr(8076);
        let barrier = Barrier::new(THREADS);

        let clients: Vec<Arc<FakeClient>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        h.pool.get_or_connect_by_address(&addr)
                    })
                })
                .collect();
            handles.into_iter().map(|t| t.join().unwrap()).collect()
        });

        assert_eq!(h.built.load(Ordering::SeqCst), 1);
        assert!(clients.iter().all(|c| Arc::ptr_eq(c, &clients[0])));
        assert_eq!(h.pool.len(), 1);
    }

    #[test]
    fn test_concurrent_distinct_peers() {
        const THREADS: usize = 8;
        let h = harness();
        let addrs: Vec<Address> = (0..THREADS as u16).map(make_addr).collect();

        std::thread::scope(|s| {
            for addr in &addrs {
                let pool = &h.pool;
                s.spawn(move || {
                    for _ in 0..100 {
                        let c = pool.get_or_connect_by_address(addr);
                        assert_eq!(c.addr.node_id, addr.node_id);
                    }
                });
            }
        });

        assert_eq!(h.built.load(Ordering::SeqCst), THREADS);
        assert_eq!(h.pool.len(), THREADS);
    }

    #[test]
    fn test_default_factory_shares_call_manager() {
        let ccm = Arc::new(ClientCallManager::default());
        let pool = ObjectManagerClientPool::with_call_manager(ccm.clone());
        let addr = Address::new(NodeId::from_random(), "192.0.2.1", 8076);

        let client = pool.get_or_connect_by_address(&addr);
        assert_eq!(client.address(), &addr);
        assert!(!client.is_connected());

        let again = pool.get_or_connect_by_id(&addr.node_id).unwrap();
        assert!(Arc::ptr_eq(&client, &again));

        // pool entry plus two holders
        assert_eq!(Arc::strong_count(&client), 3);
        // test, factory, client
        assert_eq!(Arc::strong_count(&ccm), 3);
    }
}
