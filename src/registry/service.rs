use super::types::{Node, NodeSpec, StartupPolicy};
use crate::error::{BackendError, Result, StoreError};
use crate::node::{NodeBackend, NodeConnector};

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{info, warn};

/// Default bound on a single connect or health-check ping.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

struct NodeSlot {
    spec: NodeSpec,
    /// `None` when the connector could not open the node at all.
    handle: Option<Arc<dyn NodeBackend>>,
    available: AtomicBool,
    /// Set by an operator taking the node down; health checks leave such nodes alone.
    held_down: AtomicBool,
}

impl NodeSlot {
    fn is_live(&self) -> bool {
        self.handle.is_some() && self.available.load(Ordering::SeqCst)
    }

    fn snapshot(&self) -> Node {
        Node {
            name: self.spec.name.clone(),
            endpoint: self.spec.endpoint.clone(),
            available: self.is_live(),
        }
    }
}

pub struct NodeRegistry {
    slots: Vec<NodeSlot>,
    connect_timeout: Duration,
}

impl NodeRegistry {
    /// Opens and pings every configured node, in order.
    ///
    /// Under [`StartupPolicy::FailFast`] the first node that cannot be opened or does
    /// not answer within `connect_timeout` aborts construction with
    /// [`StoreError::ConnectFailure`]. Under [`StartupPolicy::Degraded`] such nodes
    /// are kept but start unavailable.
    pub async fn connect(
        specs: Vec<NodeSpec>,
        connector: &dyn NodeConnector,
        policy: StartupPolicy,
        connect_timeout: Duration,
    ) -> Result<Arc<Self>> {
        validate_specs(&specs)?;

        info!(
            "Connecting to {} node(s) ({:?}, timeout {:?})",
            specs.len(),
            policy,
            connect_timeout
        );

        let mut slots = Vec::with_capacity(specs.len());
        for spec in specs {
            let (handle, reachable) = match connector.open(&spec).await {
                Ok(handle) => match ping_within(handle.as_ref(), connect_timeout).await {
                    Ok(()) => (Some(handle), true),
                    Err(source) => {
                        if policy == StartupPolicy::FailFast {
                            return Err(connect_failure(&spec, source));
                        }
                        warn!(
                            "Node {} at {} did not answer ({}), starting unavailable",
                            spec.name, spec.endpoint, source
                        );
                        (Some(handle), false)
                    }
                },
                Err(source) => {
                    if policy == StartupPolicy::FailFast {
                        return Err(connect_failure(&spec, source));
                    }
                    warn!(
                        "Could not open node {} at {} ({}), it will stay unavailable",
                        spec.name, spec.endpoint, source
                    );
                    (None, false)
                }
            };

            if reachable {
                info!("Connected to {} ({})", spec.name, spec.endpoint);
            }

            slots.push(NodeSlot {
                spec,
                handle,
                available: AtomicBool::new(reachable),
                held_down: AtomicBool::new(false),
            });
        }

        Ok(Arc::new(Self {
            slots,
            connect_timeout,
        }))
    }

    /// All nodes in configured order.
    pub fn nodes(&self) -> Vec<Node> {
        self.slots.iter().map(NodeSlot::snapshot).collect()
    }

    pub fn node(&self, index: usize) -> Option<Node> {
        self.slots.get(index).map(NodeSlot::snapshot)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.slots.get(index).map(|slot| slot.spec.name.as_str())
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|slot| slot.spec.name == name)
    }

    pub fn is_available(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(NodeSlot::is_live)
    }

    pub fn available_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_live()).count()
    }

    /// Whether an operator took the node at `index` down.
    pub fn is_held_down(&self, index: usize) -> bool {
        self.slots
            .get(index)
            .is_some_and(|slot| slot.held_down.load(Ordering::SeqCst))
    }

    /// Flips the availability flag of a node.
    ///
    /// Marking a node unavailable holds it down: health checks skip it until it is
    /// marked available again. A node that never got a handle stays unavailable
    /// whatever the flag says.
    pub fn mark_available(&self, name: &str, available: bool) -> Result<()> {
        let slot = self
            .slots
            .iter()
            .find(|slot| slot.spec.name == name)
            .ok_or_else(|| StoreError::UnknownNode(name.to_string()))?;

        slot.held_down.store(!available, Ordering::SeqCst);
        let previous = slot.available.swap(available, Ordering::SeqCst);
        if previous != available {
            info!(
                "Node {} marked {}",
                name,
                if available { "available" } else { "unavailable" }
            );
        }
        if available && slot.handle.is_none() {
            warn!("Node {} has no handle and remains unavailable", name);
        }

        Ok(())
    }

    /// Handle of the node at `index`, if it is usable right now.
    pub fn live_handle(&self, index: usize) -> Result<Arc<dyn NodeBackend>> {
        let slot = self
            .slots
            .get(index)
            .ok_or_else(|| StoreError::UnknownNode(format!("#{}", index)))?;

        match &slot.handle {
            Some(handle) if slot.available.load(Ordering::SeqCst) => Ok(handle.clone()),
            _ => Err(StoreError::NodeUnavailable {
                node: slot.spec.name.clone(),
            }),
        }
    }

    /// Pings every node that has a handle and updates its availability.
    ///
    /// Nodes held down through [`Self::mark_available`] are not pinged. Visits nodes
    /// one at a time; returns the resulting view of the cluster.
    pub async fn health_check(&self) -> Vec<Node> {
        for slot in &self.slots {
            let Some(handle) = &slot.handle else {
                continue;
            };
            if slot.held_down.load(Ordering::SeqCst) {
                tracing::debug!("Node {} is held down, skipping health check", slot.spec.name);
                continue;
            }

            let alive = match ping_within(handle.as_ref(), self.connect_timeout).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::debug!("Health check of {} failed: {}", slot.spec.name, e);
                    false
                }
            };

            // Taken down while the ping was in flight.
            if slot.held_down.load(Ordering::SeqCst) {
                continue;
            }

            let previous = slot.available.swap(alive, Ordering::SeqCst);
            if previous && !alive {
                warn!("Node {} stopped answering, marked unavailable", slot.spec.name);
            } else if !previous && alive {
                info!("Node {} is answering again, marked available", slot.spec.name);
            }
        }

        self.nodes()
    }

    /// Runs [`Self::health_check`] every `interval` on a background task.
    pub fn spawn_health_checks(self: Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let nodes = self.health_check().await;
                let alive = nodes.iter().filter(|node| node.available).count();
                tracing::debug!("Health check: {}/{} nodes available", alive, nodes.len());
            }
        })
    }
}

async fn ping_within(handle: &dyn NodeBackend, timeout: Duration) -> Result<(), BackendError> {
    match tokio::time::timeout(timeout, handle.ping()).await {
        Ok(result) => result,
        Err(_) => Err(BackendError::Timeout),
    }
}

fn connect_failure(spec: &NodeSpec, source: BackendError) -> StoreError {
    tracing::error!(
        "Failed to connect to {} at {}: {}",
        spec.name,
        spec.endpoint,
        source
    );
    StoreError::ConnectFailure {
        node: spec.name.clone(),
        endpoint: spec.endpoint.clone(),
        source,
    }
}

fn validate_specs(specs: &[NodeSpec]) -> Result<()> {
    if specs.is_empty() {
        return Err(StoreError::Config(
            "at least one node is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for spec in specs {
        if spec.name.trim().is_empty() {
            return Err(StoreError::Config("node names must not be empty".to_string()));
        }
        if !seen.insert(spec.name.as_str()) {
            return Err(StoreError::Config(format!(
                "duplicate node name '{}'",
                spec.name
            )));
        }
    }

    Ok(())
}
