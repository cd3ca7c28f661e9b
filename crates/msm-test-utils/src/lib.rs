//! Testing utilities for MSM workspace
//!
//! Shared test helpers, fixtures, and a scriptable repository.

#![allow(missing_docs)]

use async_trait::async_trait;
use msm_collection::{ItemId, ParentId};
use msm_repository::{CollectionRepository, InMemoryRepository, RepositoryError, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use tokio::sync::oneshot;

pub fn ids(items: &[&str]) -> Vec<ItemId> {
    items.iter().map(|s| ItemId::from(*s)).collect()
}

pub fn host_pool() -> Vec<ItemId> {
    ids(&["hostA", "hostB", "hostC", "hostD"])
}

pub fn network_timeout() -> RepositoryError {
    RepositoryError::Transport("network timeout".to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Load,
    Add,
    Remove,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Load(ParentId),
    Add(ParentId, Vec<ItemId>),
    Remove(ParentId, Vec<ItemId>),
}

impl Call {
    pub fn operation(&self) -> Operation {
        match self {
            Self::Load(_) => Operation::Load,
            Self::Add(..) => Operation::Add,
            Self::Remove(..) => Operation::Remove,
        }
    }
}

/// Releases one gated load when dropped or released
#[derive(Debug)]
pub struct LoadGate(oneshot::Sender<()>);

impl LoadGate {
    pub fn release(self) {
        let _ = self.0.send(());
    }
}

/// Repository over an in-memory store that records calls, injects failures
/// and can hold loads until a test releases them
#[derive(Debug, Default)]
pub struct ScriptedRepository {
    store: InMemoryRepository,
    calls: Mutex<Vec<Call>>,
    failures: Mutex<HashMap<Operation, RepositoryError>>,
    gates: Mutex<HashMap<ParentId, oneshot::Receiver<()>>>,
}

impl ScriptedRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parent(mut self, parent: impl Into<ParentId>, items: Vec<ItemId>) -> Self {
        self.store = self.store.with_parent(parent, items);
        self
    }

    /// Fail every `op` with `err` until cleared
    pub fn fail(&self, op: Operation, err: RepositoryError) {
        self.failures.lock().insert(op, err);
    }

    pub fn clear_failures(&self) {
        self.failures.lock().clear();
    }

    /// Hold the next load of `parent` until the gate is released
    ///
    /// The held load still answers with the members at request time.
    pub fn gate_load(&self, parent: impl Into<ParentId>) -> LoadGate {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().insert(parent.into(), rx);
        LoadGate(tx)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn calls_of(&self, op: Operation) -> Vec<Call> {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.operation() == op)
            .cloned()
            .collect()
    }

    pub fn load_calls(&self) -> Vec<ParentId> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                Call::Load(parent) => Some(parent.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn network_calls(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn members(&self, parent: impl Into<ParentId>) -> Vec<ItemId> {
        self.store.members(&parent.into())
    }

    /// Change the store behind the synchronizer's back (another operator)
    pub async fn add_directly(&self, parent: impl Into<ParentId>, items: Vec<ItemId>) {
        let _ = self.store.add(&parent.into(), &items).await;
    }

    fn record(&self, call: Call) -> Result<()> {
        let op = call.operation();
        self.calls.lock().push(call);
        match self.failures.lock().get(&op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CollectionRepository for ScriptedRepository {
    async fn load(&self, parent: &ParentId) -> Result<Vec<ItemId>> {
        let gate = self.gates.lock().remove(parent);
        self.calls.lock().push(Call::Load(parent.clone()));
        // Answer with the store as it was when the request arrived.
        let snapshot = self.store.load(parent).await;
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if let Some(err) = self.failures.lock().get(&Operation::Load) {
            return Err(err.clone());
        }
        snapshot
    }

    async fn add(&self, parent: &ParentId, items: &[ItemId]) -> Result<()> {
        self.record(Call::Add(parent.clone(), items.to_vec()))?;
        self.store.add(parent, items).await
    }

    async fn remove(&self, parent: &ParentId, items: &[ItemId]) -> Result<()> {
        self.record(Call::Remove(parent.clone(), items.to_vec()))?;
        self.store.remove(parent, items).await
    }
}
