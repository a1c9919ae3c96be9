#![allow(dead_code)]

use componentstore_core::{
    Component, ComponentQuery, ConnectionProvider, EntityAdapter, EntityId, StoreError,
    StoreResult,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex};

/// Handle given out by [`MemoryProvider`].
#[derive(Debug)]
pub struct MemoryConnection {
    pub serial: usize,
}

/// Provider that counts every acquire/release and can be switched offline.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    acquired: AtomicUsize,
    released: AtomicUsize,
    offline: AtomicBool,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

impl ConnectionProvider for MemoryProvider {
    type Connection = MemoryConnection;

    fn acquire(&self) -> StoreResult<MemoryConnection> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::ConnectionUnavailable(
                "memory provider offline".to_string(),
            ));
        }
        let serial = self.acquired.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(MemoryConnection { serial })
    }

    fn release(&self, _connection: MemoryConnection) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Failure injected into the next adapter call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Error,
    Panic,
}

/// Component adapter keeping rows in memory and recording every call.
#[derive(Debug, Default)]
pub struct MemoryAdapter {
    rows: Mutex<BTreeMap<EntityId, Component>>,
    calls: AtomicUsize,
    registered: AtomicUsize,
    fault: Mutex<Option<Fault>>,
    fail_register: AtomicBool,
    panic_register: AtomicBool,
    register_gate: Mutex<Option<Arc<Barrier>>>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn registrations(&self) -> usize {
        self.registered.load(Ordering::SeqCst)
    }

    pub fn inject(&self, fault: Fault) {
        *self.fault.lock().unwrap() = Some(fault);
    }

    /// Makes `register` meet `gate` twice: once on entry, once before
    /// returning, so a test can observe the store while it is starting.
    pub fn hold_register(&self, gate: Arc<Barrier>) {
        *self.register_gate.lock().unwrap() = Some(gate);
    }

    pub fn fail_register(&self) {
        self.fail_register.store(true, Ordering::SeqCst);
    }

    pub fn panic_register(&self) {
        self.panic_register.store(true, Ordering::SeqCst);
    }

    /// Direct access to persisted rows, bypassing the store.
    pub fn persisted(&self, id: EntityId) -> Option<Component> {
        self.rows.lock().unwrap().get(&id).cloned()
    }

    fn enter(&self) -> StoreResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let fault = self.fault.lock().unwrap().take();
        match fault {
            Some(Fault::Error) => Err(StoreError::InvalidData("injected fault".to_string())),
            Some(Fault::Panic) => panic!("injected adapter panic"),
            None => Ok(()),
        }
    }
}

impl EntityAdapter<MemoryConnection> for MemoryAdapter {
    type Entity = Component;
    type Query = ComponentQuery;

    fn register(&self, _conn: &mut MemoryConnection) -> StoreResult<()> {
        self.registered.fetch_add(1, Ordering::SeqCst);
        let gate = self.register_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.wait();
            gate.wait();
        }
        if self.panic_register.load(Ordering::SeqCst) {
            panic!("schema bootstrap panicked");
        }
        if self.fail_register.load(Ordering::SeqCst) {
            return Err(StoreError::InvalidData("schema bootstrap failed".to_string()));
        }
        Ok(())
    }

    fn read(&self, _conn: &mut MemoryConnection, id: EntityId) -> StoreResult<Component> {
        self.enter()?;
        self.persisted(id).ok_or(StoreError::NotFound(id))
    }

    fn add(&self, _conn: &mut MemoryConnection, entity: &Component) -> StoreResult<EntityId> {
        self.enter()?;
        entity.validate()?;
        self.rows.lock().unwrap().insert(entity.id, entity.clone());
        Ok(entity.id)
    }

    fn edit(
        &self,
        _conn: &mut MemoryConnection,
        id: EntityId,
        entity: &Component,
    ) -> StoreResult<()> {
        self.enter()?;
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&id) {
            Some(row) => {
                *row = entity.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(id)),
        }
    }

    fn delete(&self, _conn: &mut MemoryConnection, id: EntityId) -> StoreResult<()> {
        self.enter()?;
        self.rows
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }

    fn browse(
        &self,
        _conn: &mut MemoryConnection,
        query: &ComponentQuery,
    ) -> StoreResult<Vec<Component>> {
        self.enter()?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|component| query.matches(component))
            .cloned()
            .collect())
    }
}

pub fn sample_component(name: &str) -> Component {
    Component::new("maven-releases", "maven2", name)
        .group("org.example")
        .version("1.0.0")
}
