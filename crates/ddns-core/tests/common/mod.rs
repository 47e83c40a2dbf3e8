//! Test doubles and common utilities for contract tests
//!
//! Clones of each double share their state, so a test can keep one handle
//! while the reconciler owns a boxed copy.

#![allow(dead_code)]

use async_trait::async_trait;
use ddns_core::error::{Error, Result};
use ddns_core::traits::{
    Account, AddressSource, RecordDirectory, RecordLookupResult, RecordReadResult,
    ZoneLookupResult,
};
use ddns_core::{
    Mode, ObservedAddress, ReconciliationTarget, RecordFamily, RecordPayload, RecordTypeSelector,
    Reconciler, Ticker, Ttl,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

/// Every call the reconciler made against the directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListAccounts,
    FindZone(String),
    FindRecord(RecordFamily),
    ReadContent(String),
    Create(RecordPayload),
    Update(String, RecordPayload),
    Delete(String),
}

impl Call {
    pub fn is_mutation(&self) -> bool {
        matches!(self, Call::Create(_) | Call::Update(..) | Call::Delete(_))
    }
}

/// Operations that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    FindRecord,
    ReadContent,
    Create,
    Update,
    Delete,
}

#[derive(Default)]
struct DirectoryState {
    records: HashMap<RecordFamily, Vec<(String, String)>>,
    calls: Vec<Call>,
    failing: HashSet<Op>,
    malformed_read: bool,
    next_id: usize,
}

/// In-memory record store that logs every call
#[derive(Clone, Default)]
pub struct MockDirectory {
    state: Arc<Mutex<DirectoryState>>,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record; returns its id
    pub fn insert(&self, family: RecordFamily, content: &str) -> String {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = format!("rec-{}", state.next_id);
        state
            .records
            .entry(family)
            .or_default()
            .push((id.clone(), content.to_string()));
        id
    }

    pub fn content(&self, family: RecordFamily) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .records
            .get(&family)
            .and_then(|r| r.first())
            .map(|(_, content)| content.clone())
    }

    pub fn record_count(&self, family: RecordFamily) -> usize {
        let state = self.state.lock().unwrap();
        state.records.get(&family).map_or(0, Vec::len)
    }

    pub fn fail(&self, op: Op) {
        self.state.lock().unwrap().failing.insert(op);
    }

    pub fn recover(&self, op: Op) {
        self.state.lock().unwrap().failing.remove(&op);
    }

    /// Make content reads return a reply without a content field
    pub fn malformed_reads(&self) {
        self.state.lock().unwrap().malformed_read = true;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    fn begin(&self, call: Call, op: Option<Op>) -> Result<std::sync::MutexGuard<'_, DirectoryState>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if let Some(op) = op
            && state.failing.contains(&op)
        {
            return Err(Error::directory(format!(
                "API error: [{{\"code\":1000,\"message\":\"{:?} rejected\"}}]",
                op
            )));
        }
        Ok(state)
    }
}

#[async_trait]
impl RecordDirectory for MockDirectory {
    async fn list_accounts(&self) -> Result<Vec<Account>> {
        self.begin(Call::ListAccounts, None)?;
        Ok(vec![Account {
            id: Some("acc-1".into()),
            name: "Test Account".into(),
        }])
    }

    async fn find_zone_id(&self, zone_name: &str) -> Result<ZoneLookupResult> {
        self.begin(Call::FindZone(zone_name.to_string()), None)?;
        Ok(ZoneLookupResult::Found("zone-1".into()))
    }

    async fn find_record(
        &self,
        _zone_id: &str,
        _name: &str,
        family: RecordFamily,
    ) -> Result<RecordLookupResult> {
        let state = self.begin(Call::FindRecord(family), Some(Op::FindRecord))?;
        Ok(match state.records.get(&family) {
            Some(records) if !records.is_empty() => RecordLookupResult::Found {
                record_id: records[0].0.clone(),
                candidates: records.len(),
            },
            _ => RecordLookupResult::NotFound,
        })
    }

    async fn read_record_content(
        &self,
        _zone_id: &str,
        record_id: &str,
    ) -> Result<RecordReadResult> {
        let state = self.begin(Call::ReadContent(record_id.to_string()), Some(Op::ReadContent))?;
        if state.malformed_read {
            return Ok(RecordReadResult::Malformed("record content not found".into()));
        }
        let content = state
            .records
            .values()
            .flatten()
            .find(|(id, _)| id == record_id)
            .map(|(_, content)| content.clone());
        Ok(match content {
            Some(content) => RecordReadResult::Found(content),
            None => RecordReadResult::NotFound,
        })
    }

    async fn create_record(&self, _zone_id: &str, payload: &RecordPayload) -> Result<()> {
        let mut state = self.begin(Call::Create(payload.clone()), Some(Op::Create))?;
        state.next_id += 1;
        let id = format!("rec-{}", state.next_id);
        state
            .records
            .entry(payload.record_type)
            .or_default()
            .push((id, payload.content.clone()));
        Ok(())
    }

    async fn update_record(
        &self,
        _zone_id: &str,
        record_id: &str,
        payload: &RecordPayload,
    ) -> Result<()> {
        let mut state = self.begin(
            Call::Update(record_id.to_string(), payload.clone()),
            Some(Op::Update),
        )?;
        for (id, content) in state.records.values_mut().flatten() {
            if id == record_id {
                *content = payload.content.clone();
            }
        }
        Ok(())
    }

    async fn delete_record(&self, _zone_id: &str, record_id: &str) -> Result<()> {
        let mut state = self.begin(Call::Delete(record_id.to_string()), Some(Op::Delete))?;
        for records in state.records.values_mut() {
            records.retain(|(id, _)| id != record_id);
        }
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

#[derive(Default)]
struct AddressState {
    addresses: HashMap<RecordFamily, String>,
}

/// Address source answering from a mutable table
#[derive(Clone, Default)]
pub struct ScriptedAddressSource {
    state: Arc<Mutex<AddressState>>,
    resolve_calls: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    delay: Option<Duration>,
}

impl ScriptedAddressSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every resolve take `delay` on the tokio clock
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set(&self, family: RecordFamily, literal: &str) {
        self.state
            .lock()
            .unwrap()
            .addresses
            .insert(family, literal.to_string());
    }

    /// Make `family` unavailable
    pub fn clear(&self, family: RecordFamily) {
        self.state.lock().unwrap().addresses.remove(&family);
    }

    pub fn resolve_calls(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }

    /// Highest number of resolves that were running at the same time
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AddressSource for ScriptedAddressSource {
    async fn resolve(&self, family: RecordFamily) -> Result<ObservedAddress> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let literal = self.state.lock().unwrap().addresses.get(&family).cloned();
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match literal {
            Some(literal) => ObservedAddress::parse(&literal, family),
            None => Err(Error::address(family, "no valid IP found")),
        }
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}

/// Ticker fired by hand through the returned sender
pub struct ManualTicker {
    rx: mpsc::UnboundedReceiver<()>,
}

impl ManualTicker {
    pub fn new() -> (Self, mpsc::UnboundedSender<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { rx }, tx)
    }
}

#[async_trait]
impl Ticker for ManualTicker {
    async fn tick(&mut self) {
        if self.rx.recv().await.is_none() {
            std::future::pending::<()>().await;
        }
    }
}

pub fn target(selector: RecordTypeSelector, mode: Mode) -> ReconciliationTarget {
    ReconciliationTarget {
        zone_id: "zone-1".into(),
        record_name: "ddns.example.com".into(),
        selector,
        ttl: Ttl::AUTO,
        proxied: false,
        mode,
    }
}

pub fn reconciler(
    target: ReconciliationTarget,
    directory: &MockDirectory,
    addresses: &ScriptedAddressSource,
) -> Reconciler {
    Reconciler::new(target, Box::new(directory.clone()), Box::new(addresses.clone()))
}
