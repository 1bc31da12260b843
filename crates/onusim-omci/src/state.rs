//! Per-ONU OMCI state and the store that owns it.
//!
//! The store maps each [`OnuKey`] to its own lock. Looking an entry up only
//! touches the owning map shard for as long as it takes to clone the entry
//! handle, so work on different ONUs never waits on each other, while work on
//! the same ONU is serialized by the entry lock.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::config::ResetPolicy;
use crate::error::{OmciError, OmciResult};
use crate::message::OnuKey;

/// Coarse OMCI provisioning state of an ONU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OnuLifecycle {
    #[default]
    Incomplete,
    Done,
}

/// Next instance numbers handed out to each counter-driven entity family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceCounters {
    pub uni_g: u8,
    pub tcont: u8,
    pub pptp: u8,
    pub priority_queue: u8,
}

impl Default for InstanceCounters {
    fn default() -> Self {
        Self {
            uni_g: 1,
            tcont: 0,
            pptp: 1,
            priority_queue: 0,
        }
    }
}

/// Mutable OMCI state of one ONU.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OnuOmciState {
    /// Successful MIB upload next steps
    pub mib_upload_ctr: u16,
    /// Upload next requests past the end of the catalogue
    pub extra_mib_upload_ctr: u16,
    pub counters: InstanceCounters,
    gem_port_id: u16,
    lifecycle: OnuLifecycle,
}

impl OnuOmciState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lifecycle(&self) -> OnuLifecycle {
        self.lifecycle
    }

    /// GEM port id, only available once a GEM port has been created.
    pub fn gem_port_id(&self) -> Option<u16> {
        match self.lifecycle {
            OnuLifecycle::Done => Some(self.gem_port_id),
            OnuLifecycle::Incomplete => None,
        }
    }

    /// Record the GEM port id and mark the ONU as provisioned.
    pub fn assign_gem_port(&mut self, gem_port_id: u16) {
        self.gem_port_id = gem_port_id;
        self.lifecycle = OnuLifecycle::Done;
    }

    /// Restore counters to their initial values.
    pub fn reset(&mut self, policy: ResetPolicy) {
        self.mib_upload_ctr = 0;
        self.extra_mib_upload_ctr = 0;
        self.counters = InstanceCounters::default();
        if policy == ResetPolicy::Full {
            self.gem_port_id = 0;
            self.lifecycle = OnuLifecycle::Incomplete;
        }
    }
}

/// Shared handle to one ONU's state.
pub type SharedOnuState = Arc<Mutex<OnuOmciState>>;

/// Owned collection of per-ONU state.
#[derive(Debug, Default)]
pub struct OnuStateStore {
    states: DashMap<OnuKey, SharedOnuState>,
}

impl OnuStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the state handle for `key`, creating fresh state if absent.
    pub fn get_or_create(&self, key: OnuKey) -> SharedOnuState {
        self.states
            .entry(key)
            .or_insert_with(|| {
                tracing::debug!(onu = %key, "Creating OMCI state");
                Arc::new(Mutex::new(OnuOmciState::new()))
            })
            .value()
            .clone()
    }

    /// Snapshot of the state for `key`.
    pub fn get(&self, key: &OnuKey) -> Option<OnuOmciState> {
        self.entry(key).map(|state| snapshot(&state))
    }

    pub fn contains(&self, key: &OnuKey) -> bool {
        self.states.contains_key(key)
    }

    /// Run `f` with exclusive access to the state for `key`.
    pub fn with_state<R>(
        &self,
        key: &OnuKey,
        f: impl FnOnce(&mut OnuOmciState) -> R,
    ) -> OmciResult<R> {
        let state = self.entry(key).ok_or(OmciError::OnuNotFound(*key))?;
        let mut guard = state.lock();
        Ok(f(&mut guard))
    }

    /// Reset the state for `key`. Returns `false` if the ONU is unknown.
    pub fn reset(&self, key: &OnuKey, policy: ResetPolicy) -> bool {
        match self.with_state(key, |state| state.reset(policy)) {
            Ok(()) => {
                tracing::info!(onu = %key, ?policy, "Reset OMCI state");
                true
            }
            Err(_) => false,
        }
    }

    /// Lifecycle of `key`; unknown ONUs are reported as incomplete.
    pub fn lifecycle(&self, key: &OnuKey) -> OnuLifecycle {
        self.entry(key)
            .map(|state| snapshot(&state).lifecycle())
            .unwrap_or_default()
    }

    /// GEM port id of `key`, failing until a GEM port has been created.
    pub fn gem_port_id(&self, key: &OnuKey) -> OmciResult<u16> {
        self.with_state(key, |state| state.gem_port_id())?
            .ok_or(OmciError::NotReady(*key))
    }

    /// Drop the state for `key`, returning the final snapshot.
    pub fn remove(&self, key: &OnuKey) -> Option<OnuOmciState> {
        self.states
            .remove(key)
            .map(|(_, state)| snapshot(&state))
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// All known ONU keys, sorted.
    pub fn keys(&self) -> Vec<OnuKey> {
        let mut keys: Vec<OnuKey> = self.states.iter().map(|entry| *entry.key()).collect();
        keys.sort();
        keys
    }

    // Clone the handle so the shard lock is released before locking the entry.
    fn entry(&self, key: &OnuKey) -> Option<SharedOnuState> {
        self.states.get(key).map(|entry| entry.value().clone())
    }
}

fn snapshot(state: &SharedOnuState) -> OnuOmciState {
    state.lock().clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_counters() {
        let state = OnuOmciState::new();
        assert_eq!(state.counters.uni_g, 1);
        assert_eq!(state.counters.pptp, 1);
        assert_eq!(state.counters.tcont, 0);
        assert_eq!(state.counters.priority_queue, 0);
        assert_eq!(state.mib_upload_ctr, 0);
        assert_eq!(state.lifecycle(), OnuLifecycle::Incomplete);
        assert_eq!(state.gem_port_id(), None);
    }

    #[test]
    fn test_assign_gem_port() {
        let mut state = OnuOmciState::new();
        state.assign_gem_port(1024);
        assert_eq!(state.lifecycle(), OnuLifecycle::Done);
        assert_eq!(state.gem_port_id(), Some(1024));
    }

    #[test]
    fn test_reset_counters_only_keeps_lifecycle() {
        let mut state = OnuOmciState::new();
        state.assign_gem_port(11);
        state.mib_upload_ctr = 20;
        state.extra_mib_upload_ctr = 2;
        state.counters.pptp = 5;
        state.counters.tcont = 8;

        state.reset(ResetPolicy::CountersOnly);

        assert_eq!(state.counters, InstanceCounters::default());
        assert_eq!(state.mib_upload_ctr, 0);
        assert_eq!(state.extra_mib_upload_ctr, 0);
        assert_eq!(state.lifecycle(), OnuLifecycle::Done);
        assert_eq!(state.gem_port_id(), Some(11));
    }

    #[test]
    fn test_reset_full_rolls_back_lifecycle() {
        let mut state = OnuOmciState::new();
        state.assign_gem_port(11);
        state.reset(ResetPolicy::Full);
        assert_eq!(state.lifecycle(), OnuLifecycle::Incomplete);
        assert_eq!(state.gem_port_id(), None);
    }

    #[test]
    fn test_store_get_or_create_is_idempotent() {
        let store = OnuStateStore::new();
        let key = OnuKey::new(0, 1);
        let first = store.get_or_create(key);
        first.lock().counters.pptp = 9;
        let second = store.get_or_create(key);
        assert_eq!(second.lock().counters.pptp, 9);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_missing_onu() {
        let store = OnuStateStore::new();
        let key = OnuKey::new(2, 2);
        assert!(store.get(&key).is_none());
        assert!(!store.reset(&key, ResetPolicy::CountersOnly));
        assert_eq!(store.lifecycle(&key), OnuLifecycle::Incomplete);
        assert_eq!(store.gem_port_id(&key), Err(OmciError::OnuNotFound(key)));
        assert_eq!(
            store.with_state(&key, |_| ()),
            Err(OmciError::OnuNotFound(key))
        );
    }

    #[test]
    fn test_store_remove_and_keys() {
        let store = OnuStateStore::new();
        store.get_or_create(OnuKey::new(1, 0));
        store.get_or_create(OnuKey::new(0, 1));
        store.get_or_create(OnuKey::new(0, 0));
        assert_eq!(
            store.keys(),
            vec![OnuKey::new(0, 0), OnuKey::new(0, 1), OnuKey::new(1, 0)]
        );

        assert!(store.remove(&OnuKey::new(0, 1)).is_some());
        assert!(store.remove(&OnuKey::new(0, 1)).is_none());
        assert_eq!(store.len(), 2);
        assert!(!store.is_empty());
    }
}
