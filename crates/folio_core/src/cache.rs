use std::collections::BTreeMap;

use crate::resource::{Resource, ResourceStatus, StatusChange};

/// Identifies one outbound request. Completion events carry the token of the
/// request that produced them and are applied only while it is still active.
pub type RequestToken = u64;

/// A resource plus the token of the request currently allowed to settle it.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot<V, E> {
    resource: Resource<V, E>,
    token: Option<RequestToken>,
}

impl<V, E> Default for Slot<V, E> {
    fn default() -> Self {
        Self {
            resource: Resource::NotRequested,
            token: None,
        }
    }
}

impl<V, E> Slot<V, E> {
    pub fn resource(&self) -> &Resource<V, E> {
        &self.resource
    }

    pub fn status(&self) -> ResourceStatus {
        self.resource.status()
    }

    pub fn token(&self) -> Option<RequestToken> {
        self.token
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.token == Some(token)
    }

    /// Moves to `Pending` and makes `token` the only one that may settle.
    pub fn begin(self, token: RequestToken) -> Self {
        Self {
            resource: self.resource.set_status(StatusChange::Pending),
            token: Some(token),
        }
    }

    /// Applies `change` if `token` is active. Terminal changes retire the token.
    pub fn settle(self, token: RequestToken, change: StatusChange<V, E>) -> Self {
        self.settle_with(token, change, |_, incoming| incoming)
    }

    pub fn settle_with<F>(self, token: RequestToken, change: StatusChange<V, E>, merge: F) -> Self
    where
        F: FnOnce(Option<V>, V) -> V,
    {
        if !self.is_current(token) {
            return self;
        }
        let terminal = change.is_terminal();
        Self {
            resource: self.resource.set_status_with(change, merge),
            token: if terminal { None } else { Some(token) },
        }
    }

    /// Rewrites the resource while keeping the active token, if `token` is active.
    pub fn progress<F>(self, token: RequestToken, f: F) -> Self
    where
        F: FnOnce(Resource<V, E>) -> Resource<V, E>,
    {
        if !self.is_current(token) {
            return self;
        }
        Self {
            resource: f(self.resource),
            token: self.token,
        }
    }

    /// Forces a terminal change regardless of the active token and retires it.
    pub fn force(self, change: StatusChange<V, E>) -> Self {
        Self {
            resource: self.resource.set_status(change),
            token: None,
        }
    }

    /// Replaces the resource outright, retiring any active request.
    pub fn replace(resource: Resource<V, E>) -> Self {
        Self {
            resource,
            token: None,
        }
    }
}

/// Keyed resources. A missing key reads as `NotRequested`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceCache<K: Ord, V, E> {
    entries: BTreeMap<K, Slot<V, E>>,
}

impl<K: Ord, V, E> Default for ResourceCache<K, V, E> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Clone, V, E> ResourceCache<K, V, E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &K) -> Option<&Resource<V, E>> {
        self.entries.get(key).map(Slot::resource)
    }

    pub fn slot(&self, key: &K) -> Option<&Slot<V, E>> {
        self.entries.get(key)
    }

    pub fn status(&self, key: &K) -> ResourceStatus {
        self.entries
            .get(key)
            .map(Slot::status)
            .unwrap_or(ResourceStatus::NotRequested)
    }

    pub fn is_current(&self, key: &K, token: RequestToken) -> bool {
        self.entries
            .get(key)
            .is_some_and(|slot| slot.is_current(token))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &Resource<V, E>)> {
        self.entries.iter().map(|(key, slot)| (key, slot.resource()))
    }

    /// Replaces the slot under `key` with `f(previous)`; absent keys start
    /// from an empty slot.
    pub fn update<F>(mut self, key: K, f: F) -> Self
    where
        F: FnOnce(Slot<V, E>) -> Slot<V, E>,
    {
        let previous = self.entries.remove(&key).unwrap_or_default();
        self.entries.insert(key, f(previous));
        self
    }

    pub fn begin(self, key: K, token: RequestToken) -> Self {
        self.update(key, |slot| slot.begin(token))
    }

    /// Applies a change only if `token` is the active request for `key`.
    /// Unknown keys are left untouched.
    pub fn settle(self, key: K, token: RequestToken, change: StatusChange<V, E>) -> Self {
        if !self.is_current(&key, token) {
            return self;
        }
        self.update(key, |slot| slot.settle(token, change))
    }

    pub fn insert(mut self, key: K, resource: Resource<V, E>) -> Self {
        self.entries.insert(key, Slot::replace(resource));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Cache = ResourceCache<String, u32, String>;

    #[test]
    fn absent_key_reads_as_not_requested() {
        let cache = Cache::new();
        assert_eq!(cache.status(&"x".to_string()), ResourceStatus::NotRequested);
        assert!(cache.get(&"x".to_string()).is_none());
    }

    #[test]
    fn settle_applies_only_for_the_active_token() {
        let key = "a".to_string();
        let cache = Cache::new().begin(key.clone(), 1).begin(key.clone(), 2);

        let cache = cache.settle(key.clone(), 1, StatusChange::Success(10));
        assert_eq!(cache.status(&key), ResourceStatus::Pending);

        let cache = cache.settle(key.clone(), 2, StatusChange::Success(20));
        assert_eq!(cache.get(&key), Some(&Resource::Success(20)));
        assert!(!cache.is_current(&key, 2));
    }

    #[test]
    fn settle_ignores_unknown_keys() {
        let cache = Cache::new().settle("ghost".to_string(), 1, StatusChange::Success(1));
        assert!(cache.is_empty());
    }

    #[test]
    fn one_entry_per_key() {
        let cache = Cache::new()
            .insert("a".to_string(), Resource::Success(1))
            .begin("a".to_string(), 5);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&"a".to_string()), Some(&Resource::Pending(Some(1))));
    }

    #[test]
    fn forced_change_retires_token() {
        let slot: Slot<u32, String> = Slot::default().begin(3);
        let slot = slot.force(StatusChange::Error("cancelled".into()));
        assert_eq!(slot.token(), None);
        let slot = slot.settle(3, StatusChange::Success(1));
        assert_eq!(slot.status(), ResourceStatus::Error);
    }
}
