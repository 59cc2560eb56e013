//! Profile sync controller.
//!
//! Active only while the dialog is open and a user is signed in. Every record
//! that reaches the form through here overwrites it wholesale, unsaved edits
//! included (last-write-wins).

use crate::error::ApiError;
use crate::model::{ProfileForm, ProfileRecord, UserId};
use crate::query_cache::{QueryCache, QueryKey, Resolution};

/// A fetch the caller must issue, tagged with the cache generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchRequest {
    pub key: QueryKey,
    pub generation: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Stored and written into the form.
    Synced,
    /// Stored, but the controller is not active for this key.
    CachedOnly,
    Failed,
    Discarded,
}

#[must_use]
pub fn gate(user_id: Option<&UserId>, dialog_open: bool) -> Option<QueryKey> {
    match user_id {
        Some(id) if dialog_open => Some(QueryKey::profile(id.clone())),
        _ => None,
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProfileSync {
    active: Option<QueryKey>,
}

impl ProfileSync {
    pub fn is_active_for(&self, key: &QueryKey) -> bool {
        self.active.as_ref() == Some(key)
    }

    /// Re-evaluates the gate. On activation any cached record is delivered to
    /// the form straight away and a refetch is requested unless one is
    /// already in flight.
    pub fn reconcile(
        &mut self,
        user_id: Option<&UserId>,
        dialog_open: bool,
        cache: &mut QueryCache<ProfileRecord>,
        form: &mut ProfileForm,
    ) -> Option<FetchRequest> {
        let wanted = gate(user_id, dialog_open);
        if wanted == self.active {
            return None;
        }
        self.active.clone_from(&wanted);

        let key = wanted?;
        if let Some(record) = cache.data(&key) {
            form.overwrite_from(record);
        }
        cache
            .begin_fetch(&key)
            .map(|generation| FetchRequest { key, generation })
    }

    /// Follow-up fetch after an invalidation; only while active for `key`.
    pub fn refetch(
        &self,
        key: &QueryKey,
        cache: &mut QueryCache<ProfileRecord>,
    ) -> Option<FetchRequest> {
        if !self.is_active_for(key) {
            return None;
        }
        cache.begin_fetch(key).map(|generation| FetchRequest {
            key: key.clone(),
            generation,
        })
    }

    pub fn on_fetched(
        &self,
        key: &QueryKey,
        generation: u64,
        outcome: Result<ProfileRecord, ApiError>,
        cache: &mut QueryCache<ProfileRecord>,
        form: &mut ProfileForm,
    ) -> SyncOutcome {
        match cache.resolve(key, generation, outcome) {
            Resolution::Stored => match cache.data(key) {
                Some(record) if self.is_active_for(key) => {
                    form.overwrite_from(record);
                    SyncOutcome::Synced
                }
                _ => SyncOutcome::CachedOnly,
            },
            Resolution::Failed => SyncOutcome::Failed,
            Resolution::Superseded { .. } | Resolution::Evicted => SyncOutcome::Discarded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::model::ProfileField;

    fn uid() -> UserId {
        UserId::new("u1")
    }

    fn record(name: &str) -> ProfileRecord {
        ProfileRecord {
            full_name: Some(name.into()),
            ..ProfileRecord::default()
        }
    }

    #[test]
    fn gate_requires_user_and_open_dialog() {
        assert!(gate(None, true).is_none());
        assert!(gate(Some(&uid()), false).is_none());
        assert_eq!(gate(Some(&uid()), true), Some(QueryKey::profile(uid())));
    }

    #[test]
    fn activation_requests_fetch_once() {
        let mut sync = ProfileSync::default();
        let mut cache = QueryCache::default();
        let mut form = ProfileForm::default();

        let fetch = sync.reconcile(Some(&uid()), true, &mut cache, &mut form);
        assert_eq!(
            fetch,
            Some(FetchRequest {
                key: QueryKey::profile(uid()),
                generation: 0
            })
        );
        assert!(sync
            .reconcile(Some(&uid()), true, &mut cache, &mut form)
            .is_none());
    }

    #[test]
    fn no_fetch_without_user() {
        let mut sync = ProfileSync::default();
        let mut cache = QueryCache::default();
        let mut form = ProfileForm::default();
        assert!(sync.reconcile(None, true, &mut cache, &mut form).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn late_fetch_overwrites_local_edit() {
        let mut sync = ProfileSync::default();
        let mut cache = QueryCache::default();
        let mut form = ProfileForm::default();
        let fetch = sync
            .reconcile(Some(&uid()), true, &mut cache, &mut form)
            .unwrap();

        form.set(ProfileField::FullName, "New".into());

        let outcome = sync.on_fetched(&fetch.key, fetch.generation, Ok(record("Old")), &mut cache, &mut form);
        assert_eq!(outcome, SyncOutcome::Synced);
        assert_eq!(form.full_name, "Old");
    }

    #[test]
    fn inactive_resolution_only_fills_cache() {
        let mut sync = ProfileSync::default();
        let mut cache = QueryCache::default();
        let mut form = ProfileForm::default();
        let fetch = sync
            .reconcile(Some(&uid()), true, &mut cache, &mut form)
            .unwrap();
        sync.reconcile(Some(&uid()), false, &mut cache, &mut form);

        form.set(ProfileField::FullName, "typed".into());
        let outcome = sync.on_fetched(&fetch.key, fetch.generation, Ok(record("Server")), &mut cache, &mut form);

        assert_eq!(outcome, SyncOutcome::CachedOnly);
        assert_eq!(form.full_name, "typed");
        assert_eq!(cache.data(&fetch.key), Some(&record("Server")));
    }

    #[test]
    fn reactivation_delivers_cached_record_and_refetches() {
        let mut sync = ProfileSync::default();
        let mut cache = QueryCache::default();
        let mut form = ProfileForm::default();
        let first = sync
            .reconcile(Some(&uid()), true, &mut cache, &mut form)
            .unwrap();
        sync.on_fetched(&first.key, first.generation, Ok(record("Cached")), &mut cache, &mut form);
        sync.reconcile(Some(&uid()), false, &mut cache, &mut form);
        form = ProfileForm::default();

        let second = sync.reconcile(Some(&uid()), true, &mut cache, &mut form);
        assert_eq!(form.full_name, "Cached");
        assert!(second.is_some());
    }

    #[test]
    fn fetch_error_leaves_form_alone() {
        let mut sync = ProfileSync::default();
        let mut cache = QueryCache::default();
        let mut form = ProfileForm::default();
        let fetch = sync
            .reconcile(Some(&uid()), true, &mut cache, &mut form)
            .unwrap();
        form.set(ProfileField::Mobile, "555".into());

        let outcome = sync.on_fetched(
            &fetch.key,
            fetch.generation,
            Err(ApiError::new(ErrorKind::Server, "boom")),
            &mut cache,
            &mut form,
        );
        assert_eq!(outcome, SyncOutcome::Failed);
        assert_eq!(form.mobile, "555");
    }

    #[test]
    fn refetch_only_while_active() {
        let mut sync = ProfileSync::default();
        let mut cache = QueryCache::default();
        let mut form = ProfileForm::default();
        let key = QueryKey::profile(uid());
        assert!(sync.refetch(&key, &mut cache).is_none());

        let fetch = sync
            .reconcile(Some(&uid()), true, &mut cache, &mut form)
            .unwrap();
        sync.on_fetched(&fetch.key, fetch.generation, Ok(record("A")), &mut cache, &mut form);
        cache.invalidate(&key);
        assert_eq!(
            sync.refetch(&key, &mut cache).map(|f| f.generation),
            Some(1)
        );
    }
}
