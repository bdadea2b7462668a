//! Name-keyed container of repository instances.
//!
//! Built once while modules initialize and shared as `Arc<RepositoryRegistry>`.
//! Lookups take a read lock only. Entries are stored as `Arc<T>` behind
//! `dyn Any`, so `T` is usually a trait object such as
//! `dyn Repository<Course>`.
//!
//! Names are case-insensitive. A token is an optional second key, for callers
//! that address a repository by role rather than entity name.

use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no repository registered under '{0}'")]
    NotFound(String),

    #[error("repository '{name}' is a {stored}, not a {requested}")]
    TypeMismatch {
        name: String,
        stored: &'static str,
        requested: &'static str,
    },
}

struct Entry {
    token: Option<Arc<str>>,
    type_name: &'static str,
    value: Box<dyn Any + Send + Sync>,
}

#[derive(Default)]
struct Inner {
    by_name: HashMap<String, Entry>,
    by_token: HashMap<Arc<str>, String>,
}

#[derive(Default)]
pub struct RepositoryRegistry {
    inner: RwLock<Inner>,
}

fn normalize(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

impl RepositoryRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `repo` under `name`, replacing any previous entry.
    pub fn register<T>(&self, name: &str, repo: Arc<T>)
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.insert(name, None, repo);
    }

    /// Registers `repo` under `name` and also under `token`.
    pub fn register_with_token<T>(&self, name: &str, repo: Arc<T>, token: impl Into<Arc<str>>)
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.insert(name, Some(token.into()), repo);
    }

    fn insert<T>(&self, name: &str, token: Option<Arc<str>>, repo: Arc<T>)
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let key = normalize(name);
        let mut w = self.inner.write();
        // Drop the entry's previous token only while it still points here.
        if let Some(old) = w.by_name.get(&key).and_then(|e| e.token.clone())
            && w.by_token.get(&old) == Some(&key)
        {
            w.by_token.remove(&old);
        }
        // A token taken over from another name no longer belongs to that entry.
        if let Some(token) = &token
            && let Some(prev) = w.by_token.insert(token.clone(), key.clone())
            && prev != key
            && let Some(entry) = w.by_name.get_mut(&prev)
        {
            entry.token = None;
        }
        tracing::debug!(name = %key, token = ?token.as_deref(), "repository registered");
        w.by_name.insert(
            key,
            Entry {
                token,
                type_name: std::any::type_name::<T>(),
                value: Box::new(repo),
            },
        );
    }

    /// # Errors
    ///
    /// [`RegistryError::NotFound`] for an unknown name,
    /// [`RegistryError::TypeMismatch`] when the entry is not an `Arc<T>`.
    pub fn get<T>(&self, name: &str) -> Result<Arc<T>, RegistryError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let key = normalize(name);
        let r = self.inner.read();
        let entry = r
            .by_name
            .get(&key)
            .ok_or_else(|| RegistryError::NotFound(key.clone()))?;
        downcast::<T>(&key, entry)
    }

    /// # Errors
    ///
    /// Same as [`RepositoryRegistry::get`].
    pub fn get_by_token<T>(&self, token: &str) -> Result<Arc<T>, RegistryError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let r = self.inner.read();
        let entry = r
            .by_token
            .get(token)
            .and_then(|name| r.by_name.get(name).map(|e| (name, e)));
        match entry {
            Some((name, entry)) => downcast::<T>(name, entry),
            None => Err(RegistryError::NotFound(token.to_owned())),
        }
    }

    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.inner.read().by_name.contains_key(&normalize(name))
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.read().by_name.keys().cloned().collect();
        names.sort();
        names
    }

    /// Every entry stored as `Arc<T>`, sorted by name. Entries of other types are skipped.
    #[must_use]
    pub fn get_all<T>(&self) -> Vec<(String, Arc<T>)>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let r = self.inner.read();
        let mut all: Vec<(String, Arc<T>)> = r
            .by_name
            .iter()
            .filter_map(|(name, e)| {
                e.value
                    .downcast_ref::<Arc<T>>()
                    .map(|arc| (name.clone(), Arc::clone(arc)))
            })
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }

    /// Drops every entry. Meant for test teardown.
    pub fn clear(&self) {
        let mut w = self.inner.write();
        w.by_name.clear();
        w.by_token.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().by_name.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().by_name.is_empty()
    }
}

fn downcast<T>(name: &str, entry: &Entry) -> Result<Arc<T>, RegistryError>
where
    T: ?Sized + Send + Sync + 'static,
{
    entry
        .value
        .downcast_ref::<Arc<T>>()
        .cloned()
        .ok_or_else(|| RegistryError::TypeMismatch {
            name: name.to_owned(),
            stored: entry.type_name,
            requested: std::any::type_name::<T>(),
        })
}

impl std::fmt::Debug for RepositoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryRegistry")
            .field("names", &self.names())
            .finish()
    }
}
