//! Trait store and resolver
//!
//! Traits are named, multi-valued identity attributes (e.g. `groups`) supplied
//! once per evaluation. The store is immutable after construction and cheap to
//! clone, so one store can back concurrent evaluations.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Full trait mapping, ordered by name
pub type TraitMap = BTreeMap<String, Vec<String>>;

/// Read-only lookup of external traits
///
/// Implementations must never fail: an unknown name resolves to an empty list.
pub trait TraitResolver: Send + Sync {
    /// Values bound to `name`, or an empty list
    fn resolve(&self, name: &str) -> Vec<String>;

    /// The whole mapping, used for the bare `external` identifier
    fn resolve_all(&self) -> TraitMap;
}

/// Immutable trait store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawTraits", into = "TraitMap")]
pub struct TraitStore {
    traits: Arc<TraitMap>,
}

impl TraitStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a trait while building the store
    pub fn with_trait<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::make_mut(&mut self.traits).insert(
            name.into(),
            values.into_iter().map(Into::into).collect(),
        );
        self
    }

    /// Borrow the values bound to `name`
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.traits.get(name).map(Vec::as_slice)
    }

    /// Trait names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.traits.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.traits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traits.is_empty()
    }
}

impl TraitResolver for TraitStore {
    fn resolve(&self, name: &str) -> Vec<String> {
        self.traits.get(name).cloned().unwrap_or_default()
    }

    fn resolve_all(&self) -> TraitMap {
        (*self.traits).clone()
    }
}

impl From<TraitMap> for TraitStore {
    fn from(map: TraitMap) -> Self {
        Self {
            traits: Arc::new(map),
        }
    }
}

impl From<TraitStore> for TraitMap {
    fn from(store: TraitStore) -> Self {
        Arc::try_unwrap(store.traits).unwrap_or_else(|shared| (*shared).clone())
    }
}

impl<K, V, S> FromIterator<(K, V)> for TraitStore
where
    K: Into<String>,
    V: IntoIterator<Item = S>,
    S: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let map = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into_iter().map(Into::into).collect()))
            .collect::<TraitMap>();
        map.into()
    }
}

/// Trait files may bind a name to a single string or to an array
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTraitValue {
    One(String),
    Many(Vec<String>),
}

#[derive(Deserialize)]
#[serde(transparent)]
struct RawTraits(BTreeMap<String, RawTraitValue>);

impl From<RawTraits> for TraitStore {
    fn from(raw: RawTraits) -> Self {
        raw.0
            .into_iter()
            .map(|(name, value)| {
                let values = match value {
                    RawTraitValue::One(s) => vec![s],
                    RawTraitValue::Many(items) => items,
                };
                (name, values)
            })
            .collect::<TraitMap>()
            .into()
    }
}
