//! In-process object store
//!
//! Behaves like the API server for the operations the dashboard uses:
//! server fields are assigned on create, duplicates and stale replaces are
//! rejected, and lists come back ordered by name.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use kube::api::{ApiResource, DynamicObject};
use parking_lot::Mutex;

use kubedash_common::{Error, Result};

use super::{Location, ObjectStore};

type Bucket = BTreeMap<String, DynamicObject>;

#[derive(Default)]
struct State {
    buckets: BTreeMap<(Location, String), Bucket>,
    revision: u64,
}

impl State {
    fn next_revision(&mut self) -> String {
        self.revision += 1;
        self.revision.to_string()
    }
}

/// [`ObjectStore`] holding objects in memory
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

fn bucket_key(location: &Location, resource: &ApiResource) -> (Location, String) {
    (
        location.clone(),
        format!("{}/{}", resource.api_version, resource.plural),
    )
}

/// Match an equality-based selector such as `a=b,c=d`
fn matches_selector(object: &DynamicObject, selector: &str) -> bool {
    let labels = object.metadata.labels.clone().unwrap_or_default();
    selector
        .split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .all(|term| match term.split_once('=') {
            Some((key, value)) => {
                labels.get(key.trim()).map(String::as_str) == Some(value.trim_start_matches('='))
            }
            None => labels.contains_key(term),
        })
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn create(
        &self,
        location: &Location,
        resource: &ApiResource,
        mut object: DynamicObject,
    ) -> Result<DynamicObject> {
        let name = object
            .metadata
            .name
            .clone()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| Error::validation_for_field("metadata.name", "name is required"))?;

        let mut state = self.state.lock();
        let key = bucket_key(location, resource);
        if state
            .buckets
            .get(&key)
            .is_some_and(|bucket| bucket.contains_key(&name))
        {
            return Err(Error::already_exists(&resource.kind, name));
        }

        object.metadata.namespace = Some(location.namespace.clone());
        object.metadata.uid = Some(uuid::Uuid::new_v4().to_string());
        object.metadata.creation_timestamp = Some(Time(Utc::now()));
        object.metadata.resource_version = Some(state.next_revision());

        state
            .buckets
            .entry(key)
            .or_default()
            .insert(name, object.clone());
        Ok(object)
    }

    async fn get(
        &self,
        location: &Location,
        resource: &ApiResource,
        name: &str,
    ) -> Result<DynamicObject> {
        let state = self.state.lock();
        state
            .buckets
            .get(&bucket_key(location, resource))
            .and_then(|bucket| bucket.get(name))
            .cloned()
            .ok_or_else(|| Error::not_found(&resource.kind, name))
    }

    async fn list(
        &self,
        location: &Location,
        resource: &ApiResource,
        label_selector: Option<&str>,
    ) -> Result<Vec<DynamicObject>> {
        let state = self.state.lock();
        let Some(bucket) = state.buckets.get(&bucket_key(location, resource)) else {
            return Ok(Vec::new());
        };
        Ok(bucket
            .values()
            .filter(|object| label_selector.is_none_or(|s| matches_selector(object, s)))
            .cloned()
            .collect())
    }

    async fn replace(
        &self,
        location: &Location,
        resource: &ApiResource,
        name: &str,
        mut object: DynamicObject,
    ) -> Result<DynamicObject> {
        let mut state = self.state.lock();
        let key = bucket_key(location, resource);
        let current = state
            .buckets
            .get(&key)
            .and_then(|bucket| bucket.get(name))
            .cloned()
            .ok_or_else(|| Error::not_found(&resource.kind, name))?;

        if let Some(expected) = &object.metadata.resource_version {
            if current.metadata.resource_version.as_ref() != Some(expected) {
                return Err(Error::conflict(&resource.kind, name));
            }
        }

        object.metadata.name = Some(name.to_string());
        object.metadata.namespace = current.metadata.namespace.clone();
        object.metadata.uid = current.metadata.uid.clone();
        object.metadata.creation_timestamp = current.metadata.creation_timestamp.clone();
        object.metadata.resource_version = Some(state.next_revision());

        state
            .buckets
            .entry(key)
            .or_default()
            .insert(name.to_string(), object.clone());
        Ok(object)
    }

    async fn delete(&self, location: &Location, resource: &ApiResource, name: &str) -> Result<()> {
        let mut state = self.state.lock();
        state
            .buckets
            .get_mut(&bucket_key(location, resource))
            .and_then(|bucket| bucket.remove(name))
            .map(|_| ())
            .ok_or_else(|| Error::not_found(&resource.kind, name))
    }
}
