//! In-memory [`BirdStore`] used by the dry-run CLI and by tests.

use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use super::store::BirdStore;
use super::types::NewBird;

/// A bird the store has accepted, with its assigned id.
#[derive(Clone, Debug)]
pub struct CreatedBird {
    pub id: i64,
    pub bird: NewBird,
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    birds: Vec<CreatedBird>,
    bands: Vec<(i64, String)>,
    breeds: Vec<(i64, String)>,
}

/// Sequential-id store that keeps every created record in memory.
///
/// Used to dry-run an import spreadsheet without a database, and as the
/// test double for the reconciler.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    fail_bird_named: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test hook: make `create_bird` fail for one specific bird name.
    pub fn failing_on_bird(name: &str) -> Self {
        Self {
            inner: Mutex::default(),
            fail_bird_named: Some(name.to_string()),
        }
    }

    pub fn birds(&self) -> Vec<CreatedBird> {
        self.inner.lock().unwrap().birds.clone()
    }

    pub fn bands(&self) -> Vec<(i64, String)> {
        self.inner.lock().unwrap().bands.clone()
    }

    pub fn breeds(&self) -> Vec<(i64, String)> {
        self.inner.lock().unwrap().breeds.clone()
    }
}

#[async_trait]
impl BirdStore for MemoryStore {
    async fn create_bird(&self, bird: NewBird) -> Result<i64> {
        if let (Some(fail), Some(name)) = (&self.fail_bird_named, &bird.name) {
            if fail == name {
                return Err(anyhow!("simulated store failure for '{}'", name));
            }
        }
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.birds.push(CreatedBird { id, bird });
        Ok(id)
    }

    async fn create_band_identifier(&self, bird_id: i64, value: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.bands.push((bird_id, value.to_string()));
        Ok(())
    }

    async fn create_breed(&self, name: &str, _code: Option<&str>) -> Result<i64> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.breeds.push((id, name.to_string()));
        Ok(id)
    }
}
