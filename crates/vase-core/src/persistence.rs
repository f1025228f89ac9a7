//! Persistence boundary.
//!
//! Storage lives outside the scene; the scene reports destroy counts and
//! appearance changes through a [`PersistenceSink`] and never waits on it.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use crate::vase::{VaseAppearance, VaseId};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Receiver of scene state worth keeping across sessions.
pub trait PersistenceSink: Send + Sync {
    fn record_destroy(&mut self, vase: &VaseId, count: u32) -> Result<(), PersistenceError>;

    fn save_appearance(
        &mut self,
        vase: &VaseId,
        appearance: &VaseAppearance,
    ) -> Result<(), PersistenceError>;
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl PersistenceSink for NullSink {
    fn record_destroy(&mut self, _vase: &VaseId, _count: u32) -> Result<(), PersistenceError> {
        Ok(())
    }

    fn save_appearance(
        &mut self,
        _vase: &VaseId,
        _appearance: &VaseAppearance,
    ) -> Result<(), PersistenceError> {
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryStore {
    destroy_counts: HashMap<VaseId, u32>,
    /// Appearances as stored JSON.
    appearances: HashMap<VaseId, String>,
    destroy_writes: usize,
    appearance_writes: usize,
    failing: bool,
}

/// In-memory sink. Clones share the same store, so a handle kept outside
/// the scene can inspect what was written.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    store: Arc<Mutex<MemoryStore>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail until turned off again.
    pub fn set_failing(&self, failing: bool) {
        self.store.lock().failing = failing;
    }

    pub fn destroy_count(&self, vase: &VaseId) -> Option<u32> {
        self.store.lock().destroy_counts.get(vase).copied()
    }

    pub fn appearance(&self, vase: &VaseId) -> Option<VaseAppearance> {
        let store = self.store.lock();
        let json = store.appearances.get(vase)?;
        serde_json::from_str(json).ok()
    }

    /// Number of successful destroy writes.
    pub fn destroy_writes(&self) -> usize {
        self.store.lock().destroy_writes
    }

    /// Number of successful appearance writes.
    pub fn appearance_writes(&self) -> usize {
        self.store.lock().appearance_writes
    }
}

impl PersistenceSink for MemorySink {
    fn record_destroy(&mut self, vase: &VaseId, count: u32) -> Result<(), PersistenceError> {
        let mut store = self.store.lock();
        if store.failing {
            return Err(PersistenceError::Unavailable("memory sink offline".to_string()));
        }
        store.destroy_counts.insert(vase.clone(), count);
        store.destroy_writes += 1;
        Ok(())
    }

    fn save_appearance(
        &mut self,
        vase: &VaseId,
        appearance: &VaseAppearance,
    ) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(appearance)?;
        let mut store = self.store.lock();
        if store.failing {
            return Err(PersistenceError::Unavailable("memory sink offline".to_string()));
        }
        store.appearances.insert(vase.clone(), json);
        store.appearance_writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vase::Color;

    #[test]
    fn test_memory_sink_shared_between_clones() {
        let sink = MemorySink::new();
        let mut writer: Box<dyn PersistenceSink> = Box::new(sink.clone());
        let id = VaseId::from("vase-2");

        writer.record_destroy(&id, 3).unwrap();
        writer
            .save_appearance(&id, &VaseAppearance::plain(Color::COBALT))
            .unwrap();

        assert_eq!(sink.destroy_count(&id), Some(3));
        assert_eq!(sink.appearance(&id).unwrap().base_color, Color::COBALT);
        assert_eq!(sink.destroy_writes(), 1);
        assert_eq!(sink.appearance_writes(), 1);
    }

    #[test]
    fn test_failing_sink_reports_error() {
        let sink = MemorySink::new();
        sink.set_failing(true);
        let mut writer = sink.clone();

        let result = writer.record_destroy(&VaseId::from("vase-0"), 1);
        assert!(matches!(result, Err(PersistenceError::Unavailable(_))));
        assert_eq!(sink.destroy_writes(), 0);
        assert!(sink.destroy_count(&VaseId::from("vase-0")).is_none());
    }
}
