//! Persistence sink that writes records to the log.

use vase_core::persistence::{PersistenceError, PersistenceSink};
use vase_core::vase::{VaseAppearance, VaseId};

#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingSink;

impl PersistenceSink for LoggingSink {
    fn record_destroy(&mut self, vase: &VaseId, count: u32) -> Result<(), PersistenceError> {
        tracing::info!("[sink] {} destroyed {} time(s)", vase, count);
        Ok(())
    }

    fn save_appearance(
        &mut self,
        vase: &VaseId,
        appearance: &VaseAppearance,
    ) -> Result<(), PersistenceError> {
        let encoded = serde_json::to_string(appearance)?;
        tracing::info!("[sink] {} appearance {}", vase, encoded);
        Ok(())
    }
}
