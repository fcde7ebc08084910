//! Agent ID generation.

use anyhow::Result;

use crate::application::ports::IdGenerator;

/// Random (v4) UUIDs.
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> Result<String> {
        Ok(uuid::Uuid::new_v4().to_string())
    }
}
