use serde::{Deserialize, Serialize};

/// Batch summary uploaded as the final object of every event, under
/// `<prefix>manifest.json`.
///
/// `received` counts upload attempts *initiated*, not confirmed successes:
/// the counter is fully advanced before any upload resolves, so a manifest in
/// the store always reads `received == expected` regardless of how many
/// uploads actually landed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub expected: u64,
    pub received: u64,
    pub description: String,
    pub path: String,
}

impl Manifest {
    /// `expected` includes the manifest object itself, hence the `+ 1`.
    pub fn new(file_count: u64, description: &str, path: &str) -> Self {
        Self {
            expected: file_count + 1,
            received: 0,
            description: description.to_owned(),
            path: path.to_owned(),
        }
    }

    pub fn record_attempt(&mut self) {
        self.received += 1;
    }

    pub fn to_json_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }
}
