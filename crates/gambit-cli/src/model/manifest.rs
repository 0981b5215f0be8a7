use chrono::{DateTime, Utc};
use gambit_training::{GenerationRecord, TrainerConfig};
use serde::{Deserialize, Serialize};

/// `run.json`: how a checkpoint directory was produced.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunManifest {
    pub started_at: DateTime<Utc>,
    pub start_generation: u64,
    pub stop_generation: u64,
    /// Effective configuration, seed included.
    pub config: TrainerConfig,
}

/// `gen-NNNNN/manifest.json`: what was saved for one generation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerationManifest {
    pub saved_at: DateTime<Utc>,
    pub record: GenerationRecord,
    /// Brain file names, best first.
    pub elites: Vec<String>,
}
