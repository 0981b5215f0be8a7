use std::{
    fs, mem,
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::Utc;
use gambit_brain::Brain;
use gambit_training::{CheckpointError, CheckpointSlot, CheckpointStore, GenerationRecord};

use crate::{
    model::manifest::{GenerationManifest, RunManifest},
    util,
};

const RUN_MANIFEST: &str = "run.json";
const GENERATION_MANIFEST: &str = "manifest.json";

/// Checkpoints laid out in a directory:
///
/// ```text
/// <root>/run.json
/// <root>/gen-00012/manifest.json
/// <root>/gen-00012/elite-00.brain
/// <root>/gen-00012/elite-01.brain
/// ```
#[derive(Debug)]
pub struct DirectoryStore {
    root: PathBuf,
    pending: Vec<String>,
}

impl DirectoryStore {
    pub fn create<P>(root: P) -> anyhow::Result<Self>
    where
        P: Into<PathBuf>,
    {
        let root = root.into();
        fs::create_dir_all(&root).with_context(|| {
            format!("Failed to create checkpoint directory: {}", root.display())
        })?;
        Ok(Self {
            root,
            pending: vec![],
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn generation_dir(&self, generation: u64) -> PathBuf {
        self.root.join(format!("gen-{generation:05}"))
    }

    pub fn brain_file_name(rank: usize) -> String {
        format!("elite-{rank:02}.brain")
    }

    pub fn brain_path(&self, slot: CheckpointSlot) -> PathBuf {
        self.generation_dir(slot.generation)
            .join(Self::brain_file_name(slot.rank))
    }

    pub fn write_run_manifest(&self, manifest: &RunManifest) -> anyhow::Result<()> {
        util::write_json_file("run manifest", self.root.join(RUN_MANIFEST), manifest)
    }

    /// The run manifest, if this directory has one.
    pub fn read_run_manifest(&self) -> anyhow::Result<Option<RunManifest>> {
        let path = self.root.join(RUN_MANIFEST);
        if !path.exists() {
            return Ok(None);
        }
        util::read_json_file("run manifest", path).map(Some)
    }

    pub fn read_generation_manifest(&self, generation: u64) -> anyhow::Result<GenerationManifest> {
        let path = self.generation_dir(generation).join(GENERATION_MANIFEST);
        util::read_json_file("generation manifest", path)
    }

    /// Latest generation whose checkpoint was completed.
    pub fn latest_generation(&self) -> anyhow::Result<Option<u64>> {
        let entries = fs::read_dir(&self.root).with_context(|| {
            format!(
                "Failed to read checkpoint directory: {}",
                self.root.display()
            )
        })?;

        let mut latest = None;
        for entry in entries {
            let entry = entry.with_context(|| {
                format!(
                    "Failed to read checkpoint directory: {}",
                    self.root.display()
                )
            })?;
            let name = entry.file_name();
            let Some(generation) = name
                .to_str()
                .and_then(|name| name.strip_prefix("gen-"))
                .and_then(|digits| digits.parse::<u64>().ok())
            else {
                continue;
            };
            if entry.path().join(GENERATION_MANIFEST).is_file() {
                latest = latest.max(Some(generation));
            }
        }
        Ok(latest)
    }
}

impl CheckpointStore for DirectoryStore {
    fn save(&mut self, slot: CheckpointSlot, brain: &Brain) -> Result<(), CheckpointError> {
        let dir = self.generation_dir(slot.generation);
        fs::create_dir_all(&dir).map_err(|e| {
            CheckpointError::with_source(format!("failed to create {}", dir.display()), e)
        })?;
        brain.save(self.brain_path(slot)).map_err(|e| {
            CheckpointError::with_source(
                format!(
                    "failed to save elite {} of generation {}",
                    slot.rank, slot.generation
                ),
                e,
            )
        })?;
        self.pending.push(Self::brain_file_name(slot.rank));
        Ok(())
    }

    fn load(&mut self, slot: CheckpointSlot) -> Result<Brain, CheckpointError> {
        Brain::load(self.brain_path(slot)).map_err(|e| {
            CheckpointError::with_source(
                format!(
                    "failed to load elite {} of generation {}",
                    slot.rank, slot.generation
                ),
                e,
            )
        })
    }

    fn finish_generation(&mut self, record: &GenerationRecord) -> Result<(), CheckpointError> {
        let manifest = GenerationManifest {
            saved_at: Utc::now(),
            record: record.clone(),
            elites: mem::take(&mut self.pending),
        };
        let path = self
            .generation_dir(record.generation)
            .join(GENERATION_MANIFEST);
        util::write_json_file("generation manifest", path, &manifest).map_err(|e| {
            CheckpointError::with_source(
                format!(
                    "failed to write manifest of generation {}",
                    record.generation
                ),
                e,
            )
        })
    }
}
