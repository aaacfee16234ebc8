// On-disk layout:
//   manifest.json           store version, config, model entries
//   aliases.json            alias table entries
//   models/<hash12>.json    one serialized model artifact each
//
// Directories are written once, to a temp sibling, then renamed into place.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::info;

use crate::config::Config;
use crate::model::{load_disambiguator, DisambiguationModel, ModelError};
use crate::registry::alias::{AliasError, AliasTable};
use crate::types::identifiers::{ContentVersion, Shortform};

const MANIFEST_FILE: &str = "manifest.json";
const ALIASES_FILE: &str = "aliases.json";
const MODELS_DIR: &str = "models";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Model error: {0}")]
    Model(#[from] ModelError),
    #[error("Alias table error: {0}")]
    Alias(#[from] AliasError),
    #[error("Output directory already exists: {0}")]
    OutputExists(PathBuf),
    #[error("Duplicate model for shortform: {0}")]
    DuplicateModel(Shortform),
    #[error("Model for {0} is not a canonical key of the alias table")]
    UnroutedModel(Shortform),
    #[error("Filename collision detected for hash fragment: {0}")]
    FilenameCollision(String),
    #[error("Model file {file} does not match manifest entry for {shortform}")]
    ManifestMismatch { shortform: Shortform, file: String },
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ManifestModelEntry {
    pub shortform: Shortform,
    pub version: ContentVersion,
    pub file: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StoreManifest {
    pub store_version: String,
    pub build_config: Config,
    pub created_at: DateTime<Utc>, // informational only
    pub model_count: usize,
    pub models: Vec<ManifestModelEntry>,
}

/// Writes a directory of trained models. Single-threaded and non-reentrant.
pub struct ModelStoreBuilder {
    config: Config,
}

impl ModelStoreBuilder {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn build(
        &self,
        models: Vec<DisambiguationModel>,
        aliases: &AliasTable,
        output_dir: &Path,
    ) -> Result<ModelStore, StoreError> {
        if output_dir.exists() {
            return Err(StoreError::OutputExists(output_dir.to_path_buf()));
        }

        let mut models = models;
        models.sort_by(|a, b| a.shortform().cmp(b.shortform()));
        for pair in models.windows(2) {
            if pair[0].shortform() == pair[1].shortform() {
                return Err(StoreError::DuplicateModel(pair[0].shortform().clone()));
            }
        }

        let canonical = aliases.canonical_keys();
        let mut hasher = Sha256::new();
        hasher.update(serde_json::to_vec(&self.config)?);
        hasher.update(serde_json::to_vec(aliases)?);

        let mut entries = Vec::with_capacity(models.len());
        let mut payloads = Vec::with_capacity(models.len());
        let mut seen_files = BTreeSet::new();
        for model in &models {
            if !canonical.contains(model.shortform()) {
                return Err(StoreError::UnroutedModel(model.shortform().clone()));
            }
            let version = model.version()?;
            hasher.update(format!("{}:{}", model.shortform(), version.as_str()).as_bytes());

            let stem = version.short().to_string();
            if !seen_files.insert(stem.clone()) {
                return Err(StoreError::FilenameCollision(stem));
            }
            let file = format!("{MODELS_DIR}/{stem}.json");
            payloads.push((file.clone(), model.to_bytes()?));
            entries.push(ManifestModelEntry {
                shortform: model.shortform().clone(),
                version,
                file,
            });
        }
        let store_version = format!("sha256:{}", hex::encode(hasher.finalize()));

        let manifest = StoreManifest {
            store_version: store_version.clone(),
            build_config: self.config.clone(),
            created_at: Utc::now(),
            model_count: entries.len(),
            models: entries,
        };

        let temp_dir = output_dir.with_extension(format!("tmp.{}", &store_version[7..19]));
        if temp_dir.exists() {
            fs::remove_dir_all(&temp_dir)?;
        }
        fs::create_dir_all(temp_dir.join(MODELS_DIR))?;

        for (file, bytes) in &payloads {
            fs::write(temp_dir.join(file), bytes)?;
        }
        let f_alias = fs::File::create(temp_dir.join(ALIASES_FILE))?;
        serde_json::to_writer_pretty(&f_alias, aliases)?;
        f_alias.sync_all()?;

        let f_man = fs::File::create(temp_dir.join(MANIFEST_FILE))?;
        serde_json::to_writer_pretty(&f_man, &manifest)?;
        f_man.sync_all()?;

        fs::rename(&temp_dir, output_dir)?;
        info!(
            path = %output_dir.display(),
            models = manifest.model_count,
            version = manifest.store_version.as_str(),
            "model store built"
        );

        Ok(ModelStore {
            root: output_dir.to_path_buf(),
            manifest,
        })
    }
}

/// Read-only handle on a built model directory.
#[derive(Debug)]
pub struct ModelStore {
    pub root: PathBuf,
    pub manifest: StoreManifest,
}

impl ModelStore {
    pub fn open(root: &Path) -> Result<Self, StoreError> {
        let f = fs::File::open(root.join(MANIFEST_FILE))?;
        let manifest: StoreManifest = serde_json::from_reader(f)?;
        Ok(ModelStore {
            root: root.to_path_buf(),
            manifest,
        })
    }

    /// The alias table, validated on read.
    pub fn load_aliases(&self) -> Result<AliasTable, StoreError> {
        Ok(AliasTable::from_path(&self.root.join(ALIASES_FILE))?)
    }

    pub fn load_models(&self) -> Result<Vec<DisambiguationModel>, StoreError> {
        self.manifest
            .models
            .iter()
            .map(|entry| self.load_entry(entry))
            .collect()
    }

    pub fn load_model(&self, shortform: &str) -> Result<Option<DisambiguationModel>, StoreError> {
        self.manifest
            .models
            .iter()
            .find(|entry| entry.shortform.as_str() == shortform)
            .map(|entry| self.load_entry(entry))
            .transpose()
    }

    fn load_entry(&self, entry: &ManifestModelEntry) -> Result<DisambiguationModel, StoreError> {
        let bytes = fs::read(self.root.join(&entry.file))?;
        let model = load_disambiguator(&bytes)?;
        if model.shortform() != &entry.shortform || model.version()? != entry.version {
            return Err(StoreError::ManifestMismatch {
                shortform: entry.shortform.clone(),
                file: entry.file.clone(),
            });
        }
        Ok(model)
    }
}
