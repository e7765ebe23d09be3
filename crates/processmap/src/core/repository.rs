//! Diagram storage
//!
//! The codec never touches storage; services call a [`DiagramRepository`]
//! with already-decoded diagrams, or a [`ModelRepository`] with models.
//! All operations are synchronous.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::{Diagram, DiagramError, Model};

/// Storage collaborator for whole diagrams
pub trait DiagramRepository {
    /// Insert, or replace the diagram with the same id
    fn save(&mut self, diagram: &Diagram) -> Result<(), DiagramError>;

    /// A missing diagram is `Ok(None)`, not an error
    fn find_by_id(&self, id: &str) -> Result<Option<Diagram>, DiagramError>;

    fn find_all(&self) -> Result<Vec<Diagram>, DiagramError>;

    /// Whether a diagram was removed
    fn delete(&mut self, id: &str) -> Result<bool, DiagramError>;
}

/// Storage collaborator for models, diagrams included
pub trait ModelRepository {
    /// Insert, or replace the model with the same id
    fn save_model(&mut self, model: &Model) -> Result<(), DiagramError>;

    /// A missing model is `Ok(None)`, not an error
    fn find_model(&self, id: &str) -> Result<Option<Model>, DiagramError>;

    fn find_all_models(&self) -> Result<Vec<Model>, DiagramError>;

    /// Whether a model was removed
    fn delete_model(&mut self, id: &str) -> Result<bool, DiagramError>;
}

/// Repository kept in memory, in order of first save
#[derive(Debug, Default, Clone)]
pub struct InMemoryRepository {
    diagrams: Vec<Diagram>,
    models: Vec<Model>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.diagrams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagrams.is_empty()
    }
}

impl DiagramRepository for InMemoryRepository {
    fn save(&mut self, diagram: &Diagram) -> Result<(), DiagramError> {
        match self.diagrams.iter_mut().find(|d| d.id == diagram.id) {
            Some(existing) => *existing = diagram.clone(),
            None => self.diagrams.push(diagram.clone()),
        }
        Ok(())
    }

    fn find_by_id(&self, id: &str) -> Result<Option<Diagram>, DiagramError> {
        Ok(self.diagrams.iter().find(|d| d.id == id).cloned())
    }

    fn find_all(&self) -> Result<Vec<Diagram>, DiagramError> {
        Ok(self.diagrams.clone())
    }

    fn delete(&mut self, id: &str) -> Result<bool, DiagramError> {
        let before = self.diagrams.len();
        self.diagrams.retain(|d| d.id != id);
        Ok(self.diagrams.len() != before)
    }
}

impl ModelRepository for InMemoryRepository {
    fn save_model(&mut self, model: &Model) -> Result<(), DiagramError> {
        match self.models.iter_mut().find(|m| m.id == model.id) {
            Some(existing) => *existing = model.clone(),
            None => self.models.push(model.clone()),
        }
        Ok(())
    }

    fn find_model(&self, id: &str) -> Result<Option<Model>, DiagramError> {
        Ok(self.models.iter().find(|m| m.id == id).cloned())
    }

    fn find_all_models(&self) -> Result<Vec<Model>, DiagramError> {
        Ok(self.models.clone())
    }

    fn delete_model(&mut self, id: &str) -> Result<bool, DiagramError> {
        let before = self.models.len();
        self.models.retain(|m| m.id != id);
        Ok(self.models.len() != before)
    }
}

/// Repository storing one `<id>.json` file per diagram in a directory
///
/// Models live in a `models/` subdirectory with the same layout. Ids are
/// percent-encoded into the file stem (see [`file_stem`]), so two ids never
/// share a file. A file whose content belongs to another id is treated as
/// absent and is never overwritten.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    root: PathBuf,
}

impl JsonFileRepository {
    /// Open a store, creating the directory if needed
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, DiagramError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn models_dir(&self) -> PathBuf {
        self.root.join(MODELS_DIR)
    }
}

const MODELS_DIR: &str = "models";

/// Safe, collision-free file stem for an id
///
/// `[A-Za-z0-9_-]` is kept; every other byte becomes `%XX`. The empty id
/// maps to `%`, which no other id produces.
pub fn file_stem(id: &str) -> String {
    if id.is_empty() {
        return "%".to_string();
    }
    let mut stem = String::with_capacity(id.len());
    for byte in id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            stem.push(byte as char);
        } else {
            stem.push_str(&format!("%{:02X}", byte));
        }
    }
    stem
}

/// What the file store needs from a stored entity
trait Record: Sized {
    const KIND: &'static str;

    fn id(&self) -> &str;
    fn created_at(&self) -> DateTime<Utc>;
    fn to_json(&self) -> Result<String, DiagramError>;
    fn from_json(json: &str) -> Result<Self, DiagramError>;
}

impl Record for Diagram {
    const KIND: &'static str = "diagram";

    fn id(&self) -> &str {
        &self.id
    }
    fn created_at(&self) -> DateTime<Utc> {
        Diagram::created_at(self)
    }
    fn to_json(&self) -> Result<String, DiagramError> {
        Diagram::to_json(self)
    }
    fn from_json(json: &str) -> Result<Self, DiagramError> {
        Diagram::from_json(json)
    }
}

impl Record for Model {
    const KIND: &'static str = "model";

    fn id(&self) -> &str {
        &self.id
    }
    fn created_at(&self) -> DateTime<Utc> {
        Model::created_at(self)
    }
    fn to_json(&self) -> Result<String, DiagramError> {
        Model::to_json(self)
    }
    fn from_json(json: &str) -> Result<Self, DiagramError> {
        Model::from_json(json)
    }
}

fn record_path(dir: &Path, id: &str) -> PathBuf {
    dir.join(format!("{}.json", file_stem(id)))
}

fn read_record<T: Record>(path: &Path) -> Result<T, DiagramError> {
    let json = fs::read_to_string(path)?;
    T::from_json(&json)
}

fn write_record<T: Record>(dir: &Path, record: &T) -> Result<(), DiagramError> {
    fs::create_dir_all(dir)?;
    let path = record_path(dir, record.id());
    if path.exists() {
        if let Ok(stored) = read_record::<T>(&path) {
            if stored.id() != record.id() {
                return Err(DiagramError::invalid_argument(format!(
                    "{} already holds {} {}",
                    path.display(),
                    T::KIND,
                    stored.id()
                )));
            }
        }
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, record.to_json()?)?;
    fs::rename(&tmp, &path)?;
    debug!(kind = T::KIND, id = record.id(), path = %path.display(), "Saved record");
    Ok(())
}

fn find_record<T: Record>(dir: &Path, id: &str) -> Result<Option<T>, DiagramError> {
    let path = record_path(dir, id);
    if !path.exists() {
        return Ok(None);
    }
    let record: T = read_record(&path)?;
    if record.id() != id {
        warn!(kind = T::KIND, requested = id, stored = record.id(), "Stored id does not match file");
        return Ok(None);
    }
    Ok(Some(record))
}

/// Every readable record in `dir`, oldest first; a missing directory is empty
fn list_records<T: Record>(dir: &Path) -> Result<Vec<T>, DiagramError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut records: Vec<T> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        match read_record(&path) {
            Ok(record) => records.push(record),
            Err(e) => warn!(kind = T::KIND, path = %path.display(), error = %e, "Skipping unreadable file"),
        }
    }
    records.sort_by(|a, b| {
        a.created_at()
            .cmp(&b.created_at())
            .then_with(|| a.id().cmp(b.id()))
    });
    Ok(records)
}

fn remove_record<T: Record>(dir: &Path, id: &str) -> Result<bool, DiagramError> {
    if find_record::<T>(dir, id)?.is_none() {
        return Ok(false);
    }
    fs::remove_file(record_path(dir, id))?;
    debug!(kind = T::KIND, id, "Deleted record");
    Ok(true)
}

impl DiagramRepository for JsonFileRepository {
    fn save(&mut self, diagram: &Diagram) -> Result<(), DiagramError> {
        write_record(&self.root, diagram)
    }

    fn find_by_id(&self, id: &str) -> Result<Option<Diagram>, DiagramError> {
        find_record(&self.root, id)
    }

    /// All stored diagrams, oldest first
    fn find_all(&self) -> Result<Vec<Diagram>, DiagramError> {
        list_records(&self.root)
    }

    fn delete(&mut self, id: &str) -> Result<bool, DiagramError> {
        remove_record::<Diagram>(&self.root, id)
    }
}

impl ModelRepository for JsonFileRepository {
    fn save_model(&mut self, model: &Model) -> Result<(), DiagramError> {
        write_record(&self.models_dir(), model)
    }

    fn find_model(&self, id: &str) -> Result<Option<Model>, DiagramError> {
        find_record(&self.models_dir(), id)
    }

    /// All stored models, oldest first
    fn find_all_models(&self) -> Result<Vec<Model>, DiagramError> {
        list_records(&self.models_dir())
    }

    fn delete_model(&mut self, id: &str) -> Result<bool, DiagramError> {
        remove_record::<Model>(&self.models_dir(), id)
    }
}
