//! Model loader
//!
//! Reads model declarations from a directory of `*.json` files, one model
//! per file, and compiles them into a registry keyed by model name.
//! - Compound references resolve by name, regardless of file order
//! - Unknown references and reference cycles are rejected
//! - A missing directory loads nothing
//! - Registered models are immutable: a second model with the same name
//!   is rejected

mod decl;

pub use decl::{EnumMemberDecl, FactoryName, FieldDecl, FieldSpecDecl, KindDecl, ModelDecl};

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::errors::{ModelError, ModelResult};
use crate::model::Model;
use crate::observability::{log_event_with_fields, Event};

/// Loads declarations from disk and holds the compiled models.
#[derive(Debug)]
pub struct ModelLoader {
    /// Directory containing declaration files
    model_dir: PathBuf,
    /// Compiled models by name
    models: BTreeMap<String, Arc<Model>>,
}

impl ModelLoader {
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            models: BTreeMap::new(),
        }
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    /// Loads and compiles every declaration file in the directory.
    ///
    /// Returns the number of models loaded. Nothing is registered unless
    /// every file loads.
    pub fn load_all(&mut self) -> ModelResult<usize> {
        if !self.model_dir.exists() {
            return Ok(0);
        }

        let entries = fs::read_dir(&self.model_dir).map_err(|e| {
            ModelError::invalid_declaration(
                self.model_dir.display().to_string(),
                format!("Failed to read model directory: {}", e),
            )
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                ModelError::invalid_declaration(
                    self.model_dir.display().to_string(),
                    format!("Failed to read directory entry: {}", e),
                )
            })?;
            let path = entry.path();

            // Skip non-JSON files
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            paths.push(path);
        }
        paths.sort();

        let mut decls = Vec::with_capacity(paths.len());
        for path in &paths {
            decls.push(read_declaration(path)?);
        }

        let count = self.register_all(decls)?;
        log_event_with_fields(
            Event::ModelsLoaded,
            &[
                ("count", count.to_string().as_str()),
                ("model_dir", self.model_dir.display().to_string().as_str()),
            ],
        );
        Ok(count)
    }

    /// Compiles a batch of declarations that may refer to each other and
    /// to models already registered.
    pub fn register_all(&mut self, decls: Vec<ModelDecl>) -> ModelResult<usize> {
        let mut pending: BTreeMap<String, ModelDecl> = BTreeMap::new();
        for decl in decls {
            if self.models.contains_key(&decl.name) || pending.contains_key(&decl.name) {
                return Err(ModelError::invalid_declaration(
                    &decl.name,
                    "model declared twice",
                ));
            }
            pending.insert(decl.name.clone(), decl);
        }

        // Compile into a scratch registry so a failure registers nothing
        let mut compiled = self.models.clone();
        let total = pending.len();
        while !pending.is_empty() {
            let ready: Vec<String> = pending
                .values()
                .filter(|decl| {
                    decl.references()
                        .iter()
                        .all(|name| compiled.contains_key(*name))
                })
                .map(|decl| decl.name.clone())
                .collect();

            if ready.is_empty() {
                return Err(unresolved(&pending, &compiled));
            }

            for name in ready {
                if let Some(decl) = pending.remove(&name) {
                    let model = decl.compile(&compiled)?;
                    compiled.insert(name, model);
                }
            }
        }

        self.models = compiled;
        Ok(total)
    }

    /// Registers an already compiled model.
    pub fn register(&mut self, model: Arc<Model>) -> ModelResult<()> {
        if self.models.contains_key(model.name()) {
            return Err(ModelError::invalid_declaration(
                model.name(),
                "model declared twice",
            ));
        }
        self.models.insert(model.name().to_string(), model);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Model>> {
        self.models.get(name)
    }

    /// Model names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

fn read_declaration(path: &Path) -> ModelResult<ModelDecl> {
    let parsed = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read file: {}", e))
        .and_then(|content| {
            serde_json::from_str::<ModelDecl>(&content).map_err(|e| format!("Invalid JSON: {}", e))
        });

    parsed.map_err(|reason| {
        let file = path.display().to_string();
        log_event_with_fields(
            Event::ModelFileRejected,
            &[("path", file.as_str()), ("reason", reason.as_str())],
        );
        ModelError::invalid_declaration(file, reason)
    })
}

/// Explains why no pending declaration can be compiled.
fn unresolved(
    pending: &BTreeMap<String, ModelDecl>,
    compiled: &BTreeMap<String, Arc<Model>>,
) -> ModelError {
    for decl in pending.values() {
        for reference in decl.references() {
            if !compiled.contains_key(reference) && !pending.contains_key(reference) {
                return ModelError::invalid_declaration(
                    &decl.name,
                    format!("unknown model '{}'", reference),
                );
            }
        }
    }
    let names: Vec<&str> = pending.keys().map(String::as_str).collect();
    ModelError::invalid_declaration(
        names.join(", "),
        "compound references form a cycle",
    )
}
