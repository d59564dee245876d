use anyhow::Context;
use pagekeeper_core::{CategoryTable, Config, Document, DocumentReference, SourceLock};
use pagekeeper_organizer::ReferenceSynchronizer;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A single entry to upsert into the source document's reference index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceRequest {
    /// Referenced file, project-root-relative (leading `/` optional)
    pub path: String,
    pub title: String,
    /// Category id; classified from the title when absent
    pub category: Option<String>,
    pub critical: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceOutcome {
    pub success: bool,
    pub reference: Option<DocumentReference>,
    pub errors: Vec<String>,
}

/// Upsert one entry in the source document's reference block. Existing
/// entries for the same path are replaced, everything else is preserved.
pub fn create_reference(
    source_path: &Path,
    config: &Config,
    request: &ReferenceRequest,
) -> ReferenceOutcome {
    match run(source_path, config, request) {
        Ok(reference) => ReferenceOutcome {
            success: true,
            reference: Some(reference),
            errors: Vec::new(),
        },
        Err(err) => ReferenceOutcome {
            success: false,
            reference: None,
            errors: vec![format!("{err:#}")],
        },
    }
}

fn run(
    source_path: &Path,
    config: &Config,
    request: &ReferenceRequest,
) -> anyhow::Result<DocumentReference> {
    if request.path.trim().is_empty() || request.title.trim().is_empty() {
        anyhow::bail!("path and title are required");
    }

    let table = CategoryTable::builtin();
    let category = match request.category.as_deref() {
        Some(id) => {
            anyhow::ensure!(table.get(id).is_some(), "unknown category '{id}'");
            id.to_string()
        }
        None => pagekeeper_analyzer::Classifier::new(table.clone())
            .classify(&request.title)
            .to_string(),
    };

    let path = if request.path.starts_with('/') {
        request.path.clone()
    } else {
        format!("/{}", request.path)
    };
    let reference = DocumentReference::new(
        path,
        category.clone(),
        table.emoji_for(&category),
        request.title.clone(),
    )
    .critical(request.critical);

    let _lock = SourceLock::acquire(source_path)?;
    let document = Document::load(source_path)
        .with_context(|| format!("loading {}", source_path.display()))?;
    let synced = ReferenceSynchronizer::new(table, config.organization.use_emojis)
        .upsert_references(&document, std::slice::from_ref(&reference));
    synced.save()?;

    log::info!("Referenced {} in {}", reference.path, source_path.display());
    Ok(reference)
}
