//! Matching a picked set of files against the `{skeleton, atlas, page}` naming convention and
//! copying the accepted files into viewer storage.

use crate::error::{Error, Result};
use crate::selection::{
    JSON_SUFFIX, PersistedSelection, SKEL_SUFFIX, atlas_basename, atlas_name, is_image_name,
    page_name,
};
use crate::storage::Storage;
use std::path::{Path, PathBuf};

/// Fewer picked files than this is not treated as a skeleton import.
pub const MIN_CANDIDATES: usize = 3;
/// A selection of exactly this many images replaces only the background.
pub const BACKGROUND_ONLY_CANDIDATES: usize = 1;

/// A picked file: its display name and a way to fetch its bytes.
pub trait CandidateFile {
    fn name(&self) -> &str;

    fn read_bytes(&self) -> std::io::Result<Vec<u8>>;
}

/// A candidate living on the local file system.
#[derive(Clone, Debug)]
pub struct PathCandidate {
    name: String,
    path: PathBuf,
}

impl PathCandidate {
    /// Returns `None` when the path has no UTF-8 file name.
    pub fn new(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let name = path.file_name()?.to_str()?.to_string();
        Some(Self { name, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CandidateFile for PathCandidate {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_bytes(&self) -> std::io::Result<Vec<u8>> {
        std::fs::read(&self.path)
    }
}

/// A candidate whose bytes are already in memory.
#[derive(Clone, Debug)]
pub struct MemoryCandidate {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl MemoryCandidate {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

impl CandidateFile for MemoryCandidate {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_bytes(&self) -> std::io::Result<Vec<u8>> {
        Ok(self.bytes.clone())
    }
}

/// The skeleton part of an import: entry, atlas and page sharing one basename.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TripletPlan {
    pub basename: String,
    pub entry: String,
    pub atlas: String,
    pub page: String,
}

/// The files an import will persist, by role.
///
/// `triplet` is `None` for a background-only import.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportPlan {
    pub triplet: Option<TripletPlan>,
    pub background: Option<String>,
}

impl ImportPlan {
    /// Entry, atlas, page and (if any) background, in write order.
    pub fn files(&self) -> Vec<&str> {
        let mut files = Vec::with_capacity(4);
        if let Some(triplet) = self.triplet.as_ref() {
            files.extend([
                triplet.entry.as_str(),
                triplet.atlas.as_str(),
                triplet.page.as_str(),
            ]);
        }
        if let Some(background) = self.background.as_deref() {
            files.push(background);
        }
        files
    }

    pub fn entry(&self) -> Option<&str> {
        self.triplet.as_ref().map(|t| t.entry.as_str())
    }
}

/// Decides which of the picked names form a valid import.
///
/// Three or more names must contain a complete triplet, optionally with a background. A
/// single picked image is a background-only import. Anything else is ignored rather than
/// reported.
pub fn resolve<N: AsRef<str>>(names: &[N]) -> Option<ImportPlan> {
    if names.len() == BACKGROUND_ONLY_CANDIDATES {
        let name = names[0].as_ref();
        return is_image_name(name).then(|| ImportPlan {
            triplet: None,
            background: Some(name.to_string()),
        });
    }
    if names.len() < MIN_CANDIDATES {
        return None;
    }
    let has = |wanted: &str| names.iter().any(|n| n.as_ref() == wanted);

    let basename = names.iter().find_map(|n| atlas_basename(n.as_ref()))?;
    let page = page_name(basename);
    if !has(&page) {
        return None;
    }

    let json = format!("{basename}{JSON_SUFFIX}");
    let skel = format!("{basename}{SKEL_SUFFIX}");
    let entry = if has(&json) {
        json
    } else if has(&skel) {
        skel
    } else {
        return None;
    };

    let background = names
        .iter()
        .map(AsRef::as_ref)
        .find(|n| *n != page && is_image_name(n))
        .map(str::to_string);

    Some(ImportPlan {
        triplet: Some(TripletPlan {
            basename: basename.to_string(),
            entry,
            atlas: atlas_name(basename),
            page,
        }),
        background,
    })
}

/// Result of an import that passed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportOutcome {
    pub plan: ImportPlan,
    pub removed: Vec<String>,
}

/// Owns the viewer storage and the selection pointers describing it.
pub struct Importer<S> {
    storage: S,
    selection: PersistedSelection,
}

impl<S: Storage> Importer<S> {
    /// Wraps `storage`, recovering the current selection from its contents.
    pub fn new(storage: S) -> Result<Self> {
        let selection = PersistedSelection::recover(&storage)?;
        Ok(Self { storage, selection })
    }

    pub fn with_selection(storage: S, selection: PersistedSelection) -> Self {
        Self { storage, selection }
    }

    pub fn selection(&self) -> &PersistedSelection {
        &self.selection
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Validates `candidates` and, if they form an import, replaces the stored files.
    ///
    /// `Ok(None)` means the selection was not a valid import and nothing was touched. All
    /// selected candidates are read before storage is modified, so an unreadable candidate
    /// leaves the previous files intact.
    pub fn import<C: CandidateFile>(&mut self, candidates: &[C]) -> Result<Option<ImportOutcome>> {
        let names = candidates.iter().map(|c| c.name()).collect::<Vec<_>>();
        let Some(plan) = resolve(&names) else {
            log::debug!("ignoring selection that is not a skeleton import: {names:?}");
            return Ok(None);
        };

        let stored_triplet = self.selection.triplet_files();
        if plan.triplet.is_none()
            && plan
                .background
                .as_ref()
                .is_some_and(|bg| stored_triplet.contains(bg))
        {
            log::debug!("ignoring background named like a stored skeleton file: {names:?}");
            return Ok(None);
        }

        let payloads = read_payloads(candidates, &plan)?;

        let removed = match plan.triplet {
            Some(_) => self.clear_for_triplet(&plan)?,
            None => self.clear_background()?,
        };

        for (name, bytes) in &payloads {
            self.storage.write(name, bytes)?;
        }

        if let Some(entry) = plan.entry() {
            self.selection.entry = Some(entry.to_string());
        }
        if plan.background.is_some() {
            self.selection.background = plan.background.clone();
        } else if removed.iter().any(|r| Some(r) == self.selection.background.as_ref()) {
            self.selection.background = None;
        }

        log::info!(
            "imported {:?} (background: {:?})",
            plan.entry(),
            self.selection.background
        );
        Ok(Some(ImportOutcome { plan, removed }))
    }

    /// Deletes everything except the current background, which survives only when no new
    /// one is supplied and it does not clash with the new triplet.
    fn clear_for_triplet(&mut self, plan: &ImportPlan) -> Result<Vec<String>> {
        let keep = match plan.background {
            Some(_) => None,
            None => self
                .selection
                .background
                .clone()
                .filter(|bg| !plan.files().contains(&bg.as_str())),
        };

        let mut removed = Vec::new();
        for name in self.storage.list()? {
            if keep.as_deref() == Some(name.as_str()) {
                continue;
            }
            self.storage.remove(&name)?;
            removed.push(name);
        }
        Ok(removed)
    }

    /// Deletes only the current background; the stored triplet is left alone.
    fn clear_background(&mut self) -> Result<Vec<String>> {
        let Some(background) = self.selection.background.clone() else {
            return Ok(Vec::new());
        };
        if !self.storage.contains(&background) {
            return Ok(Vec::new());
        }
        self.storage.remove(&background)?;
        Ok(vec![background])
    }
}

fn read_payloads<C: CandidateFile>(
    candidates: &[C],
    plan: &ImportPlan,
) -> Result<Vec<(String, Vec<u8>)>> {
    let mut payloads = Vec::with_capacity(4);
    for name in plan.files() {
        let Some(candidate) = candidates.iter().find(|c| c.name() == name) else {
            continue;
        };
        let bytes = candidate
            .read_bytes()
            .map_err(|source| Error::CandidateRead {
                name: name.to_string(),
                source,
            })?;
        payloads.push((name.to_string(), bytes));
    }
    Ok(payloads)
}
