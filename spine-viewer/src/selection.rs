use crate::error::Result;
use crate::storage::Storage;

pub const ATLAS_SUFFIX: &str = ".atlas";
pub const PAGE_SUFFIX: &str = ".png";
pub const JSON_SUFFIX: &str = ".json";
pub const SKEL_SUFFIX: &str = ".skel";
pub const IMAGE_SUFFIXES: [&str; 3] = [".jpg", ".jpeg", ".png"];

/// Returns the basename of an atlas file name, or `None` when the name is not an atlas or
/// the basename would be empty.
pub fn atlas_basename(name: &str) -> Option<&str> {
    name.strip_suffix(ATLAS_SUFFIX).filter(|base| !base.is_empty())
}

/// Returns the basename of a skeleton entry file (`.json` or `.skel`).
pub fn entry_basename(name: &str) -> Option<&str> {
    name.strip_suffix(JSON_SUFFIX)
        .or_else(|| name.strip_suffix(SKEL_SUFFIX))
        .filter(|base| !base.is_empty())
}

pub fn is_binary_entry(name: &str) -> bool {
    name.ends_with(SKEL_SUFFIX)
}

pub fn is_image_name(name: &str) -> bool {
    IMAGE_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

pub fn atlas_name(basename: &str) -> String {
    format!("{basename}{ATLAS_SUFFIX}")
}

pub fn page_name(basename: &str) -> String {
    format!("{basename}{PAGE_SUFFIX}")
}

/// What the storage directory currently holds, by role.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PersistedSelection {
    pub entry: Option<String>,
    pub background: Option<String>,
}

impl PersistedSelection {
    /// Rebuilds the selection from the files present in `storage`.
    ///
    /// An atlas with a matching page image and entry file identifies the triplet; the first
    /// remaining image is the background.
    pub fn recover(storage: &dyn Storage) -> Result<Self> {
        let names = storage.list()?;
        let has = |name: &str| names.iter().any(|n| n == name);

        let mut entry = None;
        let mut triplet_page = None;
        for basename in names.iter().filter_map(|n| atlas_basename(n)) {
            let page = page_name(basename);
            if !has(&page) {
                continue;
            }
            let json = format!("{basename}{JSON_SUFFIX}");
            let skel = format!("{basename}{SKEL_SUFFIX}");
            let found = if has(&json) {
                Some(json)
            } else if has(&skel) {
                Some(skel)
            } else {
                None
            };
            if found.is_some() {
                entry = found;
                triplet_page = Some(page);
                break;
            }
        }

        let background = names
            .iter()
            .filter(|n| Some(n.as_str()) != triplet_page.as_deref())
            .find(|n| is_image_name(n))
            .cloned();

        Ok(Self { entry, background })
    }

    /// The entry file name, or `""` when nothing is stored.
    pub fn current_file(&self) -> &str {
        self.entry.as_deref().unwrap_or("")
    }

    pub fn basename(&self) -> Option<&str> {
        self.entry.as_deref().and_then(entry_basename)
    }

    /// The three triplet file names for the current entry.
    pub fn triplet_files(&self) -> Vec<String> {
        match (self.entry.as_deref(), self.basename()) {
            (Some(entry), Some(base)) => vec![entry.to_string(), atlas_name(base), page_name(base)],
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::DirStorage;
    use tempfile::tempdir;

    #[test]
    fn naming_helpers() {
        assert_eq!(atlas_basename("hero.atlas"), Some("hero"));
        assert_eq!(atlas_basename(".atlas"), None);
        assert_eq!(atlas_basename("hero.png"), None);
        assert_eq!(entry_basename("hero.skel"), Some("hero"));
        assert_eq!(entry_basename("hero.json"), Some("hero"));
        assert_eq!(entry_basename(".json"), None);
        assert!(is_binary_entry("hero.skel"));
        assert!(!is_binary_entry("hero.json"));
        assert!(is_image_name("bg.jpeg"));
        assert!(!is_image_name("bg.gif"));
    }

    #[test]
    fn recover_finds_triplet_and_background() {
        let dir = tempdir().unwrap();
        let mut storage = DirStorage::open(dir.path()).unwrap();
        for name in ["hero.atlas", "hero.png", "hero.skel", "sky.jpg"] {
            storage.write(name, name.as_bytes()).unwrap();
        }

        let selection = PersistedSelection::recover(&storage).unwrap();
        assert_eq!(selection.entry.as_deref(), Some("hero.skel"));
        assert_eq!(selection.background.as_deref(), Some("sky.jpg"));
        assert_eq!(
            selection.triplet_files(),
            vec!["hero.skel", "hero.atlas", "hero.png"]
        );
    }

    #[test]
    fn recover_prefers_json_and_treats_orphan_png_as_background() {
        let dir = tempdir().unwrap();
        let mut storage = DirStorage::open(dir.path()).unwrap();
        for name in ["hero.atlas", "hero.png", "hero.json", "hero.skel", "wall.png"] {
            storage.write(name, b"x").unwrap();
        }

        let selection = PersistedSelection::recover(&storage).unwrap();
        assert_eq!(selection.current_file(), "hero.json");
        assert_eq!(selection.background.as_deref(), Some("wall.png"));
    }

    #[test]
    fn recover_empty_storage() {
        let dir = tempdir().unwrap();
        let storage = DirStorage::open(dir.path()).unwrap();
        let selection = PersistedSelection::recover(&storage).unwrap();
        assert_eq!(selection, PersistedSelection::default());
        assert_eq!(selection.current_file(), "");
        assert!(selection.triplet_files().is_empty());
    }
}
