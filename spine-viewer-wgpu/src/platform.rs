use spine_viewer::import::PathCandidate;
use spine_viewer::{DirStorage, Importer, Platform};
use std::path::PathBuf;

const PICKER_TITLE: &str = "Import skeleton, atlas, page image and background";
const PICKER_EXTENSIONS: [&str; 6] = ["json", "skel", "atlas", "png", "jpg", "jpeg"];

/// Desktop [`Platform`]: a native multi-file dialog feeding the importer.
pub struct DesktopPlatform {
    importer: Importer<DirStorage>,
}

impl DesktopPlatform {
    pub fn new(storage: DirStorage) -> spine_viewer::Result<Self> {
        let importer = Importer::new(storage)?;
        let selection = importer.selection();
        log::info!(
            "storage at {}: file {:?}, background {:?}",
            importer.storage().root().display(),
            selection.entry,
            selection.background
        );
        Ok(Self { importer })
    }

    pub fn importer(&self) -> &Importer<DirStorage> {
        &self.importer
    }

    /// Imports the given files; failures are logged, never surfaced.
    pub fn import_paths(&mut self, paths: Vec<PathBuf>) {
        let candidates = paths
            .into_iter()
            .filter_map(|path| {
                let candidate = PathCandidate::new(&path);
                if candidate.is_none() {
                    log::warn!("skipping file without a usable name: {}", path.display());
                }
                candidate
            })
            .collect::<Vec<_>>();

        match self.importer.import(&candidates) {
            Ok(Some(outcome)) => log::debug!("removed stale files: {:?}", outcome.removed),
            Ok(None) => {}
            Err(e) => log::error!("import failed: {e}"),
        }
    }
}

impl Platform for DesktopPlatform {
    fn current_file(&self) -> &str {
        self.importer.selection().current_file()
    }

    fn current_background(&self) -> Option<&str> {
        self.importer.selection().background.as_deref()
    }

    fn import_files(&mut self) {
        let picked = rfd::FileDialog::new()
            .set_title(PICKER_TITLE)
            .add_filter("Spine export", &PICKER_EXTENSIONS)
            .pick_files();
        match picked {
            Some(paths) => self.import_paths(paths),
            None => log::debug!("file selection cancelled"),
        }
    }
}
