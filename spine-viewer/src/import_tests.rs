use crate::import::{
    CandidateFile, ImportPlan, Importer, MemoryCandidate, PathCandidate, TripletPlan, resolve,
};
use crate::selection::PersistedSelection;
use crate::storage::{DirStorage, Storage};
use crate::test_fixtures::{jpg_bytes, png_bytes, triplet};
use crate::Error;
use tempfile::tempdir;

fn open_importer(dir: &std::path::Path) -> Importer<DirStorage> {
    Importer::new(DirStorage::open(dir).unwrap()).unwrap()
}

fn stored(importer: &Importer<DirStorage>) -> Vec<String> {
    importer.storage().list().unwrap()
}

#[test]
fn resolve_example_with_background() {
    let plan = resolve(&["hero.atlas", "hero.png", "hero.json", "bg.jpg"]).unwrap();
    assert_eq!(
        plan,
        ImportPlan {
            triplet: Some(TripletPlan {
                basename: "hero".to_string(),
                entry: "hero.json".to_string(),
                atlas: "hero.atlas".to_string(),
                page: "hero.png".to_string(),
            }),
            background: Some("bg.jpg".to_string()),
        }
    );
    assert_eq!(
        plan.files(),
        vec!["hero.json", "hero.atlas", "hero.png", "bg.jpg"]
    );
}

#[test]
fn resolve_needs_three_candidates() {
    assert_eq!(resolve(&["hero.atlas", "hero.json"]), None);
    assert_eq!(resolve(&["sky.jpg", "wall.png"]), None);
    assert_eq!(resolve::<&str>(&[]), None);
}

#[test]
fn resolve_single_image_is_background_only() {
    let plan = resolve(&["sky.jpeg"]).unwrap();
    assert_eq!(plan.triplet, None);
    assert_eq!(plan.background.as_deref(), Some("sky.jpeg"));
    assert_eq!(plan.files(), vec!["sky.jpeg"]);

    assert_eq!(resolve(&["hero.json"]), None);
    assert_eq!(resolve(&["hero.atlas"]), None);
}

#[test]
fn resolve_needs_atlas_with_basename() {
    assert_eq!(resolve(&[".atlas", ".png", ".json"]), None);
    assert_eq!(resolve(&["hero.png", "hero.json", "hero.skel"]), None);
}

#[test]
fn resolve_needs_page_image() {
    assert_eq!(resolve(&["hero.atlas", "hero.json", "other.png"]), None);
}

#[test]
fn resolve_needs_entry_file_and_prefers_json() {
    assert_eq!(resolve(&["hero.atlas", "hero.png", "hero.txt"]), None);

    let skel = resolve(&["hero.skel", "hero.atlas", "hero.png"]).unwrap();
    assert_eq!(skel.entry(), Some("hero.skel"));

    let both = resolve(&["hero.skel", "hero.atlas", "hero.png", "hero.json"]).unwrap();
    assert_eq!(both.entry(), Some("hero.json"));
}

#[test]
fn resolve_first_atlas_wins() {
    let plan = resolve(&[
        "b.atlas", "a.atlas", "a.png", "a.json", "b.png", "b.json",
    ])
    .unwrap();
    assert_eq!(plan.triplet.as_ref().unwrap().basename, "b");
    assert_eq!(plan.background.as_deref(), Some("a.png"));
}

#[test]
fn resolve_background_skips_page_and_takes_first_image() {
    let plan = resolve(&[
        "hero.png", "hero.atlas", "hero.json", "sky.jpeg", "wall.png",
    ])
    .unwrap();
    assert_eq!(plan.background.as_deref(), Some("sky.jpeg"));

    let none = resolve(&["hero.png", "hero.atlas", "hero.json", "notes.txt"]).unwrap();
    assert_eq!(none.background, None);
}

#[test]
fn import_of_example_persists_four_identical_files() {
    let dir = tempdir().unwrap();
    let mut importer = open_importer(dir.path());
    let mut candidates = triplet("hero", "{}");
    candidates.push(MemoryCandidate::new("bg.jpg", jpg_bytes(8, 8)));

    let outcome = importer.import(&candidates).unwrap().expect("valid import");
    assert_eq!(outcome.plan.entry(), Some("hero.json"));
    assert_eq!(outcome.plan.background.as_deref(), Some("bg.jpg"));
    assert!(outcome.removed.is_empty());

    assert_eq!(
        stored(&importer),
        vec!["bg.jpg", "hero.atlas", "hero.json", "hero.png"]
    );
    for candidate in &candidates {
        assert_eq!(
            importer.storage().read(candidate.name()).unwrap(),
            candidate.bytes,
            "{} differs",
            candidate.name
        );
    }
    assert_eq!(
        importer.selection(),
        &PersistedSelection {
            entry: Some("hero.json".to_string()),
            background: Some("bg.jpg".to_string()),
        }
    );
}

#[test]
fn import_without_background_persists_three_files() {
    let dir = tempdir().unwrap();
    let mut importer = open_importer(dir.path());
    importer.import(&triplet("hero", "{}")).unwrap().unwrap();
    assert_eq!(stored(&importer), vec!["hero.atlas", "hero.json", "hero.png"]);
    assert_eq!(importer.selection().background, None);
}

#[test]
fn invalid_selection_touches_nothing() {
    let dir = tempdir().unwrap();
    let mut importer = open_importer(dir.path());
    let mut first = triplet("hero", "{}");
    first.push(MemoryCandidate::new("bg.jpg", jpg_bytes(2, 2)));
    importer.import(&first).unwrap().unwrap();
    let before = stored(&importer);
    let selection = importer.selection().clone();

    let two = vec![
        MemoryCandidate::new("hero.atlas", "x"),
        MemoryCandidate::new("hero.json", "x"),
    ];
    assert_eq!(importer.import(&two).unwrap(), None);

    let no_atlas = vec![
        MemoryCandidate::new("other.png", png_bytes(1, 1)),
        MemoryCandidate::new("other.json", "x"),
        MemoryCandidate::new("sky.jpg", jpg_bytes(1, 1)),
    ];
    assert_eq!(importer.import(&no_atlas).unwrap(), None);

    assert_eq!(stored(&importer), before);
    assert_eq!(importer.selection(), &selection);
    assert_eq!(importer.storage().read("hero.json").unwrap(), b"{}");
}

#[test]
fn new_background_replaces_old_and_keeps_triplet() {
    let dir = tempdir().unwrap();
    let mut importer = open_importer(dir.path());
    let mut first = triplet("hero", "{}");
    first.push(MemoryCandidate::new("old.jpg", jpg_bytes(2, 2)));
    importer.import(&first).unwrap().unwrap();

    let mut second = triplet("hero", "{}");
    second.push(MemoryCandidate::new("new.png", png_bytes(3, 3)));
    let outcome = importer.import(&second).unwrap().unwrap();

    assert!(outcome.removed.contains(&"old.jpg".to_string()));
    assert_eq!(
        stored(&importer),
        vec!["hero.atlas", "hero.json", "hero.png", "new.png"]
    );
    assert_eq!(importer.storage().read("hero.json").unwrap(), b"{}");
    assert_eq!(importer.selection().background.as_deref(), Some("new.png"));
    assert_eq!(importer.selection().entry.as_deref(), Some("hero.json"));
}

#[test]
fn background_alone_replaces_old_background_and_keeps_triplet() {
    let dir = tempdir().unwrap();
    let mut importer = open_importer(dir.path());
    let mut first = triplet("hero", "{}");
    first.push(MemoryCandidate::new("old.jpg", jpg_bytes(2, 2)));
    importer.import(&first).unwrap().unwrap();
    let triplet_bytes = ["hero.atlas", "hero.json", "hero.png"]
        .map(|name| importer.storage().read(name).unwrap());

    let sky = jpg_bytes(6, 3);
    let outcome = importer
        .import(&[MemoryCandidate::new("new.jpg", sky.clone())])
        .unwrap()
        .expect("background import");

    assert_eq!(outcome.removed, vec!["old.jpg".to_string()]);
    assert_eq!(
        stored(&importer),
        vec!["hero.atlas", "hero.json", "hero.png", "new.jpg"]
    );
    for (name, bytes) in ["hero.atlas", "hero.json", "hero.png"].iter().zip(&triplet_bytes) {
        assert_eq!(&importer.storage().read(name).unwrap(), bytes, "{name} changed");
    }
    assert_eq!(importer.storage().read("new.jpg").unwrap(), sky);
    assert_eq!(importer.selection().background.as_deref(), Some("new.jpg"));
    assert_eq!(importer.selection().entry.as_deref(), Some("hero.json"));
}

#[test]
fn background_alone_into_empty_storage() {
    let dir = tempdir().unwrap();
    let mut importer = open_importer(dir.path());
    let outcome = importer
        .import(&[MemoryCandidate::new("sky.png", png_bytes(2, 2))])
        .unwrap()
        .unwrap();

    assert!(outcome.removed.is_empty());
    assert_eq!(stored(&importer), vec!["sky.png"]);
    assert_eq!(importer.selection().current_file(), "");
    assert_eq!(importer.selection().background.as_deref(), Some("sky.png"));
}

#[test]
fn background_alone_cannot_overwrite_the_page_image() {
    let dir = tempdir().unwrap();
    let mut importer = open_importer(dir.path());
    importer.import(&triplet("hero", "{}")).unwrap().unwrap();
    let page = importer.storage().read("hero.png").unwrap();

    let clash = [MemoryCandidate::new("hero.png", jpg_bytes(1, 1))];
    assert_eq!(importer.import(&clash).unwrap(), None);
    assert_eq!(importer.storage().read("hero.png").unwrap(), page);
    assert_eq!(importer.selection().background, None);
}

#[test]
fn new_triplet_without_background_keeps_old_background() {
    let dir = tempdir().unwrap();
    let mut importer = open_importer(dir.path());
    let mut first = triplet("hero", "{}");
    first.push(MemoryCandidate::new("bg.jpg", jpg_bytes(2, 2)));
    importer.import(&first).unwrap().unwrap();
    let background = importer.storage().read("bg.jpg").unwrap();

    let outcome = importer.import(&triplet("villain", "[]")).unwrap().unwrap();

    assert!(!outcome.removed.contains(&"bg.jpg".to_string()));
    assert_eq!(
        stored(&importer),
        vec!["bg.jpg", "villain.atlas", "villain.json", "villain.png"]
    );
    assert_eq!(importer.storage().read("bg.jpg").unwrap(), background);
    assert_eq!(importer.selection().entry.as_deref(), Some("villain.json"));
    assert_eq!(importer.selection().background.as_deref(), Some("bg.jpg"));
}

#[test]
fn new_triplet_clears_unrelated_stale_files() {
    let dir = tempdir().unwrap();
    let mut storage = DirStorage::open(dir.path()).unwrap();
    storage.write("leftover.bin", b"junk").unwrap();
    let mut importer = Importer::with_selection(storage, PersistedSelection::default());

    importer.import(&triplet("hero", "{}")).unwrap().unwrap();
    assert_eq!(stored(&importer), vec!["hero.atlas", "hero.json", "hero.png"]);
}

struct Unreadable(&'static str);

impl CandidateFile for Unreadable {
    fn name(&self) -> &str {
        self.0
    }

    fn read_bytes(&self) -> std::io::Result<Vec<u8>> {
        Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"))
    }
}

#[test]
fn unreadable_candidate_aborts_before_touching_storage() {
    let dir = tempdir().unwrap();
    let mut importer = open_importer(dir.path());
    importer.import(&triplet("hero", "{}")).unwrap().unwrap();
    let before = stored(&importer);

    let broken = [
        Unreadable("villain.atlas"),
        Unreadable("villain.png"),
        Unreadable("villain.json"),
    ];
    match importer.import(&broken) {
        Err(Error::CandidateRead { name, .. }) => assert_eq!(name, "villain.json"),
        other => panic!("unexpected: {other:?}"),
    }
    assert_eq!(stored(&importer), before);
    assert_eq!(importer.selection().current_file(), "hero.json");
}

#[test]
fn path_candidates_copy_from_disk() {
    let source = tempdir().unwrap();
    let target = tempdir().unwrap();
    let mut candidates = Vec::new();
    for candidate in triplet("hero", "{\"a\":1}") {
        let path = source.path().join(&candidate.name);
        std::fs::write(&path, &candidate.bytes).unwrap();
        candidates.push(PathCandidate::new(path).unwrap());
    }
    assert_eq!(candidates[0].name(), "hero.atlas");

    let mut importer = open_importer(target.path());
    importer.import(&candidates).unwrap().unwrap();
    assert_eq!(importer.storage().read("hero.json").unwrap(), b"{\"a\":1}");
}

#[test]
fn importer_recovers_selection_from_storage() {
    let dir = tempdir().unwrap();
    {
        let mut importer = open_importer(dir.path());
        let mut candidates = triplet("hero", "{}");
        candidates.push(MemoryCandidate::new("bg.jpg", jpg_bytes(2, 2)));
        importer.import(&candidates).unwrap().unwrap();
    }
    let reopened = open_importer(dir.path());
    assert_eq!(reopened.selection().current_file(), "hero.json");
    assert_eq!(reopened.selection().background.as_deref(), Some("bg.jpg"));
}
