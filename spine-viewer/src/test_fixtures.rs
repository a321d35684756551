use crate::import::{Importer, MemoryCandidate};
use crate::session::Platform;
use crate::storage::DirStorage;
use std::io::Cursor;

pub const HERO_JSON: &str = r#"
{
  "skeleton": { "spine": "4.3.00" },
  "bones": [ { "name": "root" } ],
  "slots": [ { "name": "slot0", "bone": "root", "attachment": "body" } ],
  "skins": {
    "default": {
      "slot0": { "body": { "type": "region", "path": "body", "width": 4, "height": 4 } }
    },
    "armored": {
      "slot0": { "body": { "type": "region", "path": "body", "width": 8, "height": 8 } }
    },
    "ghost": {
      "slot0": { "body": { "type": "region", "path": "body", "width": 2, "height": 2 } }
    }
  },
  "animations": {
    "idle": {
      "bones": {
        "root": {
          "rotate": [
            { "time": 0, "angle": 0 },
            { "time": 1, "angle": 360 }
          ]
        }
      }
    },
    "walk": {
      "bones": {
        "root": {
          "translate": [
            { "time": 0, "x": 0, "y": 0 },
            { "time": 1, "x": 10, "y": 0 }
          ]
        }
      }
    }
  }
}
"#;

pub const SINGLE_JSON: &str = r#"
{
  "skeleton": { "spine": "4.3.00" },
  "bones": [ { "name": "root" } ],
  "slots": [ { "name": "slot0", "bone": "root", "attachment": "body" } ],
  "skins": {
    "default": {
      "slot0": { "body": { "type": "region", "path": "body", "width": 4, "height": 4 } }
    }
  },
  "animations": {
    "idle": {
      "bones": {
        "root": {
          "rotate": [
            { "time": 0, "angle": 0 },
            { "time": 1, "angle": 90 }
          ]
        }
      }
    }
  }
}
"#;

pub fn atlas_text(page: &str) -> String {
    format!(
        r#"
{page}
size: 4,4

body
  rotate: false
  xy: 0, 0
  size: 4, 4
"#
    )
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 40, 40, 255]));
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, image::ImageFormat::Png)
        .expect("encode png");
    out.into_inner()
}

pub fn jpg_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = image::RgbImage::from_pixel(width, height, image::Rgb([20, 60, 200]));
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, image::ImageFormat::Jpeg)
        .expect("encode jpeg");
    out.into_inner()
}

/// Candidates for a complete `<basename>` triplet with the given skeleton JSON.
pub fn triplet(basename: &str, json: &str) -> Vec<MemoryCandidate> {
    let page = format!("{basename}.png");
    vec![
        MemoryCandidate::new(format!("{basename}.atlas"), atlas_text(&page)),
        MemoryCandidate::new(page, png_bytes(4, 4)),
        MemoryCandidate::new(format!("{basename}.json"), json),
    ]
}

/// A platform whose picker "returns" the queued candidates.
pub struct QueuedPlatform {
    pub importer: Importer<DirStorage>,
    pub queued: Vec<MemoryCandidate>,
    pub import_requests: usize,
}

impl QueuedPlatform {
    pub fn new(storage: DirStorage) -> Self {
        Self {
            importer: Importer::new(storage).expect("open importer"),
            queued: Vec::new(),
            import_requests: 0,
        }
    }
}

impl Platform for QueuedPlatform {
    fn current_file(&self) -> &str {
        self.importer.selection().current_file()
    }

    fn current_background(&self) -> Option<&str> {
        self.importer.selection().background.as_deref()
    }

    fn import_files(&mut self) {
        self.import_requests += 1;
        let candidates = std::mem::take(&mut self.queued);
        self.importer.import(&candidates).expect("import");
    }
}
