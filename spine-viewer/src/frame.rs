use crate::camera::{Camera, Viewport};
use glam::Vec2;
use spine2d::{BlendMode, Draw, DrawList, Vertex};

/// Texture key the background quad is drawn with.
///
/// Atlas pages are keyed by their file name, which always carries an extension, so this
/// cannot collide with one.
pub const BACKGROUND_TEXTURE: &str = "<background>";

/// Size in pixels of an image scaled uniformly so it covers the whole viewport.
pub fn cover_size(viewport: Viewport, image_width: u32, image_height: u32) -> Vec2 {
    let w = image_width.max(1) as f32;
    let h = image_height.max(1) as f32;
    let scale = (viewport.width / w).max(viewport.height / h);
    Vec2::new(w * scale, h * scale)
}

/// Appends a viewport-filling, centred background quad.
///
/// The quad is expressed in world space under `camera`, so it stays fixed on screen while the
/// skeleton pans and zooms.
pub fn append_background_quad(
    out: &mut DrawList,
    camera: &Camera,
    viewport: Viewport,
    image_width: u32,
    image_height: u32,
) {
    let half = cover_size(viewport, image_width, image_height) * 0.5 * camera.zoom;
    let center = camera.position;
    let corners = [
        (Vec2::new(-half.x, half.y), [0.0, 0.0]),
        (Vec2::new(half.x, half.y), [1.0, 0.0]),
        (Vec2::new(half.x, -half.y), [1.0, 1.0]),
        (Vec2::new(-half.x, -half.y), [0.0, 1.0]),
    ];

    let base = out.vertices.len() as u32;
    for (offset, uv) in corners {
        let p = center + offset;
        out.vertices.push(Vertex {
            position: [p.x, p.y],
            uv,
            color: [1.0, 1.0, 1.0, 1.0],
            dark_color: [0.0, 0.0, 0.0, 1.0],
        });
    }

    let first_index = out.indices.len();
    out.indices
        .extend([0, 1, 2, 2, 3, 0].into_iter().map(|i| base + i));
    out.draws.push(Draw {
        texture_path: BACKGROUND_TEXTURE.to_string(),
        blend: BlendMode::Normal,
        premultiplied_alpha: false,
        first_index,
        index_count: 6,
    });
}
