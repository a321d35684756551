use image::RgbaImage;
use spine_viewer::frame::BACKGROUND_TEXTURE;
use spine_viewer::{Platform, Storage, ViewerSession};
use spine2d_wgpu::{
    HashMapTextureProvider, SpineRenderer, create_sampler_for_atlas_page,
    create_texture_bind_group,
};
use std::collections::HashMap;

/// GPU copies of the session's atlas pages and background, keyed by texture name.
///
/// Rebuilt wholesale when the session's asset generation moves; dropping the old bind
/// groups releases their textures.
pub struct GpuTextures {
    generation: Option<u64>,
    pub provider: HashMapTextureProvider,
}

impl Default for GpuTextures {
    fn default() -> Self {
        Self {
            generation: None,
            provider: HashMapTextureProvider {
                bind_groups: HashMap::new(),
            },
        }
    }
}

impl GpuTextures {
    pub fn contains(&self, name: &str) -> bool {
        self.provider.bind_groups.contains_key(name)
    }

    pub fn sync<P: Platform, S: Storage>(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        renderer: &SpineRenderer,
        session: &ViewerSession<P, S>,
    ) {
        if self.generation == Some(session.asset_generation()) {
            return;
        }
        self.generation = Some(session.asset_generation());
        self.provider.bind_groups.clear();

        if let Some(loaded) = session.loaded() {
            for page in &loaded.atlas.pages {
                let Some(image) = loaded.pages.iter().find(|p| p.name == page.name) else {
                    log::warn!("missing page image for {}", page.name);
                    continue;
                };
                let sampler = create_sampler_for_atlas_page(device, page);
                let bind_group = upload(device, queue, renderer, &page.name, &image.image, &sampler);
                self.provider.bind_groups.insert(page.name.clone(), bind_group);
            }
        }

        if let Some(background) = session.background() {
            let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("spine-viewer background sampler"),
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                ..Default::default()
            });
            let bind_group = upload(
                device,
                queue,
                renderer,
                &background.name,
                &background.image,
                &sampler,
            );
            self.provider
                .bind_groups
                .insert(BACKGROUND_TEXTURE.to_string(), bind_group);
        }

        log::debug!(
            "uploaded {} texture(s) for generation {}",
            self.provider.bind_groups.len(),
            session.asset_generation()
        );
    }
}

fn upload(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    renderer: &SpineRenderer,
    label: &str,
    image: &RgbaImage,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    let (w, h) = image.dimensions();
    let size = wgpu::Extent3d {
        width: w.max(1),
        height: h.max(1),
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    if w > 0 && h > 0 {
        queue.write_texture(
            texture.as_image_copy(),
            image.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * w),
                rows_per_image: Some(h),
            },
            size,
        );
    }
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    create_texture_bind_group(device, renderer.texture_bind_group_layout(), &view, sampler)
}
