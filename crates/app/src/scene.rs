//! Startup asset loading with the viewer's failure policy:
//! shaders are required, meshes and texture degrade.

use anyhow::{Context, Result};
use asset::{RenderObject, TextureData, obj, shader};
use renderer::Scene;

use crate::config::ViewerConfig;

/// Edge length of the checkerboard used when the bitmap can't be loaded.
const FALLBACK_TEXTURE_SIZE: u32 = 64;

pub fn load_scene(config: &ViewerConfig) -> Result<Scene> {
    let paths = &config.assets;

    let program = shader::load_program(
        config.resolve(&paths.vertex_shader),
        config.resolve(&paths.fragment_shader),
    )
    .context("no usable shader program")?;

    let objects = paths
        .models
        .iter()
        .map(|p| {
            obj::load_obj_from_path(config.resolve(p)).unwrap_or_else(|e| {
                log::error!("Mesh load failed, drawing nothing for it: {e}");
                RenderObject::default()
            })
        })
        .collect();

    let texture = TextureData::load_bmp(config.resolve(&paths.texture)).unwrap_or_else(|e| {
        log::warn!("Texture load failed ({e}); using checkerboard");
        TextureData::create_test_texture(FALLBACK_TEXTURE_SIZE)
    });

    Ok(Scene {
        program,
        objects,
        texture,
    })
}
