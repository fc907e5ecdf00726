//! Asset loading/parsers: OBJ meshes, BMP textures, GLSL shader programs.

pub mod bmp;
pub mod error;
pub mod mesh;
pub mod obj;
pub mod shader;
pub mod texture;

pub use error::{AssetError, AssetResult};
pub use mesh::RenderObject;
pub use shader::{ShaderProgram, ShaderStage};
pub use texture::TextureData;
