//! Command-line configuration. Every flag is optional; defaults reproduce the
//! stock asset layout next to the working directory.

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct AssetPaths {
    pub vertex_shader: PathBuf,
    pub fragment_shader: PathBuf,
    pub models: Vec<PathBuf>,
    pub texture: PathBuf,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            vertex_shader: "shader/TransformTexVertex.glsl".into(),
            fragment_shader: "shader/TransformTexFragment.glsl".into(),
            models: vec!["models/ico.obj".into(), "models/cube2.obj".into()],
            texture: "graphics/rock.bmp".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub backends: wgpu::Backends,
    pub show_fps: bool,
    pub asset_root: PathBuf,
    pub assets: AssetPaths,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            show_fps: false,
            asset_root: PathBuf::from("."),
            assets: AssetPaths::default(),
        }
    }
}

impl ViewerConfig {
    /// Parse `--flag=value` style arguments (program name excluded).
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut config = Self::default();
        for arg in args {
            let arg = arg.as_ref();
            if let Some(val) = arg.strip_prefix("--gpu-backend=") {
                config.backends = parse_backend(val);
            } else if arg == "--show-fps" {
                config.show_fps = true;
            } else if let Some(val) = arg.strip_prefix("--show-fps=") {
                config.show_fps = matches!(
                    val.to_ascii_lowercase().as_str(),
                    "1" | "true" | "on" | "yes"
                );
            } else if let Some(val) = arg.strip_prefix("--assets=") {
                config.asset_root = PathBuf::from(val);
            } else {
                log::warn!("Ignoring unknown argument '{}'", arg);
            }
        }
        config
    }

    /// Resolve an asset path against `asset_root`.
    pub fn resolve(&self, relative: &Path) -> PathBuf {
        self.asset_root.join(relative)
    }
}

fn parse_backend(val: &str) -> wgpu::Backends {
    match val.to_ascii_lowercase().as_str() {
        "auto" => wgpu::Backends::all(),
        "vulkan" | "vk" => wgpu::Backends::VULKAN,
        "dx12" | "d3d12" => wgpu::Backends::DX12,
        "metal" | "mtl" => wgpu::Backends::METAL,
        "gl" | "opengl" | "gles" => wgpu::Backends::GL,
        other => {
            log::warn!("Unknown backend '{}', falling back to auto.", other);
            wgpu::Backends::all()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_layout() {
        let config = ViewerConfig::from_args(Vec::<String>::new());
        assert_eq!(config.backends, wgpu::Backends::all());
        assert!(!config.show_fps);
        assert_eq!(
            config.resolve(&config.assets.texture),
            PathBuf::from("./graphics/rock.bmp")
        );
        assert_eq!(config.assets.models.len(), 2);
    }

    #[test]
    fn flags_are_parsed() {
        let config = ViewerConfig::from_args(["--gpu-backend=GL", "--show-fps", "--assets=/srv/demo"]);
        assert_eq!(config.backends, wgpu::Backends::GL);
        assert!(config.show_fps);
        assert_eq!(
            config.resolve(Path::new("models/ico.obj")),
            PathBuf::from("/srv/demo/models/ico.obj")
        );
    }

    #[test]
    fn bad_values_fall_back() {
        let config = ViewerConfig::from_args(["--gpu-backend=glide", "--show-fps=nah", "--bogus"]);
        assert_eq!(config.backends, wgpu::Backends::all());
        assert!(!config.show_fps);
    }
}
