use thiserror::Error;

/// Fatal GPU setup failures. Per-frame surface errors stay `wgpu::SurfaceError`.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("surface is not supported by the adapter: {0}")]
    SurfaceUnsupported(&'static str),

    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("render pipeline rejected: {0}")]
    Pipeline(String),
}
