pub mod backend;
pub mod builder;
pub mod context;
pub mod pipeline;

pub use backend::{GemProgram, WgpuBackend};
pub use builder::{LocalFuture, Spawner, WgpuShaderBuilder};
pub use context::GpuContext;
pub use pipeline::GpuUniforms;
