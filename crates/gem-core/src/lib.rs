pub mod camera;
pub mod canvas;
pub mod constants;
pub mod error;
pub mod gemstone;
pub mod keys;
pub mod observer;
pub mod params;
pub mod renderer;
pub mod shader_gen;

pub use camera::*;
pub use canvas::*;
pub use constants::*;
pub use error::*;
pub use gemstone::*;
pub use keys::*;
pub use observer::*;
pub use params::*;
pub use renderer::*;
pub use shader_gen::{generate, instantiate, template_source, FacetSnippets, Injected};
