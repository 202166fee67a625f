//! WebGPU rendering module
//!
//! Forward renderer for the hall: instanced unit meshes, depth testing, lit
//! materials and optional per-surface textures.

pub mod scene_pipeline;
pub mod shapes;
pub mod texture;
pub mod vertex;

pub use scene_pipeline::SceneRenderState;
