//! WebGPU rendering module
//!
//! Bubbles are ray-cast analytically in the fragment shader; there is no
//! mesh or scene graph.

pub mod bubble_pipeline;
pub mod camera;

pub use bubble_pipeline::BubbleRenderState;
pub use camera::Camera;
