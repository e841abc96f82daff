pub mod transform;
pub mod camera;
