pub mod predict;
pub mod presets;
