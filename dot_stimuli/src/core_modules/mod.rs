pub mod canvas;
pub mod hue_rotation;
pub mod lab;
pub mod lattice;
