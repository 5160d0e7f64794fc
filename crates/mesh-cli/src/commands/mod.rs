pub mod extrude;
pub mod grid;
pub mod info;
