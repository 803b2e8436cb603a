pub mod libx11;

pub use libx11::*;
