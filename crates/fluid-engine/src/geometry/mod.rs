pub mod codec;
pub mod polyline;

pub use polyline::{Point, Polyline};
