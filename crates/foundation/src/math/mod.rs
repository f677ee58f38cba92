pub mod geodesy;
pub mod latlng;

pub use geodesy::*;
pub use latlng::*;
