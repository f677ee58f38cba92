pub mod bounds;
pub mod math;

// Foundation crate: small, well-tested geographic primitives only.
pub use bounds::*;
pub use math::*;
