//! Navigation and animation core for an interactive map tour.
//!
//! A vehicle marker travels between an ordered list of waypoints. The
//! [`AnimationController`] owns the marker state and serializes moves,
//! [`ProgressGate`] decides which stops disclose their photos, and
//! [`NotificationService`] shows the self-expiring arrival feedback.

pub mod config;
pub mod controller;
pub mod error;
pub mod gallery;
pub mod gate;
pub mod notify;
pub mod session;
pub mod surface;
pub mod waypoint;

pub use config::*;
pub use controller::*;
pub use error::*;
pub use gallery::*;
pub use gate::*;
pub use notify::*;
pub use session::*;
pub use surface::*;
pub use waypoint::*;
