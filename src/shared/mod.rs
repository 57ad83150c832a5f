//! Types shared between the window model and its collaborators

pub mod geometry;

pub use geometry::{Extents, Rect, Vec2};
