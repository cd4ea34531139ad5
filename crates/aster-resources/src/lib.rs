//! Resource loading and management.
//!
//! This crate handles loading of external assets:
//! - OBJ model loading (via `tobj`)
//! - Texture image loading (via `image`)
//! - Material definitions

mod error;

pub mod material;
pub mod model;
pub mod texture;

pub use error::{ResourceError, ResourceResult};
pub use material::Material;
pub use model::{Mesh, Model};
pub use texture::TextureData;
