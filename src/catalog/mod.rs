//! Provider registry: which vendor can do what, and how the face step is executed for a
//! given (image provider, face-swap provider) pair.

pub mod capabilities;
pub mod registry;

pub use capabilities::Capabilities;
pub use registry::{FaceStrategy, ProviderName, Role, face_strategy};
