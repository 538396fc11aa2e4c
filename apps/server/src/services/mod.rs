//! Business logic layer
//!
//! Services orchestrate the reconciliation workflows by coordinating the
//! mapper boundary, natural-key resolution, and the object repository.

pub mod attachment;
pub mod identity;
pub mod intake;
pub mod locks;
pub mod reconcile;

pub use attachment::AttachmentService;
pub use identity::{IdentityResolver, Resolution};
pub use intake::IntakeService;
pub use locks::KeyLockRegistry;
pub use reconcile::TypeReconciler;
