//! Anonymous identity for a visitor session.
//!
//! The identity is established once by a background sign-in and read by the
//! analyzer widget through an [`IdentityWatch`]. "Not yet signed in" is the
//! explicit [`IdentityState::Pending`] state.

pub mod models;
pub mod slot;

pub use models::{Identity, IdentityState, UserId};
pub use slot::{IdentitySlot, IdentityWatch};
