//! GraphQL type definitions for Trellis
//!
//! Object types wrap the store models. Scalar fields read straight off the
//! wrapped record; relation fields go through the request's loaders.

mod member_type;
mod post;
mod profile;
mod user;

pub use member_type::{MemberType, MemberTypeId};
pub use post::Post;
pub use profile::Profile;
pub use user::User;
