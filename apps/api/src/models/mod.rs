//! Database models and types for Trellis
//!
//! This module contains SQLx models for:
//! - Users and their profiles
//! - Posts authored by users
//! - Membership tiers
//! - Subscription edges between users

pub mod member_type;
pub mod post;
pub mod profile;
pub mod subscription;
pub mod user;

pub use member_type::{MemberType, MemberTypeId};
pub use post::{CreatePost, Post, UpdatePost};
pub use profile::{CreateProfile, Profile, UpdateProfile};
pub use subscription::{SubscribedUser, SubscriptionEdge};
pub use user::{CreateUser, UpdateUser, User, UserGraph, UserIncludes};
