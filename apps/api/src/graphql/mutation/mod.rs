//! GraphQL mutations for Trellis
//!
//! This module contains all mutation resolvers, organized by entity.
//! Mutations call the store directly. After a write they evict whatever the
//! request's loaders cached for the touched rows, so fields resolved later
//! in the same request read fresh data.

mod post;
mod profile;
mod subscription;
mod user;

pub use post::{ChangePostInput, CreatePostInput, PostMutation};
pub use profile::{ChangeProfileInput, CreateProfileInput, ProfileMutation};
pub use subscription::SubscriptionMutation;
pub use user::{ChangeUserInput, CreateUserInput, UserMutation};

use async_graphql::{Context, MergedObject};

use crate::graphql::loaders::Loaders;

/// Root mutation type combining all mutation domains
#[derive(MergedObject, Default)]
#[graphql(name = "Mutations")]
pub struct Mutation(UserMutation, ProfileMutation, PostMutation, SubscriptionMutation);

/// Run `evict` against the request's loaders, if the request has any
fn invalidate(ctx: &Context<'_>, evict: impl FnOnce(&Loaders)) {
    if let Some(loaders) = ctx.data_opt::<Loaders>() {
        evict(loaders);
    }
}
