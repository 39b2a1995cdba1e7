//! Field-selection planner for root user fields
//!
//! Before fetching users the root resolver looks at the selection below it.
//! Relations named there are joined into the single root fetch, and the
//! joined data is pushed into the request's loaders. The nested resolvers
//! still ask their loaders as usual, but find the values cached and settle
//! without another store call.
//!
//! Posts are never joined: they stay on the ordinary batched path, which
//! already costs one call per level.

use async_graphql::Lookahead;

use crate::graphql::loaders::Loaders;
use crate::models::{SubscribedUser, User, UserGraph, UserIncludes};

/// Relations requested under a `users` / `user(id)` selection
pub fn plan_user_includes(selection: &Lookahead<'_>) -> UserIncludes {
    UserIncludes {
        profile: selection.field("profile").exists(),
        subscribed_to: selection.field("userSubscribedTo").exists(),
        subscribers: selection.field("subscribedToUser").exists(),
    }
}

/// Prime the loaders with eagerly joined data and return the root users
///
/// Only relations that were joined are primed. Priming never replaces a
/// value already cached for the same key.
pub fn prime_user_graphs(loaders: &Loaders, graphs: Vec<UserGraph>) -> Vec<User> {
    graphs
        .into_iter()
        .map(|graph| {
            let id = graph.user.id;
            loaders.user_by_id.prime(id, Some(graph.user.clone()));

            if let Some(profile) = graph.profile {
                loaders.profile_by_user.prime(id, profile);
            }
            if let Some(authors) = graph.subscribed_to {
                prime_far_side(loaders, &authors);
                loaders.subscribed_to_by_subscriber.prime(id, authors);
            }
            if let Some(subscribers) = graph.subscribers {
                prime_far_side(loaders, &subscribers);
                loaders.subscribers_by_author.prime(id, subscribers);
            }

            graph.user
        })
        .collect()
}

fn prime_far_side(loaders: &Loaders, records: &[SubscribedUser]) {
    for record in records {
        loaders
            .user_by_id
            .prime(record.user.id, Some(record.user.clone()));
    }
}
