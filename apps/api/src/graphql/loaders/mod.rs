//! Relation loaders for the GraphQL resolvers
//!
//! Each loader batches the keys requested during one scheduling tick into a
//! single store call, solving the N+1 problem for nested relation fields.
//!
//! There are two kinds of loaders:
//! - Single-entity loaders: resolve to `Option<T>` per key
//! - Collection loaders: resolve to `Vec<T>` per key
//!
//! A [`Loaders`] set is built per request by the executor and reached from
//! resolvers through the request context.

mod member_type;
mod posts_by_author;
mod profile_by_user;
mod subscriptions;
mod user;

pub use member_type::{MemberTypeBatch, MemberTypeLoader};
pub use posts_by_author::{PostsByAuthorBatch, PostsByAuthorLoader};
pub use profile_by_user::{ProfileByUserBatch, ProfileByUserLoader};
pub use subscriptions::{
    SubscribedToBatch, SubscribedToLoader, SubscribersBatch, SubscribersLoader,
};
pub use user::{UserBatch, UserLoader};

use std::future::Future;

use uuid::Uuid;

use crate::batch::{LoadError, Scheduler};
use crate::models::{SubscribedUser, User};
use crate::repositories::SharedStore;

/// Loader set for one request
pub struct Loaders {
    pub user_by_id: UserLoader,
    pub profile_by_user: ProfileByUserLoader,
    pub posts_by_author: PostsByAuthorLoader,
    pub member_type_by_id: MemberTypeLoader,
    pub subscribed_to_by_subscriber: SubscribedToLoader,
    pub subscribers_by_author: SubscribersLoader,
}

impl Loaders {
    /// Create a fresh loader set whose windows close on `scheduler` ticks
    pub fn new(store: SharedStore, scheduler: &Scheduler) -> Self {
        Self {
            user_by_id: UserLoader::new(UserBatch::new(store.clone()), scheduler),
            profile_by_user: ProfileByUserLoader::new(
                ProfileByUserBatch::new(store.clone()),
                scheduler,
            ),
            posts_by_author: PostsByAuthorLoader::new(
                PostsByAuthorBatch::new(store.clone()),
                scheduler,
            ),
            member_type_by_id: MemberTypeLoader::new(
                MemberTypeBatch::new(store.clone()),
                scheduler,
            ),
            subscribed_to_by_subscriber: SubscribedToLoader::new(
                SubscribedToBatch::new(store.clone()),
                scheduler,
            ),
            subscribers_by_author: SubscribersLoader::new(SubscribersBatch::new(store), scheduler),
        }
    }

    /// Users on the far side of subscription records, read through `user_by_id`
    ///
    /// The joined copies are primed first, so they only fill identity
    /// entries that are not cached yet. Users missing from the identity
    /// loader are skipped.
    pub fn far_side_users(
        &self,
        records: Vec<SubscribedUser>,
    ) -> impl Future<Output = Result<Vec<User>, LoadError>> + Send + 'static {
        let ids: Vec<Uuid> = records.iter().map(|record| record.user.id).collect();
        for record in records {
            self.user_by_id.prime(record.user.id, Some(record.user));
        }
        let users = self.user_by_id.load_many(ids);
        async move { Ok(users.await?.into_iter().flatten().collect()) }
    }

    /// Drop cached values that embed `user_id` after its fields changed
    pub fn user_changed(&self, user_id: Uuid) {
        self.user_by_id.clear(&user_id);
        // Edge lists carry copies of their far-side users
        self.subscribed_to_by_subscriber.clear_all();
        self.subscribers_by_author.clear_all();
    }

    /// Drop everything cached about `user_id` after it was deleted
    pub fn forget_user(&self, user_id: Uuid) {
        self.user_changed(user_id);
        self.profile_by_user.clear(&user_id);
        self.posts_by_author.clear(&user_id);
    }
}
