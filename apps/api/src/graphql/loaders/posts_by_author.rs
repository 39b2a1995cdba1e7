//! Posts-by-author batch loader
//!
//! Returns every post of each requested author. Authors without posts
//! resolve to an empty list.

use uuid::Uuid;

use crate::batch::{BatchFn, Loader, Many};
use crate::models::Post;
use crate::repositories::{SharedStore, StoreResult};

#[derive(Clone)]
pub struct PostsByAuthorBatch {
    store: SharedStore,
}

impl PostsByAuthorBatch {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }
}

impl BatchFn for PostsByAuthorBatch {
    type Key = Uuid;
    type Record = Post;

    const NAME: &'static str = "posts_by_author";

    fn key_of(post: &Post) -> Uuid {
        post.author_id
    }

    async fn fetch(&self, keys: &[Uuid]) -> StoreResult<Vec<Post>> {
        self.store.posts_by_author_ids(keys).await
    }
}

pub type PostsByAuthorLoader = Loader<PostsByAuthorBatch, Many>;
