//! Test fixtures for API integration tests
//!
//! Seeds a [`MemoryStore`] directly through the `Store` trait so tests start
//! from known rows with the call counters reset.

#![allow(dead_code)]

use std::sync::Arc;

use trellis_api::models::{
    CreatePost, CreateProfile, CreateUser, MemberTypeId, Post, Profile, SubscriptionEdge, User,
};
use trellis_api::repositories::{MemoryStore, Store};
use trellis_api::GraphExecutor;

/// Depth bound used unless a test says otherwise
pub const TEST_MAX_DEPTH: usize = 5;

/// An executor over a fresh in-memory store
pub struct TestApi {
    pub store: Arc<MemoryStore>,
    pub executor: GraphExecutor,
}

impl TestApi {
    pub fn new() -> Self {
        Self::with_max_depth(TEST_MAX_DEPTH)
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        let store = Arc::new(MemoryStore::new());
        let executor = GraphExecutor::new(store.clone(), max_depth);
        Self { store, executor }
    }

    pub async fn user(&self, name: &str) -> User {
        self.store
            .create_user(CreateUser {
                name: name.to_string(),
                balance: 100.0,
            })
            .await
            .unwrap()
    }

    pub async fn post(&self, author: &User, title: &str) -> Post {
        self.store
            .create_post(CreatePost {
                title: title.to_string(),
                content: format!("{} body", title),
                author_id: author.id,
            })
            .await
            .unwrap()
    }

    pub async fn profile(&self, owner: &User, tier: MemberTypeId) -> Profile {
        self.store
            .create_profile(CreateProfile {
                is_male: true,
                year_of_birth: 1990,
                user_id: owner.id,
                member_type_id: tier,
            })
            .await
            .unwrap()
    }

    pub async fn subscribe(&self, subscriber: &User, author: &User) {
        self.store
            .subscribe(SubscriptionEdge::new(subscriber.id, author.id))
            .await
            .unwrap()
    }

    /// Forget the calls made while seeding
    pub fn start_counting(&self) {
        self.store.reset_calls();
    }
}
