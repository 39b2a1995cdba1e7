//! In-memory store
//!
//! Holds every table in process behind a mutex. Each operation is counted so
//! tests can assert how many round trips a query made, and any operation can
//! be switched to fail to exercise error paths. Constraint behaviour mirrors
//! the Postgres schema: unique profile per user, unique subscription pair,
//! foreign keys checked on insert, dependents removed with their user.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::models::{
    CreatePost, CreateProfile, CreateUser, MemberType, MemberTypeId, Post, Profile,
    SubscribedUser, SubscriptionEdge, UpdatePost, UpdateProfile, UpdateUser, User, UserGraph,
    UserIncludes,
};
use crate::sync::lock;

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    profiles: Vec<Profile>,
    posts: Vec<Post>,
    member_types: Vec<MemberType>,
    subscriptions: Vec<SubscriptionEdge>,
}

impl Tables {
    fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    fn edges_joined(
        &self,
        keys: &HashSet<Uuid>,
        matched_on: impl Fn(&SubscriptionEdge) -> Uuid,
        far_side: impl Fn(&SubscriptionEdge) -> Uuid,
    ) -> Vec<SubscribedUser> {
        self.subscriptions
            .iter()
            .filter(|edge| keys.contains(&matched_on(edge)))
            .filter_map(|edge| {
                self.user(far_side(edge)).map(|user| SubscribedUser {
                    edge: *edge,
                    user: user.clone(),
                })
            })
            .collect()
    }
}

/// Store keeping all data in process memory
#[derive(Debug)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    calls: Mutex<HashMap<&'static str, usize>>,
    failing: Mutex<HashSet<&'static str>>,
}

impl MemoryStore {
    /// Create a store seeded with the membership tiers
    pub fn new() -> Self {
        let tables = Tables {
            member_types: MemberType::seed(),
            ..Tables::default()
        };
        Self {
            tables: Mutex::new(tables),
            calls: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
        }
    }

    /// Number of times `operation` was called since the last reset
    pub fn calls(&self, operation: &str) -> usize {
        lock(&self.calls).get(operation).copied().unwrap_or(0)
    }

    /// Total number of store calls since the last reset
    pub fn total_calls(&self) -> usize {
        lock(&self.calls).values().sum()
    }

    /// Forget all recorded calls
    pub fn reset_calls(&self) {
        lock(&self.calls).clear();
    }

    /// Make every later call to `operation` fail with [`StoreError::Unavailable`]
    pub fn fail(&self, operation: &'static str) {
        lock(&self.failing).insert(operation);
    }

    /// Undo [`MemoryStore::fail`] for `operation`
    pub fn recover(&self, operation: &'static str) {
        lock(&self.failing).remove(operation);
    }

    /// Record a call and return the tables, or the injected failure
    fn enter(&self, operation: &'static str) -> StoreResult<MutexGuard<'_, Tables>> {
        *lock(&self.calls).entry(operation).or_insert(0) += 1;
        if lock(&self.failing).contains(operation) {
            return Err(StoreError::Unavailable(format!("{} failed", operation)));
        }
        Ok(lock(&self.tables))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        self.enter("ping").map(|_| ())
    }

    async fn users_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<User>> {
        let tables = self.enter("users_by_ids")?;
        let keys: HashSet<_> = ids.iter().collect();
        Ok(tables
            .users
            .iter()
            .filter(|u| keys.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn profiles_by_user_ids(&self, user_ids: &[Uuid]) -> StoreResult<Vec<Profile>> {
        let tables = self.enter("profiles_by_user_ids")?;
        let keys: HashSet<_> = user_ids.iter().collect();
        Ok(tables
            .profiles
            .iter()
            .filter(|p| keys.contains(&p.user_id))
            .cloned()
            .collect())
    }

    async fn posts_by_author_ids(&self, author_ids: &[Uuid]) -> StoreResult<Vec<Post>> {
        let tables = self.enter("posts_by_author_ids")?;
        let keys: HashSet<_> = author_ids.iter().collect();
        Ok(tables
            .posts
            .iter()
            .filter(|p| keys.contains(&p.author_id))
            .cloned()
            .collect())
    }

    async fn member_types_by_ids(&self, ids: &[MemberTypeId]) -> StoreResult<Vec<MemberType>> {
        let tables = self.enter("member_types_by_ids")?;
        Ok(tables
            .member_types
            .iter()
            .filter(|m| ids.contains(&m.id))
            .cloned()
            .collect())
    }

    async fn authors_by_subscriber_ids(
        &self,
        subscriber_ids: &[Uuid],
    ) -> StoreResult<Vec<SubscribedUser>> {
        let tables = self.enter("authors_by_subscriber_ids")?;
        let keys: HashSet<Uuid> = subscriber_ids.iter().copied().collect();
        Ok(tables.edges_joined(&keys, |e| e.subscriber_id, |e| e.author_id))
    }

    async fn subscribers_by_author_ids(
        &self,
        author_ids: &[Uuid],
    ) -> StoreResult<Vec<SubscribedUser>> {
        let tables = self.enter("subscribers_by_author_ids")?;
        let keys: HashSet<Uuid> = author_ids.iter().copied().collect();
        Ok(tables.edges_joined(&keys, |e| e.author_id, |e| e.subscriber_id))
    }

    async fn find_users(
        &self,
        id: Option<Uuid>,
        includes: UserIncludes,
    ) -> StoreResult<Vec<UserGraph>> {
        let tables = self.enter("find_users")?;
        let graphs = tables
            .users
            .iter()
            .filter(|u| id.map_or(true, |id| u.id == id))
            .map(|user| {
                let only_this = HashSet::from([user.id]);
                UserGraph {
                    profile: includes.profile.then(|| {
                        tables
                            .profiles
                            .iter()
                            .find(|p| p.user_id == user.id)
                            .cloned()
                    }),
                    subscribed_to: includes.subscribed_to.then(|| {
                        tables.edges_joined(&only_this, |e| e.subscriber_id, |e| e.author_id)
                    }),
                    subscribers: includes.subscribers.then(|| {
                        tables.edges_joined(&only_this, |e| e.author_id, |e| e.subscriber_id)
                    }),
                    user: user.clone(),
                }
            })
            .collect();
        Ok(graphs)
    }

    async fn list_member_types(&self) -> StoreResult<Vec<MemberType>> {
        Ok(self.enter("list_member_types")?.member_types.clone())
    }

    async fn list_posts(&self) -> StoreResult<Vec<Post>> {
        Ok(self.enter("list_posts")?.posts.clone())
    }

    async fn find_post(&self, id: Uuid) -> StoreResult<Option<Post>> {
        let tables = self.enter("find_post")?;
        Ok(tables.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn list_profiles(&self) -> StoreResult<Vec<Profile>> {
        Ok(self.enter("list_profiles")?.profiles.clone())
    }

    async fn find_profile(&self, id: Uuid) -> StoreResult<Option<Profile>> {
        let tables = self.enter("find_profile")?;
        Ok(tables.profiles.iter().find(|p| p.id == id).cloned())
    }

    async fn create_user(&self, input: CreateUser) -> StoreResult<User> {
        let mut tables = self.enter("create_user")?;
        let user = User {
            id: Uuid::new_v4(),
            name: input.name,
            balance: input.balance,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: Uuid, input: UpdateUser) -> StoreResult<User> {
        let mut tables = self.enter("update_user")?;
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| StoreError::not_found("user", id))?;
        if let Some(name) = input.name {
            user.name = name;
        }
        if let Some(balance) = input.balance {
            user.balance = balance;
        }
        Ok(user.clone())
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.enter("delete_user")?;
        let before = tables.users.len();
        tables.users.retain(|u| u.id != id);
        if tables.users.len() == before {
            return Err(StoreError::not_found("user", id));
        }
        tables.profiles.retain(|p| p.user_id != id);
        tables.posts.retain(|p| p.author_id != id);
        tables
            .subscriptions
            .retain(|e| e.subscriber_id != id && e.author_id != id);
        Ok(())
    }

    async fn create_profile(&self, input: CreateProfile) -> StoreResult<Profile> {
        let mut tables = self.enter("create_profile")?;
        if tables.user(input.user_id).is_none() {
            return Err(StoreError::ForeignKeyViolation {
                entity: "profile",
                detail: format!("user {} does not exist", input.user_id),
            });
        }
        if tables.profiles.iter().any(|p| p.user_id == input.user_id) {
            return Err(StoreError::UniqueViolation {
                entity: "profile",
                detail: format!("user {} already has a profile", input.user_id),
            });
        }
        let profile = Profile {
            id: Uuid::new_v4(),
            is_male: input.is_male,
            year_of_birth: input.year_of_birth,
            user_id: input.user_id,
            member_type_id: input.member_type_id,
        };
        tables.profiles.push(profile.clone());
        Ok(profile)
    }

    async fn update_profile(&self, id: Uuid, input: UpdateProfile) -> StoreResult<Profile> {
        let mut tables = self.enter("update_profile")?;
        let profile = tables
            .profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::not_found("profile", id))?;
        if let Some(is_male) = input.is_male {
            profile.is_male = is_male;
        }
        if let Some(year_of_birth) = input.year_of_birth {
            profile.year_of_birth = year_of_birth;
        }
        if let Some(member_type_id) = input.member_type_id {
            profile.member_type_id = member_type_id;
        }
        Ok(profile.clone())
    }

    async fn delete_profile(&self, id: Uuid) -> StoreResult<Profile> {
        let mut tables = self.enter("delete_profile")?;
        let index = tables
            .profiles
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| StoreError::not_found("profile", id))?;
        Ok(tables.profiles.remove(index))
    }

    async fn create_post(&self, input: CreatePost) -> StoreResult<Post> {
        let mut tables = self.enter("create_post")?;
        if tables.user(input.author_id).is_none() {
            return Err(StoreError::ForeignKeyViolation {
                entity: "post",
                detail: format!("user {} does not exist", input.author_id),
            });
        }
        let post = Post {
            id: Uuid::new_v4(),
            title: input.title,
            content: input.content,
            author_id: input.author_id,
        };
        tables.posts.push(post.clone());
        Ok(post)
    }

    async fn update_post(&self, id: Uuid, input: UpdatePost) -> StoreResult<Post> {
        let mut tables = self.enter("update_post")?;
        let post = tables
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::not_found("post", id))?;
        if let Some(title) = input.title {
            post.title = title;
        }
        if let Some(content) = input.content {
            post.content = content;
        }
        Ok(post.clone())
    }

    async fn delete_post(&self, id: Uuid) -> StoreResult<Post> {
        let mut tables = self.enter("delete_post")?;
        let index = tables
            .posts
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| StoreError::not_found("post", id))?;
        Ok(tables.posts.remove(index))
    }

    async fn subscribe(&self, edge: SubscriptionEdge) -> StoreResult<()> {
        let mut tables = self.enter("subscribe")?;
        for id in [edge.subscriber_id, edge.author_id] {
            if tables.user(id).is_none() {
                return Err(StoreError::ForeignKeyViolation {
                    entity: "subscription",
                    detail: format!("user {} does not exist", id),
                });
            }
        }
        if tables.subscriptions.contains(&edge) {
            return Err(StoreError::UniqueViolation {
                entity: "subscription",
                detail: format!("{} -> {}", edge.subscriber_id, edge.author_id),
            });
        }
        tables.subscriptions.push(edge);
        Ok(())
    }

    async fn unsubscribe(&self, edge: SubscriptionEdge) -> StoreResult<()> {
        let mut tables = self.enter("unsubscribe")?;
        let before = tables.subscriptions.len();
        tables.subscriptions.retain(|e| *e != edge);
        if tables.subscriptions.len() == before {
            return Err(StoreError::not_found(
                "subscription",
                format!("{} -> {}", edge.subscriber_id, edge.author_id),
            ));
        }
        Ok(())
    }
}
