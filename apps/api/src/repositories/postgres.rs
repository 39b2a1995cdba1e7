//! PostgreSQL store
//!
//! Key-set fetches use `= ANY($1)` so a whole batch window is served by a
//! single statement. The eager-join root fetch runs the root query and one
//! key-set query per requested relation.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::utils::{
    map_db_error, MEMBER_TYPE_COLUMNS, POST_COLUMNS, PROFILE_COLUMNS, SUBSCRIBED_USER_COLUMNS,
    USER_COLUMNS,
};
use super::{Store, StoreError, StoreResult};
use crate::models::{
    CreatePost, CreateProfile, CreateUser, MemberType, MemberTypeId, Post, Profile,
    SubscribedUser, SubscriptionEdge, UpdatePost, UpdateProfile, UpdateUser, User, UserGraph,
    UserIncludes,
};

/// Store backed by a shared PostgreSQL pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a new PgStore instance
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Group edge records by the key they were matched on
fn group_edges(
    records: Vec<SubscribedUser>,
    key_of: impl Fn(&SubscribedUser) -> Uuid,
) -> HashMap<Uuid, Vec<SubscribedUser>> {
    let mut grouped: HashMap<Uuid, Vec<SubscribedUser>> = HashMap::new();
    for record in records {
        grouped.entry(key_of(&record)).or_default().push(record);
    }
    grouped
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn users_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = ANY($1)", USER_COLUMNS);
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn profiles_by_user_ids(&self, user_ids: &[Uuid]) -> StoreResult<Vec<Profile>> {
        let sql = format!(
            "SELECT {} FROM profiles WHERE user_id = ANY($1)",
            PROFILE_COLUMNS
        );
        let profiles = sqlx::query_as::<_, Profile>(&sql)
            .bind(user_ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(profiles)
    }

    async fn posts_by_author_ids(&self, author_ids: &[Uuid]) -> StoreResult<Vec<Post>> {
        let sql = format!(
            "SELECT {} FROM posts WHERE author_id = ANY($1) ORDER BY title ASC",
            POST_COLUMNS
        );
        let posts = sqlx::query_as::<_, Post>(&sql)
            .bind(author_ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(posts)
    }

    async fn member_types_by_ids(&self, ids: &[MemberTypeId]) -> StoreResult<Vec<MemberType>> {
        let ids: Vec<&str> = ids.iter().map(MemberTypeId::as_str).collect();
        let sql = format!(
            "SELECT {} FROM member_types WHERE id = ANY($1)",
            MEMBER_TYPE_COLUMNS
        );
        let member_types = sqlx::query_as::<_, MemberType>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(member_types)
    }

    async fn authors_by_subscriber_ids(
        &self,
        subscriber_ids: &[Uuid],
    ) -> StoreResult<Vec<SubscribedUser>> {
        let sql = format!(
            r#"SELECT {} FROM subscribers_on_authors s
            JOIN users u ON u.id = s.author_id
            WHERE s.subscriber_id = ANY($1)"#,
            SUBSCRIBED_USER_COLUMNS
        );
        let records = sqlx::query_as::<_, SubscribedUser>(&sql)
            .bind(subscriber_ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    async fn subscribers_by_author_ids(
        &self,
        author_ids: &[Uuid],
    ) -> StoreResult<Vec<SubscribedUser>> {
        let sql = format!(
            r#"SELECT {} FROM subscribers_on_authors s
            JOIN users u ON u.id = s.subscriber_id
            WHERE s.author_id = ANY($1)"#,
            SUBSCRIBED_USER_COLUMNS
        );
        let records = sqlx::query_as::<_, SubscribedUser>(&sql)
            .bind(author_ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    async fn find_users(
        &self,
        id: Option<Uuid>,
        includes: UserIncludes,
    ) -> StoreResult<Vec<UserGraph>> {
        let users = match id {
            Some(id) => self.users_by_ids(&[id]).await?,
            None => {
                let sql = format!("SELECT {} FROM users ORDER BY name ASC", USER_COLUMNS);
                sqlx::query_as::<_, User>(&sql)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        if includes.is_empty() || users.is_empty() {
            return Ok(users.into_iter().map(UserGraph::bare).collect());
        }

        let ids: Vec<Uuid> = users.iter().map(|u| u.id).collect();

        let mut profiles: Option<HashMap<Uuid, Profile>> = None;
        if includes.profile {
            let rows = self.profiles_by_user_ids(&ids).await?;
            profiles = Some(rows.into_iter().map(|p| (p.user_id, p)).collect());
        }

        let mut subscribed_to = None;
        if includes.subscribed_to {
            let rows = self.authors_by_subscriber_ids(&ids).await?;
            subscribed_to = Some(group_edges(rows, |r| r.edge.subscriber_id));
        }

        let mut subscribers = None;
        if includes.subscribers {
            let rows = self.subscribers_by_author_ids(&ids).await?;
            subscribers = Some(group_edges(rows, |r| r.edge.author_id));
        }

        Ok(users
            .into_iter()
            .map(|user| UserGraph {
                profile: profiles.as_mut().map(|p| p.remove(&user.id)),
                subscribed_to: subscribed_to
                    .as_mut()
                    .map(|s| s.remove(&user.id).unwrap_or_default()),
                subscribers: subscribers
                    .as_mut()
                    .map(|s| s.remove(&user.id).unwrap_or_default()),
                user,
            })
            .collect())
    }

    async fn list_member_types(&self) -> StoreResult<Vec<MemberType>> {
        let sql = format!(
            "SELECT {} FROM member_types ORDER BY id ASC",
            MEMBER_TYPE_COLUMNS
        );
        let member_types = sqlx::query_as::<_, MemberType>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(member_types)
    }

    async fn list_posts(&self) -> StoreResult<Vec<Post>> {
        let sql = format!("SELECT {} FROM posts ORDER BY title ASC", POST_COLUMNS);
        let posts = sqlx::query_as::<_, Post>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(posts)
    }

    async fn find_post(&self, id: Uuid) -> StoreResult<Option<Post>> {
        let sql = format!("SELECT {} FROM posts WHERE id = $1", POST_COLUMNS);
        let post = sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(post)
    }

    async fn list_profiles(&self) -> StoreResult<Vec<Profile>> {
        let sql = format!("SELECT {} FROM profiles", PROFILE_COLUMNS);
        let profiles = sqlx::query_as::<_, Profile>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(profiles)
    }

    async fn find_profile(&self, id: Uuid) -> StoreResult<Option<Profile>> {
        let sql = format!("SELECT {} FROM profiles WHERE id = $1", PROFILE_COLUMNS);
        let profile = sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    async fn create_user(&self, input: CreateUser) -> StoreResult<User> {
        let sql = format!(
            "INSERT INTO users (id, name, balance) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(input.name)
            .bind(input.balance)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_error("user", e))
    }

    async fn update_user(&self, id: Uuid, input: UpdateUser) -> StoreResult<User> {
        let sql = format!(
            r#"UPDATE users SET
                name = COALESCE($2, name),
                balance = COALESCE($3, balance)
            WHERE id = $1
            RETURNING {}"#,
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(input.name)
            .bind(input.balance)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error("user", e))?
            .ok_or_else(|| StoreError::not_found("user", id))
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error("user", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("user", id));
        }
        Ok(())
    }

    async fn create_profile(&self, input: CreateProfile) -> StoreResult<Profile> {
        let sql = format!(
            r#"INSERT INTO profiles (id, is_male, year_of_birth, user_id, member_type_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}"#,
            PROFILE_COLUMNS
        );
        sqlx::query_as::<_, Profile>(&sql)
            .bind(Uuid::new_v4())
            .bind(input.is_male)
            .bind(input.year_of_birth)
            .bind(input.user_id)
            .bind(input.member_type_id.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_error("profile", e))
    }

    async fn update_profile(&self, id: Uuid, input: UpdateProfile) -> StoreResult<Profile> {
        let sql = format!(
            r#"UPDATE profiles SET
                is_male = COALESCE($2, is_male),
                year_of_birth = COALESCE($3, year_of_birth),
                member_type_id = COALESCE($4, member_type_id)
            WHERE id = $1
            RETURNING {}"#,
            PROFILE_COLUMNS
        );
        sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .bind(input.is_male)
            .bind(input.year_of_birth)
            .bind(input.member_type_id.map(|m| m.as_str()))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error("profile", e))?
            .ok_or_else(|| StoreError::not_found("profile", id))
    }

    async fn delete_profile(&self, id: Uuid) -> StoreResult<Profile> {
        let sql = format!("DELETE FROM profiles WHERE id = $1 RETURNING {}", PROFILE_COLUMNS);
        sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error("profile", e))?
            .ok_or_else(|| StoreError::not_found("profile", id))
    }

    async fn create_post(&self, input: CreatePost) -> StoreResult<Post> {
        let sql = format!(
            r#"INSERT INTO posts (id, title, content, author_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {}"#,
            POST_COLUMNS
        );
        sqlx::query_as::<_, Post>(&sql)
            .bind(Uuid::new_v4())
            .bind(input.title)
            .bind(input.content)
            .bind(input.author_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_error("post", e))
    }

    async fn update_post(&self, id: Uuid, input: UpdatePost) -> StoreResult<Post> {
        let sql = format!(
            r#"UPDATE posts SET
                title = COALESCE($2, title),
                content = COALESCE($3, content)
            WHERE id = $1
            RETURNING {}"#,
            POST_COLUMNS
        );
        sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .bind(input.title)
            .bind(input.content)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error("post", e))?
            .ok_or_else(|| StoreError::not_found("post", id))
    }

    async fn delete_post(&self, id: Uuid) -> StoreResult<Post> {
        let sql = format!("DELETE FROM posts WHERE id = $1 RETURNING {}", POST_COLUMNS);
        sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error("post", e))?
            .ok_or_else(|| StoreError::not_found("post", id))
    }

    async fn subscribe(&self, edge: SubscriptionEdge) -> StoreResult<()> {
        sqlx::query("INSERT INTO subscribers_on_authors (subscriber_id, author_id) VALUES ($1, $2)")
            .bind(edge.subscriber_id)
            .bind(edge.author_id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error("subscription", e))?;
        Ok(())
    }

    async fn unsubscribe(&self, edge: SubscriptionEdge) -> StoreResult<()> {
        let result = sqlx::query(
            "DELETE FROM subscribers_on_authors WHERE subscriber_id = $1 AND author_id = $2",
        )
        .bind(edge.subscriber_id)
        .bind(edge.author_id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error("subscription", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(
                "subscription",
                format!("{} -> {}", edge.subscriber_id, edge.author_id),
            ));
        }
        Ok(())
    }
}
