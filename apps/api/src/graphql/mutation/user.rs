//! User mutations for Trellis GraphQL API
//!
//! This module provides mutations for users:
//! - createUser: Create a user
//! - changeUser: Update name and/or balance
//! - deleteUser: Delete a user

use async_graphql::{Context, ErrorExtensions, InputObject, Object, Result};
use uuid::Uuid;

use crate::graphql::types::User;
use crate::models::{CreateUser, UpdateUser};
use crate::repositories::SharedStore;

use super::invalidate;

// =============================================================================
// Input Types
// =============================================================================

#[derive(Debug, Clone, InputObject)]
pub struct CreateUserInput {
    pub name: String,
    pub balance: f64,
}

impl From<CreateUserInput> for CreateUser {
    fn from(input: CreateUserInput) -> Self {
        Self {
            name: input.name,
            balance: input.balance,
        }
    }
}

/// Fields left out keep their stored value
#[derive(Debug, Clone, InputObject)]
pub struct ChangeUserInput {
    pub name: Option<String>,
    pub balance: Option<f64>,
}

impl From<ChangeUserInput> for UpdateUser {
    fn from(input: ChangeUserInput) -> Self {
        Self {
            name: input.name,
            balance: input.balance,
        }
    }
}

// =============================================================================
// Mutations
// =============================================================================

/// User mutations
#[derive(Default)]
pub struct UserMutation;

#[Object]
impl UserMutation {
    async fn create_user(&self, ctx: &Context<'_>, dto: CreateUserInput) -> Result<User> {
        let store = ctx.data::<SharedStore>()?;
        let user = store.create_user(dto.into()).await.map_err(|e| e.extend())?;

        tracing::info!(user_id = %user.id, "User created");
        Ok(user.into())
    }

    async fn change_user(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        dto: ChangeUserInput,
    ) -> Result<User> {
        let store = ctx.data::<SharedStore>()?;
        let user = store
            .update_user(id, dto.into())
            .await
            .map_err(|e| e.extend())?;

        invalidate(ctx, |loaders| loaders.user_changed(id));
        Ok(user.into())
    }

    async fn delete_user(&self, ctx: &Context<'_>, id: Uuid) -> Result<String> {
        let store = ctx.data::<SharedStore>()?;
        store.delete_user(id).await.map_err(|e| e.extend())?;

        // Dependents may be gone with the user
        invalidate(ctx, |loaders| loaders.forget_user(id));
        tracing::info!(user_id = %id, "User deleted");
        Ok("User deleted".to_string())
    }
}
