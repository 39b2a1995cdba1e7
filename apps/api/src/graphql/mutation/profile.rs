//! Profile mutations for Trellis GraphQL API

use async_graphql::{Context, ErrorExtensions, InputObject, Object, Result};
use uuid::Uuid;

use crate::graphql::types::{MemberTypeId, Profile};
use crate::models::{CreateProfile, UpdateProfile};
use crate::repositories::SharedStore;

use super::invalidate;

// =============================================================================
// Input Types
// =============================================================================

#[derive(Debug, Clone, InputObject)]
pub struct CreateProfileInput {
    pub is_male: bool,
    pub year_of_birth: i32,
    pub user_id: Uuid,
    pub member_type_id: MemberTypeId,
}

impl From<CreateProfileInput> for CreateProfile {
    fn from(input: CreateProfileInput) -> Self {
        Self {
            is_male: input.is_male,
            year_of_birth: input.year_of_birth,
            user_id: input.user_id,
            member_type_id: input.member_type_id.into(),
        }
    }
}

/// Fields left out keep their stored value; the owner cannot change
#[derive(Debug, Clone, InputObject)]
pub struct ChangeProfileInput {
    pub is_male: Option<bool>,
    pub year_of_birth: Option<i32>,
    pub member_type_id: Option<MemberTypeId>,
}

impl From<ChangeProfileInput> for UpdateProfile {
    fn from(input: ChangeProfileInput) -> Self {
        Self {
            is_male: input.is_male,
            year_of_birth: input.year_of_birth,
            member_type_id: input.member_type_id.map(Into::into),
        }
    }
}

// =============================================================================
// Mutations
// =============================================================================

/// Profile mutations
#[derive(Default)]
pub struct ProfileMutation;

#[Object]
impl ProfileMutation {
    /// Create the profile of a user; a user has at most one
    async fn create_profile(&self, ctx: &Context<'_>, dto: CreateProfileInput) -> Result<Profile> {
        let store = ctx.data::<SharedStore>()?;
        let profile = store
            .create_profile(dto.into())
            .await
            .map_err(|e| e.extend())?;

        invalidate(ctx, |loaders| {
            loaders.profile_by_user.clear(&profile.user_id);
        });
        Ok(profile.into())
    }

    async fn change_profile(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        dto: ChangeProfileInput,
    ) -> Result<Profile> {
        let store = ctx.data::<SharedStore>()?;
        let profile = store
            .update_profile(id, dto.into())
            .await
            .map_err(|e| e.extend())?;

        invalidate(ctx, |loaders| {
            loaders.profile_by_user.clear(&profile.user_id);
        });
        Ok(profile.into())
    }

    async fn delete_profile(&self, ctx: &Context<'_>, id: Uuid) -> Result<String> {
        let store = ctx.data::<SharedStore>()?;
        let profile = store.delete_profile(id).await.map_err(|e| e.extend())?;

        invalidate(ctx, |loaders| {
            loaders.profile_by_user.clear(&profile.user_id);
        });
        Ok("Profile deleted".to_string())
    }
}
