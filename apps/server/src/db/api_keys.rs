//! Database operations for API keys using SeaORM.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::entity::api_key::{self, ActiveModel as ApiKeyActiveModel, Entity as ApiKeyEntity};
use crate::error::{AppError, AppResult};
use crate::models::ApiKey;

use super::DbPool;

impl DbPool {
    /// Insert a new API key.
    pub async fn insert_api_key(&self, key: &ApiKey) -> AppResult<()> {
        let model = ApiKeyActiveModel {
            id: Set(key.id),
            organization_id: Set(key.organization_id),
            key_hash: Set(key.key_hash.clone()),
            key_prefix: Set(key.key_prefix.clone()),
            name: Set(key.name.clone()),
            expires_at: Set(key.expires_at),
            last_used_at: Set(key.last_used_at),
            created_at: Set(key.created_at),
            revoked_at: Set(key.revoked_at),
        };

        ApiKeyEntity::insert(model)
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert API key: {}", e)))?;

        Ok(())
    }

    /// Find an API key by its hash.
    pub async fn find_api_key_by_hash(&self, key_hash: &str) -> AppResult<Option<ApiKey>> {
        let result = ApiKeyEntity::find()
            .filter(api_key::Column::KeyHash.eq(key_hash))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to query API key: {}", e)))?;

        Ok(result.map(model_to_api_key))
    }

    /// Update last used timestamp.
    pub async fn touch_api_key(&self, id: Uuid) -> AppResult<()> {
        let model = ApiKeyActiveModel {
            id: Set(id),
            last_used_at: Set(Some(Utc::now())),
            ..Default::default()
        };

        model
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update API key: {}", e)))?;

        Ok(())
    }
}

fn model_to_api_key(m: api_key::Model) -> ApiKey {
    ApiKey {
        id: m.id,
        organization_id: m.organization_id,
        key_hash: m.key_hash,
        key_prefix: m.key_prefix,
        name: m.name,
        expires_at: m.expires_at,
        last_used_at: m.last_used_at,
        created_at: m.created_at,
        revoked_at: m.revoked_at,
    }
}
