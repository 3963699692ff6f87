use std::collections::HashMap;

use async_trait::async_trait;
use ethers::types::Address;
use serde::{ Deserialize, Serialize };
use uuid::Uuid;

use crate::error::{ AppError, Result };

/// A wallet owner. The signing key is only ever held encrypted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub address: Address,
    pub encrypted_private_key: String,
    /// Bearer token issued by the external authentication service.
    pub api_token: String,
}

/// Lookup of users by id or bearer token. Authentication itself lives
/// outside this crate.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<User>;

    async fn find_by_token(&self, token: &str) -> Result<User>;
}

#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: HashMap<Uuid, User>,
}

impl InMemoryUserDirectory {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: users
                .into_iter()
                .map(|user| (user.id, user))
                .collect(),
        }
    }

    /// Load a JSON array of users.
    pub fn from_file(path: &str) -> Result<Self> {
        let raw = std::fs
            ::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read users file {}: {}", path, e)))?;
        let users: Vec<User> = serde_json
            ::from_str(&raw)
            .map_err(|e| AppError::Config(format!("Invalid users file {}: {}", path, e)))?;

        tracing::info!("Loaded {} users from {}", users.len(), path);
        Ok(Self::new(users))
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_id(&self, id: Uuid) -> Result<User> {
        self.users
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::InvalidInput(format!("User {} not found", id)))
    }

    async fn find_by_token(&self, token: &str) -> Result<User> {
        if token.is_empty() {
            return Err(AppError::Unauthorized);
        }
        self.users
            .values()
            .find(|user| user.api_token == token)
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}
