//! MongoDB-backed store.
//!
//! Users and pulses live in two collections keyed by their client-side
//! `id` field (unique index). The Mongo `_id` is left to the server and
//! ignored on read.

use async_trait::async_trait;
use bson::{doc, Document};
use futures_util::StreamExt;
use mongodb::{
    error::{ErrorKind, WriteFailure},
    options::IndexOptions,
    Client, Collection, IndexModel,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, info};

use aura_core::{Pulse, UserProfile};

use crate::error::{Result, StoreError};
use crate::traits::PulseStore;

/// Database used when none is configured.
pub const DEFAULT_DATABASE: &str = "AuraDB";
/// Collection holding user profiles.
pub const USERS_COLLECTION: &str = "Users";
/// Collection holding pulses.
pub const PULSES_COLLECTION: &str = "Pulses";

const DUPLICATE_KEY: i32 = 11000;
/// Fail fast instead of hanging on an unreachable server.
const TIMEOUT_OPTIONS: [(&str, u32); 2] = [("serverSelectionTimeoutMS", 3000), ("connectTimeoutMS", 3000)];

/// Store backed by a MongoDB database.
#[derive(Clone)]
pub struct MongoStore {
    users: Collection<UserProfile>,
    pulses: Collection<Pulse>,
}

impl MongoStore {
    /// Connect, verify with a ping and ensure the id indexes exist.
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self> {
        info!("Connecting to MongoDB at {}", redact(uri));

        let timeout_uri = with_timeouts(uri);
        let client = Client::with_uri_str(&timeout_uri)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Failed to connect to MongoDB: {}", e)))?;

        let db = client.database(db_name);
        db.run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| StoreError::Unavailable(format!("MongoDB ping failed: {}", e)))?;

        let store = Self {
            users: db.collection(USERS_COLLECTION),
            pulses: db.collection(PULSES_COLLECTION),
        };
        store.apply_indexes().await?;

        info!("Connected to MongoDB database '{}'", db_name);
        Ok(store)
    }

    async fn apply_indexes(&self) -> Result<()> {
        self.users.create_index(unique_id_index()).await?;
        self.pulses.create_index(unique_id_index()).await?;
        self.pulses
            .create_index(IndexModel::builder().keys(doc! { "timestamp": -1 }).build())
            .await?;
        Ok(())
    }
}

fn unique_id_index() -> IndexModel {
    IndexModel::builder()
        .keys(doc! { "id": 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

fn by_id(id: &str) -> Document {
    doc! { "id": id }
}

/// Drain a cursor, skipping documents that fail to decode.
async fn collect<T>(cursor: mongodb::Cursor<T>) -> Vec<T>
where
    T: DeserializeOwned + Serialize + Unpin + Send + Sync,
{
    cursor
        .filter_map(|item| async {
            match item {
                Ok(doc) => Some(doc),
                Err(e) => {
                    error!("Error reading document: {}", e);
                    None
                }
            }
        })
        .collect()
        .await
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        *err.kind,
        ErrorKind::Write(WriteFailure::WriteError(ref we)) if we.code == DUPLICATE_KEY
    )
}

/// Add the fail-fast timeouts to a connection string, keeping any the
/// caller already set. Option names are matched case-insensitively.
fn with_timeouts(uri: &str) -> String {
    let mut out = uri.to_string();
    let query = uri.split_once('?').map(|(_, q)| q.to_ascii_lowercase()).unwrap_or_default();
    for (name, ms) in TIMEOUT_OPTIONS {
        let set = query
            .split('&')
            .any(|pair| pair.split('=').next() == Some(name.to_ascii_lowercase().as_str()));
        if set {
            continue;
        }
        if !out.contains('?') {
            // Options must follow a path separator after the host list.
            let hosts = out.split_once("://").map_or(out.as_str(), |(_, rest)| rest);
            if !hosts.contains('/') {
                out.push('/');
            }
            out.push('?');
        } else if !out.ends_with('?') && !out.ends_with('&') {
            out.push('&');
        }
        out.push_str(&format!("{}={}", name, ms));
    }
    out
}

/// Hide credentials embedded in a connection string.
fn redact(uri: &str) -> String {
    match (uri.find("://"), uri.rfind('@')) {
        (Some(scheme), Some(at)) if at > scheme => {
            format!("{}://***{}", &uri[..scheme], &uri[at..])
        }
        _ => uri.to_string(),
    }
}

#[async_trait]
impl PulseStore for MongoStore {
    fn name(&self) -> &str {
        "mongodb"
    }

    async fn get_users(&self) -> Result<Vec<UserProfile>> {
        let cursor = self.users.find(doc! {}).await?;
        Ok(collect(cursor).await)
    }

    async fn get_pulses(&self) -> Result<Vec<Pulse>> {
        let cursor = self
            .pulses
            .find(doc! {})
            .sort(doc! { "timestamp": -1 })
            .await?;
        Ok(collect(cursor).await)
    }

    async fn save_user(&self, user: &UserProfile) -> Result<()> {
        self.users
            .replace_one(by_id(&user.id), user)
            .upsert(true)
            .await?;
        debug!(user_id = %user.id, "User upserted");
        Ok(())
    }

    async fn save_pulse(&self, pulse: &Pulse) -> Result<()> {
        match self.pulses.insert_one(pulse).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(StoreError::Duplicate(pulse.id.clone())),
            Err(e) => Err(e.into()),
        }
    }

    async fn resonate_pulse(&self, pulse_id: &str, acting_user_id: &str) -> Result<Option<u32>> {
        let Some(mut pulse) = self.pulses.find_one(by_id(pulse_id)).await? else {
            return Ok(None);
        };
        pulse.resonate();
        self.pulses.replace_one(by_id(pulse_id), &pulse).await?;

        debug!(
            pulse_id,
            acting_user_id,
            resonance = pulse.resonance_count,
            "Pulse resonated"
        );
        Ok(Some(pulse.resonance_count))
    }
}
