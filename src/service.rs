//! Contact request handling.
//!
//! Reads come straight from the [`ContactCache`]. Every mutation runs the full
//! cycle against the backend:
//!
//! 1. connect
//! 2. apply the single save or delete through the [`ContactGateway`]
//! 3. resync: fetch the whole collection and swap it into the mirror
//! 4. disconnect
//!
//! A failure at any step stops the cycle where it is. The connection is not
//! closed and the mirror is not rolled back, so it stays stale until the next
//! successful cycle.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::cache::{ContactCache, MirrorSnapshot};
use crate::config::MutationPolicy;
use crate::error::{AppError, AppResult};
use crate::gateway::{ContactGateway, GatewayError, GatewayResult};
use crate::model::{ContactRecord, CreateContactRequest, UpdateContactRequest};

pub const CONTACT_ADDED: &str = "Contact added";
pub const CONTACT_UPDATED: &str = "Contact updated";
pub const CONTACT_DELETED: &str = "Contact successfully deleted";

const ADD_FAILED: &str = "Failed to add contact";
const UPDATE_FAILED: &str = "Failed to update contact";
const DELETE_FAILED: &str = "Failed to delete contact";

const CONTACT_MISSING: &str = "That contact does not exist";
const UPDATE_TARGET_MISSING: &str = "Contact could not be found";
const DELETE_TARGET_MISSING: &str = "That resource id does not exist in the database";

enum Mutation {
    Save(ContactRecord),
    Delete(ContactRecord),
}

pub struct ContactService {
    gateway: ContactGateway,
    cache: Arc<ContactCache>,
    policy: MutationPolicy,
    cycle_lock: Mutex<()>,
}

impl ContactService {
    pub fn new(gateway: ContactGateway, cache: Arc<ContactCache>, policy: MutationPolicy) -> Self {
        Self {
            gateway,
            cache,
            policy,
            cycle_lock: Mutex::new(()),
        }
    }

    pub fn cache(&self) -> &Arc<ContactCache> {
        &self.cache
    }

    /// Full sync outside any mutation: connect, fetch, replace, disconnect.
    ///
    /// Runs once at startup. Returns the number of contacts mirrored.
    pub async fn sync(&self) -> GatewayResult<usize> {
        let _guard = self.lock_cycle().await;
        self.gateway.connect().await?;
        let count = self.resync().await?;
        self.gateway.disconnect().await?;
        Ok(count)
    }

    pub async fn list_all(&self) -> MirrorSnapshot {
        self.cache.snapshot().await
    }

    pub async fn get_by_id(&self, raw_id: &str) -> AppResult<ContactRecord> {
        let Some(resource_id) = parse_resource_id(raw_id) else {
            return Err(AppError::not_found(CONTACT_MISSING));
        };

        self.cache
            .find_by_resource_id(resource_id)
            .await
            .ok_or_else(|| AppError::not_found(CONTACT_MISSING))
    }

    /// Adds a contact, or overwrites the number of the contact already
    /// carrying that name.
    pub async fn create(&self, payload: CreateContactRequest) -> AppResult<&'static str> {
        let _guard = self.lock_cycle().await;

        let name = payload.name.unwrap_or_default();
        let number = payload.number.unwrap_or_default();

        let record = match self.cache.find_by_name(&name).await {
            Some(mut existing) => {
                debug!(name = %name, resource_id = existing.resource_id, "create matched existing contact by name");
                existing.number = number;
                existing
            }
            None => {
                let Some(resource_id) = self.cache.next_id().await else {
                    let err =
                        GatewayError::validation("resourceId", "no resource id left to assign");
                    error!(error = %err, "error adding contact");
                    return Err(AppError::operation(ADD_FAILED, err));
                };
                ContactRecord::new(name, number, resource_id)
            }
        };

        self.run_cycle(Mutation::Save(record))
            .await
            .map_err(|err| {
                error!(error = %err, "error adding contact");
                AppError::operation(ADD_FAILED, err)
            })?;

        Ok(CONTACT_ADDED)
    }

    pub async fn update(
        &self,
        raw_id: &str,
        payload: UpdateContactRequest,
    ) -> AppResult<&'static str> {
        let _guard = self.lock_cycle().await;

        let mut record = self
            .resolve(raw_id)
            .await
            .ok_or_else(|| AppError::not_found(UPDATE_TARGET_MISSING))?;
        record.number = payload.number.unwrap_or_default();

        self.run_cycle(Mutation::Save(record))
            .await
            .map_err(|err| {
                error!(error = %err, "error updating contact");
                AppError::operation(UPDATE_FAILED, err)
            })?;

        Ok(CONTACT_UPDATED)
    }

    pub async fn remove(&self, raw_id: &str) -> AppResult<&'static str> {
        let _guard = self.lock_cycle().await;

        let record = self
            .resolve(raw_id)
            .await
            .ok_or_else(|| AppError::not_found(DELETE_TARGET_MISSING))?;

        self.run_cycle(Mutation::Delete(record))
            .await
            .map_err(|err| {
                error!(error = %err, "error deleting contact");
                AppError::operation(DELETE_FAILED, err)
            })?;

        Ok(CONTACT_DELETED)
    }

    async fn resolve(&self, raw_id: &str) -> Option<ContactRecord> {
        let resource_id = parse_resource_id(raw_id)?;
        self.cache.find_by_resource_id(resource_id).await
    }

    async fn lock_cycle(&self) -> Option<tokio::sync::MutexGuard<'_, ()>> {
        match self.policy {
            MutationPolicy::Serialized => Some(self.cycle_lock.lock().await),
            MutationPolicy::Unserialized => None,
        }
    }

    async fn run_cycle(&self, mutation: Mutation) -> GatewayResult<()> {
        self.gateway.connect().await?;

        match mutation {
            Mutation::Save(record) => {
                let saved = self.gateway.save(record).await?;
                info!(resource_id = saved.resource_id, "contact saved");
            }
            Mutation::Delete(record) => {
                self.gateway.delete(&record).await?;
                info!(resource_id = record.resource_id, "contact deleted");
            }
        }

        self.resync().await?;
        self.gateway.disconnect().await
    }

    async fn resync(&self) -> GatewayResult<usize> {
        let records = self.gateway.find_all().await?;
        let count = records.len();
        self.cache.replace(records).await;
        info!(contacts = count, "contacts synced from store");
        Ok(count)
    }
}

/// Resource ids in paths are plain integers; anything else addresses nothing.
pub fn parse_resource_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}
