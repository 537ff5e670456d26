//! The storage coordinator.
//!
//! [`StorageService`] is built once at startup and shared behind an `Arc`.
//! It owns the database handle, every typed store, the entity hierarchy, the
//! reference validator, the back-reference registry and the device-type
//! cache with its refresher.

use crate::config::{DatabaseConfig, FirmwareServiceConfig, StorageConfig};
use crate::device_types::{DeviceTypeCache, DeviceTypeRefresher, FirmwareClient};
use crate::hierarchy::{EntityHierarchy, DEFAULT_ROOT_NAME};
use crate::in_use::CrossReferences;
use crate::stores::Stores;
use crate::validator::ReferenceValidator;
use crate::{Database, StorageError, StorageResult};
use fleetprov_model::{DeviceConfiguration, DomainObject, Entity, ObjectInfo, PRIMARY_KEY};
use fleetprov_types::ObjectId;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Description given to the root created at startup.
pub const ROOT_DESCRIPTION: &str = "This is a top-level entry and cannot be deleted.";

pub struct StorageService {
    db: Database,
    stores: Stores,
    hierarchy: EntityHierarchy,
    validator: ReferenceValidator,
    refs: CrossReferences,
    device_types: DeviceTypeCache,
    refresher: Mutex<Option<DeviceTypeRefresher>>,
}

impl StorageService {
    /// Opens the database, creates missing tables and makes sure the root
    /// entity exists.
    pub fn open(config: &DatabaseConfig) -> StorageResult<Self> {
        let db = match &config.path {
            Some(path) => Database::open(path, config.busy_timeout())?,
            None => Database::open_in_memory()?,
        };
        Self::with_database(db)
    }

    pub fn with_database(db: Database) -> StorageResult<Self> {
        let stores = Stores::new(&db)?;
        stores.create_tables(&db)?;
        let refs = stores.cross_references(&db);
        let validator = stores.reference_validator();
        let hierarchy = EntityHierarchy::new(stores.entities.clone(), refs.clone());

        let service = Self {
            db,
            stores,
            hierarchy,
            validator,
            refs,
            device_types: DeviceTypeCache::new(),
            refresher: Mutex::new(None),
        };
        service.ensure_root()?;
        info!(
            prefixes = ?service.validator.prefixes().collect::<Vec<_>>(),
            "provisioning storage ready"
        );
        Ok(service)
    }

    /// [`StorageService::open`], then the device-type refresher if a firmware
    /// service is configured.
    pub async fn start(config: &StorageConfig) -> StorageResult<Self> {
        let service = Self::open(&config.database)?;
        if let Some(firmware) = &config.firmware {
            service.start_refresher(firmware).await?;
        }
        Ok(service)
    }

    /// Starts the refresher unless one is already running.
    pub async fn start_refresher(&self, config: &FirmwareServiceConfig) -> StorageResult<()> {
        let client = FirmwareClient::new(config)
            .map_err(|e| StorageError::StorageUnavailable(e.to_string()))?;
        let mut slot = self.refresher.lock().await;
        if slot.is_none() {
            *slot = Some(DeviceTypeRefresher::spawn(
                client,
                self.device_types.clone(),
                config.into(),
            ));
        }
        Ok(())
    }

    /// Stops the refresher and waits for it. Safe to call more than once.
    pub async fn stop(&self) {
        let refresher = self.refresher.lock().await.take();
        if let Some(refresher) = refresher {
            refresher.stop().await;
        }
    }

    fn ensure_root(&self) -> StorageResult<()> {
        if self.hierarchy.root_exists()? {
            return Ok(());
        }
        let root = Entity {
            info: ObjectInfo {
                name: DEFAULT_ROOT_NAME.to_string(),
                description: ROOT_DESCRIPTION.to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        match self.hierarchy.create_root(root) {
            Ok(_) | Err(StorageError::RootAlreadyExists) => Ok(()),
            Err(e) => Err(e),
        }
    }

    // ── Accessors ────────────────────────────────────────────────

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    pub fn hierarchy(&self) -> &EntityHierarchy {
        &self.hierarchy
    }

    pub fn validator(&self) -> &ReferenceValidator {
        &self.validator
    }

    pub fn cross_references(&self) -> &CrossReferences {
        &self.refs
    }

    pub fn device_types(&self) -> &DeviceTypeCache {
        &self.device_types
    }

    pub fn is_acceptable_device_type(&self, device_type: &str) -> bool {
        self.device_types.is_acceptable(device_type)
    }

    pub fn are_acceptable_device_types<S: AsRef<str>>(
        &self,
        device_types: &[S],
        wildcard_allowed: bool,
    ) -> bool {
        self.device_types.are_acceptable(device_types, wildcard_allowed)
    }

    // ── Device configurations ────────────────────────────────────

    fn check_configuration(&self, config: &DeviceConfiguration) -> StorageResult<()> {
        if let Some(policy) = config.management_policy {
            let policies = &self.stores.policies;
            if !policies.exists(PRIMARY_KEY, &policy.to_string())? {
                return Err(StorageError::unknown_reference(policies.prefix(), policy));
            }
        }
        if let Some(bad) = config
            .device_types
            .iter()
            .find(|t| !self.are_acceptable_device_types(&[t.as_str()], true))
        {
            return Err(StorageError::UnacceptableDeviceType(bad.clone()));
        }
        Ok(())
    }

    /// Creates a device configuration after checking its policy and device
    /// types. The policy's in-use set gains the configuration.
    pub fn create_configuration(
        &self,
        mut config: DeviceConfiguration,
    ) -> StorageResult<DeviceConfiguration> {
        self.check_configuration(&config)?;
        let configurations = &self.stores.configurations;
        self.db.transaction(|conn| {
            config.info.stamp_new();
            config.in_use.clear();
            configurations.create_in(conn, &config)?;
            if let Some(policy) = config.management_policy {
                self.refs.add_back_reference_in(
                    conn,
                    self.stores.policies.prefix(),
                    policy,
                    configurations.prefix(),
                    config.id(),
                )?;
            }
            Ok(config)
        })
    }

    /// Replaces a device configuration, moving the policy back-reference if
    /// the policy changed.
    pub fn update_configuration(
        &self,
        id: ObjectId,
        mut config: DeviceConfiguration,
    ) -> StorageResult<DeviceConfiguration> {
        self.check_configuration(&config)?;
        let configurations = &self.stores.configurations;
        let policy_prefix = self.stores.policies.prefix();
        self.db.transaction(|conn| {
            let existing = configurations.require_in(conn, id)?;
            let incoming_notes = std::mem::take(&mut config.info.notes);
            config.info.id = id;
            config.info.created = existing.info.created;
            config.info.notes = existing.info.notes.clone();
            config.info.prepend_notes(incoming_notes);
            config.info.touch();
            config.in_use = existing.in_use.clone();

            if existing.management_policy != config.management_policy {
                if let Some(old) = existing.management_policy {
                    if !self.refs.remove_back_reference_in(
                        conn,
                        policy_prefix,
                        old,
                        configurations.prefix(),
                        id,
                    )? {
                        warn!(%id, policy = %old, "previous policy of configuration is missing");
                    }
                }
                if let Some(new) = config.management_policy {
                    self.refs.add_back_reference_in(
                        conn,
                        policy_prefix,
                        new,
                        configurations.prefix(),
                        id,
                    )?;
                }
            }
            configurations.rewrite_in(conn, &config)?;
            Ok(config)
        })
    }

    /// Deletes an unreferenced device configuration and its policy
    /// back-reference.
    pub fn delete_configuration(&self, id: ObjectId) -> StorageResult<()> {
        let configurations = &self.stores.configurations;
        self.db.transaction(|conn| {
            let existing = configurations.require_in(conn, id)?;
            if !existing.in_use.is_empty() {
                return Err(StorageError::StillInUse(id));
            }
            configurations.delete_in(conn, PRIMARY_KEY, &id.to_string())?;
            if let Some(policy) = existing.management_policy {
                self.refs.remove_back_reference_in(
                    conn,
                    self.stores.policies.prefix(),
                    policy,
                    configurations.prefix(),
                    id,
                )?;
            }
            Ok(())
        })
    }
}
