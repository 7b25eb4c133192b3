//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! ## Architecture
//!
//! The engine owns all in-memory stores; the API layer holds one
//! [`ContractLifecycleManager`] plus the [`TemplateCatalog`] and adds
//! optional Postgres write-through. Reads are served from memory; every
//! mutation is persisted before the handler returns. On startup
//! [`AppState::hydrate_from_db`] reloads the stores and re-seeds the
//! contract number allocator so numbering stays monotonic across
//! restarts.

use consign_engine::{ContractLifecycleManager, ContractNumberAllocator, TemplateCatalog};
use sqlx::PgPool;

use crate::middleware::rate_limit::RateLimitConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP listen port.
    pub port: u16,
    /// Per-user rate limit settings.
    pub rate_limit: RateLimitConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Contract lifecycle orchestrator (contracts, workflows, signatures, audit).
    pub manager: ContractLifecycleManager,
    /// Contract template catalog.
    pub templates: TemplateCatalog,
    /// Optional Postgres pool. `None` means in-memory only.
    pub db_pool: Option<PgPool>,
    /// Application configuration.
    pub config: AppConfig,
}

impl AppState {
    /// Create state with empty stores, default config, and no database.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default(), None)
    }

    /// Create state with the given configuration and optional database pool.
    pub fn with_config(config: AppConfig, db_pool: Option<PgPool>) -> Self {
        Self {
            manager: ContractLifecycleManager::new(),
            templates: TemplateCatalog::new(),
            db_pool,
            config,
        }
    }

    /// Hydrate in-memory stores from the database.
    ///
    /// Called once on startup when a database pool is available. Loads
    /// templates, contracts, workflows, signatures, and the audit trail,
    /// and seeds the contract number allocator from the highest persisted
    /// number per year.
    pub async fn hydrate_from_db(&self) -> Result<(), String> {
        let pool = match &self.db_pool {
            Some(pool) => pool,
            None => return Ok(()),
        };

        let templates = crate::db::templates::load_all(pool)
            .await
            .map_err(|e| format!("failed to load templates: {e}"))?;
        let template_count = templates.len();
        for record in templates {
            self.templates.store().insert(*record.id.as_uuid(), record);
        }

        let contracts = crate::db::contracts::load_all(pool)
            .await
            .map_err(|e| format!("failed to load contracts: {e}"))?;
        let contract_count = contracts.len();
        for record in contracts {
            if let Some((year, seq)) = ContractNumberAllocator::parse(&record.contract_number) {
                self.manager.number_allocator().seed(year, seq);
            }
            self.manager.contracts().insert(*record.id.as_uuid(), record);
        }

        let workflows = crate::db::workflows::load_all(pool)
            .await
            .map_err(|e| format!("failed to load workflows: {e}"))?;
        let workflow_count = workflows.len();
        for record in workflows {
            self.manager
                .workflow_engine()
                .store()
                .insert(*record.id.as_uuid(), record);
        }

        let signatures = crate::db::signatures::load_all(pool)
            .await
            .map_err(|e| format!("failed to load signatures: {e}"))?;
        let signature_count = signatures.len();
        for record in signatures {
            self.manager
                .signature_tracker()
                .store()
                .insert(*record.id.as_uuid(), record);
        }

        // Audit entries arrive in chain order (persisted sequence).
        let audit_entries = crate::db::audit::load_all(pool)
            .await
            .map_err(|e| format!("failed to load audit log: {e}"))?;
        let audit_count = audit_entries.len();
        self.manager.audit().restore(audit_entries);
        if !self.manager.audit().verify_chain() {
            tracing::error!(
                "audit hash chain verification failed after hydration; \
                 investigate: the persisted log may have been tampered with"
            );
        }

        tracing::info!(
            templates = template_count,
            contracts = contract_count,
            workflows = workflow_count,
            signatures = signature_count,
            audit_entries = audit_count,
            "Hydrated in-memory stores from database"
        );

        Ok(())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
