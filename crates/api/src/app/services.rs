//! Store/provider wiring for the HTTP layer.

use std::sync::Arc;

use atrium_auth::{PasswordHasher, PermissionThresholds, SessionCodec};
use atrium_core::{EmailAddress, RoleId, UserId};
use atrium_directory::{
    AccountService, DirectoryStore, NewUser, Role, RoleStore, UserAdminService,
};
use atrium_forum::{CatalogStore, ContentStore, ForumService};
use atrium_infra::{
    Argon2PasswordHasher, MemoryCatalogStore, MemoryContentStore, MemoryDirectoryStore,
    MemoryRoleStore,
};
use atrium_realtime::{BroadcastHub, RealtimeNotifier};

use crate::config::ApiConfig;

/// Shared services for the HTTP layer.
pub struct AppServices {
    pub sessions: Arc<SessionCodec>,
    pub directory: Arc<dyn DirectoryStore>,
    pub hub: Arc<BroadcastHub>,
    pub notifier: Arc<dyn RealtimeNotifier>,
    pub admin: UserAdminService,
    pub accounts: AccountService,
    pub forum: ForumService,
}

pub async fn build_services(config: &ApiConfig) -> AppServices {
    if config.use_persistent {
        #[cfg(feature = "postgres")]
        {
            return build_postgres_services(config).await;
        }
        #[cfg(not(feature = "postgres"))]
        tracing::warn!(
            "USE_PERSISTENT_STORES=true but the postgres feature is not enabled, \
             falling back to in-memory stores"
        );
    }

    build_memory_services(config).await
}

fn build_memory_stores() -> (
    Arc<dyn DirectoryStore>,
    Arc<dyn RoleStore>,
    Arc<dyn CatalogStore>,
    Arc<dyn ContentStore>,
) {
    let roles = Arc::new(MemoryRoleStore::new());
    let directory = Arc::new(MemoryDirectoryStore::new(roles.clone()));
    let catalog = Arc::new(MemoryCatalogStore::new());
    let content = Arc::new(MemoryContentStore::new(
        directory.clone(),
        catalog.clone(),
        roles.clone(),
    ));
    (directory, roles, catalog, content)
}

async fn build_memory_services(config: &ApiConfig) -> AppServices {
    let (directory, roles, catalog, content) = build_memory_stores();
    assemble(config, directory, roles, catalog, content).await
}

#[cfg(feature = "postgres")]
async fn build_postgres_services(config: &ApiConfig) -> AppServices {
    use atrium_infra::postgres::{PgCatalogStore, PgContentStore, PgDirectoryStore, PgRoleStore};
    use sqlx::PgPool;

    let database_url = config
        .database_url
        .clone()
        .expect("DATABASE_URL must be set when USE_PERSISTENT_STORES=true");
    let pool = PgPool::connect(&database_url)
        .await
        .expect("failed to connect to Postgres");

    let directory: Arc<dyn DirectoryStore> = Arc::new(PgDirectoryStore::new(pool.clone()));
    let roles: Arc<dyn RoleStore> = Arc::new(PgRoleStore::new(pool.clone()));
    let catalog: Arc<dyn CatalogStore> = Arc::new(PgCatalogStore::new(pool.clone()));
    let content: Arc<dyn ContentStore> = Arc::new(PgContentStore::new(pool));

    assemble(config, directory, roles, catalog, content).await
}

async fn assemble(
    config: &ApiConfig,
    directory: Arc<dyn DirectoryStore>,
    roles: Arc<dyn RoleStore>,
    catalog: Arc<dyn CatalogStore>,
    content: Arc<dyn ContentStore>,
) -> AppServices {
    let thresholds = PermissionThresholds::from_env();
    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher);
    let sessions = Arc::new(SessionCodec::new(
        config.session_secret.as_bytes(),
        config.session_ttl,
    ));
    let hub = Arc::new(BroadcastHub::new(
        config.session_secret.as_bytes(),
        config.client_token_ttl,
    ));
    let notifier: Arc<dyn RealtimeNotifier> = hub.clone();

    seed_defaults(config, directory.as_ref(), roles.as_ref(), hasher.as_ref()).await;

    AppServices {
        sessions,
        admin: UserAdminService::new(directory.clone(), roles, hasher.clone(), thresholds),
        accounts: AccountService::new(directory.clone(), hasher),
        forum: ForumService::new(catalog, content, notifier.clone(), thresholds),
        directory,
        hub,
        notifier,
    }
}

/// Seed the default role ladder and the bootstrap administrator on an empty
/// directory. Failures here are fatal: a forum with no roles cannot admit
/// anyone.
async fn seed_defaults(
    config: &ApiConfig,
    directory: &dyn DirectoryStore,
    roles: &dyn RoleStore,
    hasher: &dyn PasswordHasher,
) {
    let existing = roles
        .list_roles()
        .await
        .expect("role store unavailable at startup");
    let mut admin_role_id = existing
        .iter()
        .find(|r| r.name == "administrator")
        .map(|r| r.role_id);

    if existing.is_empty() {
        for (name, level) in [
            ("reader", 10),
            ("contributor", 40),
            ("moderator", 80),
            ("administrator", 100),
        ] {
            let role = Role {
                role_id: RoleId::new(),
                name: name.to_string(),
                permission_level: level,
            };
            if role.name == "administrator" {
                admin_role_id = Some(role.role_id);
            }
            roles
                .insert_role(role)
                .await
                .expect("failed to seed default roles");
        }
        tracing::info!("seeded default role ladder");
    }

    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        return;
    };
    let Ok(email) = EmailAddress::parse(email) else {
        tracing::warn!("ATRIUM_ADMIN_EMAIL is not a valid email; skipping bootstrap admin");
        return;
    };
    let Some(role_id) = admin_role_id else {
        tracing::warn!("no administrator role found; skipping bootstrap admin");
        return;
    };

    match directory.find_any_by_email(&email).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            let hash = hasher
                .hash(password)
                .expect("failed to hash bootstrap admin password");
            directory
                .insert_user(NewUser {
                    user_id: UserId::new(),
                    email: email.clone(),
                    display_name: "Administrator".to_string(),
                    role_id,
                    password_hash: hash,
                })
                .await
                .expect("failed to seed bootstrap admin");
            tracing::info!(user = %email, "seeded bootstrap administrator");
        }
        Err(e) => tracing::error!(error = %e, "bootstrap admin lookup failed"),
    }
}
