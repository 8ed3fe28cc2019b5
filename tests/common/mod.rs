#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use storefront_admin::{
    db::{create_orm_conn, create_pool, run_migrations},
    entity::users::ActiveModel as UserActive,
    state::AppState,
    storage::{BlobError, BlobStore, MemoryBlobStore},
};

/// Allow skipping when no DB is configured in the environment.
pub fn database_url() -> Option<String> {
    match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
        Ok(url) => Some(url),
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests.");
            None
        }
    }
}

pub async fn setup_state(
    database_url: &str,
    blobs: Arc<dyn BlobStore>,
) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url, 5).await?;
    run_migrations(&pool).await?;
    let orm = create_orm_conn(pool);

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE cart_items, orders, products, categories, users CASCADE",
    ))
    .await?;

    Ok(AppState::new(orm, blobs))
}

pub async fn memory_state(database_url: &str) -> anyhow::Result<(AppState, Arc<MemoryBlobStore>)> {
    let blobs = Arc::new(MemoryBlobStore::new());
    let state = setup_state(database_url, blobs.clone()).await?;
    Ok((state, blobs))
}

pub async fn create_user(
    state: &AppState,
    id: &str,
    number: &str,
    address: &str,
) -> anyhow::Result<String> {
    let user = UserActive {
        id: Set(id.to_string()),
        number: Set(Some(number.to_string())),
        address: Set(Some(address.to_string())),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(user.id)
}

/// Stores like the in-memory store but refuses every delete.
#[derive(Default)]
pub struct StubbornBlobStore {
    inner: MemoryBlobStore,
}

#[async_trait]
impl BlobStore for StubbornBlobStore {
    async fn store(&self, name: &str, bytes: Vec<u8>) -> Result<String, BlobError> {
        self.inner.store(name, bytes).await
    }

    async fn delete(&self, _url: &str) -> Result<(), BlobError> {
        Err(BlobError::Io(std::io::Error::other("storage offline")))
    }
}
