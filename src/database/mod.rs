use sqlx::PgPool;
use std::sync::Arc;

pub type DatabasePool = Arc<PgPool>;

pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    // SQLx with native-tls automatically negotiates TLS when the URL asks for it
    // (sslmode=require). For remote databases the URL should include it.
    let pool = PgPool::connect(database_url).await?;

    if !database_url.contains("sslmode=require")
        && !database_url.contains("localhost")
        && !database_url.contains("127.0.0.1")
    {
        tracing::warn!("Connecting to remote database without explicit sslmode. Consider adding sslmode=require");
    }

    Ok(pool)
}

pub async fn new_pool(database_url: &str) -> anyhow::Result<DatabasePool> {
    let pool = create_pool(database_url).await?;
    Ok(Arc::new(pool))
}
