use std::sync::Arc;

use acb_core::{config::Config, pipeline::SubmissionPipeline, store::UserRecordStore};
use acb_store::Db;

#[tokio::main]
async fn main() -> Result<(), acb_core::Error> {
    acb_core::logging::init("acb")?;

    let cfg = Arc::new(Config::load()?);

    let db = Db::connect(&cfg.database_url).await?;
    db.migrate().await?;
    tracing::info!("database connection pool initialized");

    let store: Arc<dyn UserRecordStore> = Arc::new(db.clone());
    let pipeline = Arc::new(SubmissionPipeline::new(&cfg, store));

    let result = acb_telegram::router::run_polling(cfg, pipeline)
        .await
        .map_err(|e| acb_core::Error::External(format!("telegram bot failed: {e}")));

    // The pool is process-wide state: tear it down exactly once, after the
    // dispatcher has stopped.
    db.close().await;
    tracing::info!("database connection pool closed");

    result
}
