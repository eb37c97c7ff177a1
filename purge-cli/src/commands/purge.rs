use anyhow::{Context, Result};
use purge_core::{run, Connector, PurgeConfig};

/// Run the purge on its own task so a panic surfaces as an error here.
pub async fn execute<C>(config: PurgeConfig, connector: C) -> Result<()>
where
    C: Connector + 'static,
    C::Store: 'static,
{
    let bucket = config.bucket.clone();
    let task = tokio::spawn(async move { run(&config, &connector).await });

    let report = task
        .await
        .with_context(|| format!("purge of bucket {bucket} aborted"))??;

    tracing::debug!("Purge finished: bucket={}, report={:?}", bucket, report);
    Ok(())
}
