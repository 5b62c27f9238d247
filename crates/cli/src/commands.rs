//! Subcommand implementations.

use anyhow::{Context, Result};
use shellcache_client::{FetchClient, FetchConfig, resolve};
use shellcache_core::{AppConfig, CacheDb, CacheStorage, CacheStore, Request};
use shellcache_worker::{Lifecycle, OfflineCacheManager, Registration};

type Manager = OfflineCacheManager<CacheDb, FetchClient>;

async fn manager(config: &AppConfig) -> Result<Manager> {
    let generation = config.generation()?;
    let db = CacheDb::open(&config.db_path)
        .await
        .with_context(|| format!("opening cache database {}", config.db_path.display()))?;
    let network = FetchClient::new(FetchConfig::from(config))?;
    Ok(OfflineCacheManager::new(generation, db, network))
}

pub async fn install(config: &AppConfig) -> Result<()> {
    let report = manager(config).await?.install().await?;
    println!("installed {} assets into {}", report.stored, report.cache_name);
    Ok(())
}

pub async fn activate(config: &AppConfig) -> Result<()> {
    let report = manager(config).await?.activate().await?;
    if report.deleted.is_empty() {
        println!("{} active, nothing to delete", report.kept);
    } else {
        println!("{} active, deleted {}", report.kept, report.deleted.join(", "));
    }
    Ok(())
}

pub async fn update(config: &AppConfig) -> Result<()> {
    let mut registration = Registration::new();
    let result = registration.register(manager(config).await?).await;

    if let Some(state) = registration.state() {
        tracing::info!(%state, "registration finished");
    }

    let report = result?;
    println!(
        "installed {} assets into {}, deleted {} stale caches",
        report.install.stored,
        report.install.cache_name,
        report.activation.deleted.len()
    );
    Ok(())
}

pub async fn fetch(config: &AppConfig, targets: &[String], method: &str) -> Result<()> {
    let manager = manager(config).await?;
    let scope = manager.generation().scope().clone();

    for target in targets {
        let url = resolve(&scope, target).with_context(|| format!("resolving {target}"))?;
        let request = Request::new(method, url);
        let outcome = manager.fetch(&request).await?;
        let source = if outcome.is_cached() { "cache" } else { "network" };
        println!(
            "{source:<7} {} {} {} ({} bytes)",
            outcome.response.status,
            request.method,
            request.url,
            outcome.response.body.len()
        );
    }
    Ok(())
}

pub async fn stores(config: &AppConfig) -> Result<()> {
    let db = CacheDb::open(&config.db_path).await?;
    let names = db.keys().await?;

    if names.is_empty() {
        println!("no cache stores");
        return Ok(());
    }

    for name in names {
        let count = db.open(&name).await?.count().await?;
        let marker = if name == config.cache_name { "*" } else { " " };
        println!("{marker} {name} ({count} entries)");
    }
    Ok(())
}
