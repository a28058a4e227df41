//! Integration tests for the compiled disk cache: round-trips, staleness,
//! and frozen templating results.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, SystemTime};

use anyhow::Result;
use chrono::DateTime;
use tempfile::TempDir;

use confdir::{Config, LoaderContext, Templater, TomlLoader, Value};

fn toml_config(dir: &Path, ctx: LoaderContext) -> Config {
    Config::builder(dir)
        .loader(Box::new(TomlLoader::new(ctx)))
        .build()
        .expect("config")
}

fn source_mtime(path: &Path) -> Result<SystemTime> {
    Ok(fs::metadata(path)?.modified()?)
}

fn set_mtime(path: &Path, mtime: SystemTime) -> Result<()> {
    let file = fs::OpenOptions::new().write(true).open(path)?;
    file.set_modified(mtime)?;
    Ok(())
}

#[test]
fn cached_and_fresh_decodes_are_identical() -> Result<()> {
    let dir = TempDir::new()?;
    let cache_dir = dir.path().join("cache");
    fs::write(
        dir.path().join("db.toml"),
        concat!(
            "host = \"${HOST}\"\n",
            "started = 2024-06-01T12:00:00Z\n",
            "weights = [1, 2, 3]\n",
            "[pool]\n",
            "size = 8\n",
            "label = \"%label%\"\n",
        ),
    )?;

    let templater = Arc::new(
        Templater::new()
            .constant("HOST", "db.internal")
            .function("label", |_| Value::String("primary".to_string())),
    );
    let cached_ctx = LoaderContext::new()
        .cache_dir(&cache_dir)
        .templater(templater.clone());
    let plain_ctx = LoaderContext::new().templater(templater);

    // First load compiles the cache; the value it returns comes from the
    // compiled snapshot, not the in-memory decode.
    let mut first = toml_config(dir.path(), cached_ctx.clone());
    let compiled = first.get("db")?;
    assert!(cache_dir.join("db.bin").is_file());

    // A second store resolves purely from the cache file.
    let mut second = toml_config(dir.path(), cached_ctx);
    let hit = second.get("db")?;
    assert_eq!(compiled, hit);

    // And both match a fresh, uncached decode with the same templater.
    let mut fresh = toml_config(dir.path(), plain_ctx);
    assert_eq!(fresh.get("db")?, compiled);

    // Spot-check the interesting values survived the round-trip.
    assert_eq!(
        second.get("db.host")?,
        Some(Value::String("db.internal".to_string()))
    );
    assert_eq!(
        second.get("db.pool.label")?,
        Some(Value::String("primary".to_string()))
    );
    assert_eq!(
        second.get("db.started")?,
        Some(Value::DateTime(DateTime::parse_from_rfc3339(
            "2024-06-01T12:00:00Z"
        )?))
    );
    Ok(())
}

#[test]
fn strictly_older_cache_recompiles() -> Result<()> {
    let dir = TempDir::new()?;
    let cache_dir = dir.path().join("cache");
    let source = dir.path().join("db.toml");
    let cache_file = cache_dir.join("db.bin");
    let ctx = LoaderContext::new().cache_dir(&cache_dir);

    fs::write(&source, "v = 1\n")?;
    assert_eq!(
        toml_config(dir.path(), ctx.clone()).get("db.v")?,
        Some(Value::Integer(1))
    );

    fs::write(&source, "v = 2\n")?;
    set_mtime(&cache_file, source_mtime(&source)? - Duration::from_secs(10))?;

    assert_eq!(
        toml_config(dir.path(), ctx).get("db.v")?,
        Some(Value::Integer(2))
    );
    Ok(())
}

#[test]
fn equal_mtime_cache_is_considered_fresh() -> Result<()> {
    let dir = TempDir::new()?;
    let cache_dir = dir.path().join("cache");
    let source = dir.path().join("db.toml");
    let cache_file = cache_dir.join("db.bin");
    let ctx = LoaderContext::new().cache_dir(&cache_dir);

    fs::write(&source, "v = 1\n")?;
    assert_eq!(
        toml_config(dir.path(), ctx.clone()).get("db.v")?,
        Some(Value::Integer(1))
    );

    // The source changed, but the cache carries the same mtime: the
    // coarse staleness check keeps serving the old snapshot.
    fs::write(&source, "v = 2\n")?;
    set_mtime(&cache_file, source_mtime(&source)?)?;

    assert_eq!(
        toml_config(dir.path(), ctx).get("db.v")?,
        Some(Value::Integer(1))
    );
    Ok(())
}

#[test]
fn cache_hits_serve_values_frozen_at_compile_time() -> Result<()> {
    let dir = TempDir::new()?;
    let cache_dir = dir.path().join("cache");
    fs::write(dir.path().join("app.toml"), "stamp = \"%tick%\"\n")?;

    let counter = Arc::new(AtomicI64::new(0));
    let ticks = counter.clone();
    let templater = Arc::new(Templater::new().function("tick", move |_| {
        Value::Integer(ticks.fetch_add(1, Ordering::SeqCst) + 1)
    }));

    let cached_ctx = LoaderContext::new()
        .cache_dir(&cache_dir)
        .templater(templater.clone());

    // Compile freezes the first tick into the snapshot.
    assert_eq!(
        toml_config(dir.path(), cached_ctx.clone()).get("app.stamp")?,
        Some(Value::Integer(1))
    );

    // A later store hits the cache: same frozen value, no new tick.
    assert_eq!(
        toml_config(dir.path(), cached_ctx).get("app.stamp")?,
        Some(Value::Integer(1))
    );
    assert_eq!(counter.load(Ordering::SeqCst), 1);

    // A fresh decode without the cache re-evaluates the function.
    let plain_ctx = LoaderContext::new().templater(templater);
    assert_eq!(
        toml_config(dir.path(), plain_ctx).get("app.stamp")?,
        Some(Value::Integer(2))
    );
    Ok(())
}

#[test]
fn unwritable_cache_directory_is_fatal() -> Result<()> {
    let dir = TempDir::new()?;
    fs::write(dir.path().join("db.toml"), "v = 1\n")?;

    // A regular file where the cache directory should be makes
    // create_dir_all fail and stays not-a-directory afterwards.
    let blocked = dir.path().join("cache");
    fs::write(&blocked, "not a directory")?;

    let ctx = LoaderContext::new().cache_dir(&blocked);
    let result = toml_config(dir.path(), ctx).get("db.v");
    assert!(matches!(
        result,
        Err(confdir::ConfigError::CacheDir { .. })
    ));
    Ok(())
}
