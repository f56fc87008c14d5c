// src/commands.rs
//! Command handlers for the quire CLI

use anyhow::{Context, Result};
use quire::content_type;
use quire::publication::EpubAsset;
use quire::{
    Config, HrefMode, IngestRequest, Ingestor, LocalStore, Publication, SourceManifest,
    StorageClient,
};
use std::fs;
use std::path::Path;
use tracing::info;

/// Load the file configuration (if any) with the environment layered on top
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };
    config.apply_overrides(|key| std::env::var(key).ok());
    Ok(config)
}

fn load_manifest(path: &Path) -> Result<SourceManifest> {
    SourceManifest::load(path)
        .with_context(|| format!("Failed to load source manifest {}", path.display()))
}

/// Download, materialize and upload a publication named in a request
pub fn cmd_process(
    config: &Config,
    body: Option<&str>,
    filename: Option<&str>,
    manifest_path: &Path,
    href_mode: Option<HrefMode>,
) -> Result<()> {
    config.validate()?;

    let request = match (body, filename) {
        (Some(body), _) => IngestRequest::from_body(body)?,
        (None, Some(filename)) => IngestRequest::new(filename)?,
        (None, None) => anyhow::bail!("Either --body or --filename is required"),
    };
    let manifest = load_manifest(manifest_path)?;

    let output = StorageClient::new(config, &config.output_bucket)?;
    let source = output.with_bucket(&config.source_bucket);
    let ingestor = Ingestor::new(&source, &output).href_mode(href_mode.unwrap_or(config.href_mode));

    info!("Processing EPUB file: {}", request.filename());
    let result = ingestor
        .run(&request, manifest)
        .with_context(|| format!("Failed to process {}", request.filename()))?;

    println!("Manifest: {}", result.manifest_url);
    println!(
        "  {} resources, {} positions",
        result.resource_count, result.position_count
    );
    for href in &result.skipped {
        println!("  skipped: {}", href);
    }
    Ok(())
}

/// Materialize a local archive into a directory
pub fn cmd_local(
    config: &Config,
    epub: &Path,
    manifest_path: &Path,
    output: &Path,
    base_url: Option<&str>,
    href_mode: Option<HrefMode>,
) -> Result<()> {
    let data = fs::read(epub).with_context(|| format!("Failed to read {}", epub.display()))?;
    let name = epub
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| epub.display().to_string());

    let asset = EpubAsset::new(name.clone(), data)?;
    let publication = Publication::open(&asset, load_manifest(manifest_path)?)?;

    let store = match base_url {
        Some(url) => LocalStore::with_base_url(output, url),
        None => LocalStore::new(output),
    };
    let base_path = quire::sanitize_base_path(&name);

    let result = quire::process(
        &publication,
        &store,
        &base_path,
        href_mode.unwrap_or(config.href_mode),
    )?;

    println!("Wrote {} to {}", base_path, output.display());
    println!("Manifest: {}", result.manifest_url);
    println!(
        "  {} resources, {} positions",
        result.resource_count, result.position_count
    );
    Ok(())
}

/// Print the resolved Content-Type for each path
pub fn cmd_content_type(paths: &[String]) -> Result<()> {
    for path in paths {
        println!("{}\t{}", path, content_type::resolve(path));
    }
    Ok(())
}
