use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    resolver: String,
    styles: String,
    traces: BTreeMap<String, String>,
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let raw = read_to_string(rel)?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse fixture {rel}"))
}

/// Sample → settings decision cases.
pub fn resolver_cases<T: DeserializeOwned>() -> Result<T> {
    load_json(&MANIFEST.resolver)
}

/// Expected inline styles per settings combination.
pub fn style_expectations<T: DeserializeOwned>() -> Result<T> {
    load_json(&MANIFEST.styles)
}

/// Names of the recorded frame traces.
pub fn trace_names() -> Vec<&'static str> {
    MANIFEST.traces.keys().map(String::as_str).collect()
}

/// Frame trace by manifest name.
pub fn trace<T: DeserializeOwned>(name: &str) -> Result<T> {
    let rel = MANIFEST
        .traces
        .get(name)
        .ok_or_else(|| anyhow!("unknown trace fixture '{name}'"))?;
    load_json(rel)
}
