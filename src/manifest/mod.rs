//! Persisted record of the dependency tree behind each compiled output.
//!
//! The manifest is a JSON object keyed by output path. Each value mirrors the
//! [`FileNode`] tree that produced the output, without source text: every node
//! is a key (its path relative to the manifest's directory) mapped to the
//! object of its children.
//!
//! ```json
//! {
//!   "public/app.js": {
//!     "src/app.js": {
//!       "src/lib/foo.js": {},
//!       "src/views/item.ejs": {}
//!     }
//!   }
//! }
//! ```
//!
//! Entries for other outputs are preserved on update. Keys appear in tree order.

mod lock;

pub use lock::ManifestLock;

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::graph::FileNode;
use crate::utils::fs::{ensure_dir, read_json_file, relative_path, write_json_file};

/// Record the tree of `root` under `output` in `manifest_file`.
///
/// The existing manifest is loaded (an absent file counts as empty), the entry
/// for `output` replaced, and the result written back atomically as pretty JSON.
/// The whole cycle holds the manifest's [`ManifestLock`].
///
/// # Errors
///
/// Fails if the manifest exists but is not a JSON object, or on any I/O error.
pub async fn write_manifest(manifest_file: &Path, output: &str, root: &FileNode) -> Result<()> {
    let manifest_dir = manifest_dir(manifest_file)?;
    let _lock = ManifestLock::acquire(manifest_file).await?;

    let mut manifest = load_manifest(manifest_file)?;
    manifest.insert(output.to_string(), Value::Object(tree_entry(root, &manifest_dir)));
    write_json_file(manifest_file, &Value::Object(manifest), true)?;

    tracing::debug!("Recorded {} in manifest {}", output, manifest_file.display());
    Ok(())
}

/// Load a manifest, returning an empty object if it does not exist.
///
/// # Errors
///
/// Fails if the file cannot be read, is not valid JSON, or is not an object.
pub fn load_manifest(manifest_file: &Path) -> Result<Map<String, Value>> {
    if !manifest_file.exists() {
        return Ok(Map::new());
    }

    match read_json_file::<Value>(manifest_file)? {
        Value::Object(map) => Ok(map),
        _ => Err(anyhow::anyhow!(
            "Manifest {} must contain a JSON object",
            manifest_file.display()
        )),
    }
}

/// `{ "<node>": { <children> } }` for one node.
fn tree_entry(node: &FileNode, manifest_dir: &Path) -> Map<String, Value> {
    let mut entry = Map::new();
    insert_node(&mut entry, node, manifest_dir);
    entry
}

/// Add `node` and its subtree to `siblings`.
///
/// A duplicate leaf never replaces a sibling of the same path, which carries
/// the real subtree.
fn insert_node(siblings: &mut Map<String, Value>, node: &FileNode, manifest_dir: &Path) {
    let key = relative_path(manifest_dir, &node.path);
    if node.is_duplicate {
        siblings.entry(key).or_insert_with(|| Value::Object(Map::new()));
        return;
    }

    let mut children = Map::new();
    for child in &node.children {
        insert_node(&mut children, child, manifest_dir);
    }
    siblings.insert(key, Value::Object(children));
}

/// Canonical directory of the manifest, matching the canonical node paths.
fn manifest_dir(manifest_file: &Path) -> Result<PathBuf> {
    let parent = match manifest_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    ensure_dir(&parent)?;
    parent
        .canonicalize()
        .with_context(|| format!("Failed to resolve manifest directory {}", parent.display()))
}
