//! Manifest file contents across several outputs.

use anyhow::Result;
use serde_json::json;
use std::sync::Arc;

use gcp_cli::manifest::load_manifest;
use gcp_cli::pipeline::{CompileOptions, Pipeline};
use gcp_cli::templating::JstRenderer;
use gcp_cli::test_utils::TestEnvironment;

#[tokio::test]
async fn test_outputs_share_one_manifest() -> Result<()> {
    let env = TestEnvironment::new()?;
    let app = env.write_source("app.js", "// = require lib/foo\n// = include partials/sep\nvar app;")?;
    let admin = env.write_source("admin.js", "// = require lib/foo\nvar admin;")?;
    env.write_source("lib/foo.js", "var foo;")?;
    env.write_source("partials/sep.js", "/* -- */")?;

    let manifest = env.root.join("manifest.json");
    let pipeline = Pipeline::new(Arc::new(JstRenderer::default())).with_manifest(&manifest);

    pipeline.compile(&app, &env.dest_path("app.js"), CompileOptions::default()).await?;
    pipeline.compile(&admin, &env.dest_path("admin.js"), CompileOptions::default()).await?;

    let written = load_manifest(&manifest)?;
    assert_eq!(written.len(), 2);
    assert_eq!(
        written["public/app.js"],
        json!({"src/app.js": {"src/lib/foo.js": {}, "src/partials/sep.js": {}}})
    );
    assert_eq!(written["public/admin.js"], json!({"src/admin.js": {"src/lib/foo.js": {}}}));
    Ok(())
}

#[tokio::test]
async fn test_recompile_replaces_only_its_entry() -> Result<()> {
    let env = TestEnvironment::new()?;
    let app = env.write_source("app.js", "var app;")?;
    let manifest = env.root.join("manifest.json");
    std::fs::write(&manifest, r#"{"public/other.js": {"src/other.js": {}}}"#)?;

    let pipeline = Pipeline::new(Arc::new(JstRenderer::default())).with_manifest(&manifest);
    pipeline.compile(&app, &env.dest_path("app.js"), CompileOptions::default()).await?;

    let written = load_manifest(&manifest)?;
    assert_eq!(written["public/other.js"], json!({"src/other.js": {}}));
    assert_eq!(written["public/app.js"], json!({"src/app.js": {}}));
    assert!(!env.root.join("manifest.json.tmp").exists());
    Ok(())
}

#[tokio::test]
async fn test_concurrent_writers_keep_every_entry() -> Result<()> {
    let env = TestEnvironment::new()?;
    for i in 0..6 {
        env.write_source(&format!("entry{i}.js"), "var e;")?;
    }
    let manifest = env.root.join("manifest.json");
    let pipeline = Arc::new(Pipeline::new(Arc::new(JstRenderer::default())).with_manifest(&manifest));

    let mut tasks = Vec::new();
    for i in 0..6 {
        let pipeline = Arc::clone(&pipeline);
        let entry = env.source_path(&format!("entry{i}.js"));
        let dest = env.dest_path(&format!("entry{i}.js"));
        tasks.push(tokio::spawn(async move {
            pipeline.compile(&entry, &dest, CompileOptions::default()).await
        }));
    }
    for task in tasks {
        task.await??;
    }

    let written = load_manifest(&manifest)?;
    assert_eq!(written.len(), 6);
    Ok(())
}

#[tokio::test]
async fn test_repeated_require_keeps_nested_entry() -> Result<()> {
    let env = TestEnvironment::new()?;
    let app = env.write_source("app.js", "// = require a\n// = require a\nvar app;")?;
    env.write_source("a.js", "// = require x\nvar a;")?;
    env.write_source("x.js", "var x;")?;
    let manifest = env.root.join("manifest.json");

    let pipeline = Pipeline::new(Arc::new(JstRenderer::default())).with_manifest(&manifest);
    pipeline.compile(&app, &env.dest_path("app.js"), CompileOptions::default()).await?;

    let written = load_manifest(&manifest)?;
    assert_eq!(written["public/app.js"], json!({"src/app.js": {"src/a.js": {"src/x.js": {}}}}));
    Ok(())
}

#[tokio::test]
async fn test_unwritable_manifest_leaves_no_output() -> Result<()> {
    let env = TestEnvironment::new()?;
    let app = env.write_source("app.js", "var app;")?;
    let manifest = env.root.join("manifest.json");
    std::fs::write(&manifest, "[1,2]")?;
    let dest = env.dest_path("app.js");

    let pipeline = Pipeline::new(Arc::new(JstRenderer::default())).with_manifest(&manifest);
    assert!(pipeline.compile(&app, &dest, CompileOptions::default()).await.is_err());

    assert!(!dest.exists());
    assert!(pipeline.record().is_empty());
    assert_eq!(std::fs::read_to_string(&manifest)?, "[1,2]");
    Ok(())
}
