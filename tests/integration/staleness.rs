//! Cached versus rebuilt decisions of `Pipeline::resolve_and_check`.

use anyhow::Result;
use std::sync::Arc;

use gcp_cli::pipeline::{BuildStatus, CompileOptions, Pipeline};
use gcp_cli::templating::JstRenderer;
use gcp_cli::test_utils::TestEnvironment;

fn pipeline() -> Pipeline {
    Pipeline::new(Arc::new(JstRenderer::default()))
}

#[tokio::test]
async fn test_untouched_tree_is_cached() -> Result<()> {
    let env = TestEnvironment::new()?;
    let app = env.write_source("app.js", "// = require lib/foo\nvar app;")?;
    env.write_source("lib/foo.js", "var foo;")?;
    let dest = env.dest_path("app.js");
    let pipeline = pipeline();

    assert_eq!(pipeline.resolve_and_check(&app, &dest, CompileOptions::default()).await?, BuildStatus::Rebuilt);
    assert_eq!(pipeline.resolve_and_check(&app, &dest, CompileOptions::default()).await?, BuildStatus::Cached);
    assert_eq!(pipeline.record().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_transitive_change_triggers_rebuild() -> Result<()> {
    let env = TestEnvironment::new()?;
    let app = env.write_source("app.js", "// = require views\nvar app;")?;
    env.write_source("views.js", "// = require_tree ./templates\nvar views;")?;
    let template = env.write_source("templates/item.ejs", "<li></li>")?;
    let dest = env.dest_path("app.js");
    let pipeline = pipeline();

    pipeline.resolve_and_check(&app, &dest, CompileOptions::default()).await?;

    env.touch_future(&template, 30)?;
    assert_eq!(pipeline.resolve_and_check(&app, &dest, CompileOptions::default()).await?, BuildStatus::Rebuilt);
    Ok(())
}

#[tokio::test]
async fn test_new_dependency_is_picked_up_after_rebuild() -> Result<()> {
    let env = TestEnvironment::new()?;
    let app = env.write_source("app.js", "var app;")?;
    let dest = env.dest_path("app.js");
    let pipeline = pipeline();

    pipeline.resolve_and_check(&app, &dest, CompileOptions::default()).await?;
    assert_eq!(pipeline.record().sources(&dest).map(|s| s.len()), Some(1));

    env.write_source("extra.js", "var extra;")?;
    env.write_source("app.js", "// = require extra\nvar app;")?;
    env.touch_future(&app, 30)?;

    assert_eq!(pipeline.resolve_and_check(&app, &dest, CompileOptions::default()).await?, BuildStatus::Rebuilt);
    assert_eq!(pipeline.record().sources(&dest).map(|s| s.len()), Some(2));
    assert!(env.read_dest("app.js")?.contains("var extra;"));
    Ok(())
}

#[tokio::test]
async fn test_deleted_output_is_rebuilt() -> Result<()> {
    let env = TestEnvironment::new()?;
    let app = env.write_source("app.js", "var app;")?;
    let dest = env.dest_path("app.js");
    let pipeline = pipeline();

    pipeline.resolve_and_check(&app, &dest, CompileOptions::default()).await?;
    std::fs::remove_file(&dest)?;

    assert_eq!(pipeline.resolve_and_check(&app, &dest, CompileOptions::default()).await?, BuildStatus::Rebuilt);
    assert!(dest.exists());
    Ok(())
}

#[tokio::test]
async fn test_force_always_rebuilds() -> Result<()> {
    let env = TestEnvironment::new()?;
    let app = env.write_source("app.js", "var app;")?;
    let dest = env.dest_path("app.js");
    let pipeline = pipeline();
    let force = CompileOptions {
        force: true,
        ..CompileOptions::default()
    };

    pipeline.resolve_and_check(&app, &dest, CompileOptions::default()).await?;
    assert_eq!(pipeline.resolve_and_check(&app, &dest, force).await?, BuildStatus::Rebuilt);
    assert_eq!(pipeline.resolve_and_check(&app, &dest, force).await?, BuildStatus::Rebuilt);
    Ok(())
}

#[tokio::test]
async fn test_output_from_earlier_pipeline_is_cached() -> Result<()> {
    let env = TestEnvironment::new()?;
    let app = env.write_source("app.js", "// = require views\nvar app;")?;
    env.write_source("views.js", "// = require_tree ./templates\nvar views;")?;
    let template = env.write_source("templates/item.ejs", "<li></li>")?;
    let dest = env.dest_path("app.js");

    assert_eq!(pipeline().resolve_and_check(&app, &dest, CompileOptions::default()).await?, BuildStatus::Rebuilt);
    let written = std::fs::metadata(&dest)?.modified()?;

    let restarted = pipeline();
    assert_eq!(restarted.resolve_and_check(&app, &dest, CompileOptions::default()).await?, BuildStatus::Cached);
    assert_eq!(std::fs::metadata(&dest)?.modified()?, written);
    assert_eq!(restarted.record().sources(&dest).map(|s| s.len()), Some(3));

    env.touch_future(&template, 30)?;
    let restarted = pipeline();
    assert_eq!(restarted.resolve_and_check(&app, &dest, CompileOptions::default()).await?, BuildStatus::Rebuilt);
    Ok(())
}
