//! Bundling behavior through the library pipeline.

use anyhow::Result;
use std::sync::Arc;

use gcp_cli::core::GcpError;
use gcp_cli::pipeline::{CompileOptions, Pipeline};
use gcp_cli::templating::JstRenderer;
use gcp_cli::test_utils::TestEnvironment;

fn pipeline() -> Pipeline {
    Pipeline::new(Arc::new(JstRenderer::default()))
}

fn banner(path: &std::path::Path) -> String {
    let rule = "=".repeat(45);
    format!("//{rule}\n//{}\n//{rule}\n\n", path.display())
}

#[tokio::test]
async fn test_require_places_dependency_first() -> Result<()> {
    let env = TestEnvironment::new()?;
    let app = env.write_source("app.js", "// = require foo\nvar app = 1;")?;
    let foo = env.write_source("foo.js", "var foo = 2;")?;

    pipeline().compile(&app, &env.dest_path("app.js"), CompileOptions::default()).await?;

    let output = env.read_dest("app.js")?;
    let expected = format!(
        "{}var foo = 2;\n\n{}// = require foo\nvar app = 1;\n\n",
        banner(&foo),
        banner(&app)
    );
    assert_eq!(output, expected);
    Ok(())
}

#[tokio::test]
async fn test_diamond_requires_emit_once_in_dependency_order() -> Result<()> {
    let env = TestEnvironment::new()?;
    let app = env.write_source("app.js", "// = require views widgets\nvar app;")?;
    env.write_source("views.js", "// = require core\nvar views;")?;
    env.write_source("widgets.js", "// = require core\nvar widgets;")?;
    env.write_source("core.js", "var core;")?;

    pipeline().compile(&app, &env.dest_path("app.js"), CompileOptions::default()).await?;

    let output = env.read_dest("app.js")?;
    assert_eq!(output.matches("var core;").count(), 1);

    let positions: Vec<usize> = ["var core;", "var views;", "var widgets;", "var app;"]
        .iter()
        .map(|needle| output.find(needle).unwrap())
        .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]), "{positions:?}");
    Ok(())
}

#[tokio::test]
async fn test_module_required_deep_then_shallow_precedes_its_dependents() -> Result<()> {
    let env = TestEnvironment::new()?;
    // `shared` is reached through `lib` first, then directly from app
    let app = env.write_source("app.js", "// = require lib shared\nvar app;")?;
    env.write_source("lib.js", "// = require shared\nvar lib;")?;
    env.write_source("shared.js", "var shared;")?;

    pipeline().compile(&app, &env.dest_path("app.js"), CompileOptions::default()).await?;

    let output = env.read_dest("app.js")?;
    assert_eq!(output.matches("var shared;").count(), 1);
    assert!(output.find("var shared;").unwrap() < output.find("var lib;").unwrap());
    Ok(())
}

#[tokio::test]
async fn test_include_repeats_fragment() -> Result<()> {
    let env = TestEnvironment::new()?;
    let app = env.write_source(
        "app.js",
        "// = include partials/sep\n// = require a\n// = include partials/sep\nvar app;",
    )?;
    env.write_source("a.js", "// = include partials/sep\nvar a;")?;
    env.write_source("partials/sep.js", "/* ---- */")?;

    pipeline().compile(&app, &env.dest_path("app.js"), CompileOptions::default()).await?;

    let output = env.read_dest("app.js")?;
    assert_eq!(output.matches("/* ---- */\n\n").count(), 3);
    Ok(())
}

#[tokio::test]
async fn test_require_directory_versus_tree() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.write_source("widgets/a.js", "var a=1;")?;
    env.write_source("widgets/sub/b.js", "var b=2;")?;
    env.write_source("widgets/notes.txt", "not script")?;
    let dir_entry = env.write_source("dir.js", "// = require_directory ./widgets\n")?;
    let tree_entry = env.write_source("tree.js", "// = require_tree ./widgets\n")?;

    let pipeline = pipeline();
    pipeline.compile(&dir_entry, &env.dest_path("dir.js"), CompileOptions::default()).await?;
    pipeline.compile(&tree_entry, &env.dest_path("tree.js"), CompileOptions::default()).await?;

    let dir_output = env.read_dest("dir.js")?;
    assert!(dir_output.contains("var a=1;"));
    assert!(!dir_output.contains("var b=2;"));
    assert!(!dir_output.contains("not script"));

    let tree_output = env.read_dest("tree.js")?;
    assert!(tree_output.contains("var a=1;"));
    assert!(tree_output.contains("var b=2;"));
    Ok(())
}

#[tokio::test]
async fn test_templates_are_registered_under_namespace() -> Result<()> {
    let env = TestEnvironment::new()?;
    let app = env.write_source("app.js", "// = require_tree ./views\nvar app;")?;
    env.write_source("views/item.ejs", "<li><%= name %></li>")?;
    env.write_source("views/card.hbs", "<div>{{title}}</div>")?;

    let pipeline = Pipeline::new(Arc::new(JstRenderer::new("templates", "views")));
    pipeline.compile(&app, &env.dest_path("app.js"), CompileOptions::default()).await?;

    let output = env.read_dest("app.js")?;
    assert!(output.contains("var templates = templates || {};"));
    assert!(output.contains(r#"templates["item"] = _.template("<li><%= name %></li>");"#));
    assert!(output.contains(r#"templates["card"] = Handlebars.compile("<div>{{title}}</div>");"#));
    Ok(())
}

#[tokio::test]
async fn test_missing_dependency_writes_nothing() -> Result<()> {
    let env = TestEnvironment::new()?;
    let app = env.write_source("app.js", "// = require nowhere\nvar app;")?;

    let err = pipeline()
        .compile(&app, &env.dest_path("app.js"), CompileOptions::default())
        .await
        .unwrap_err();

    let gcp_error = err.downcast_ref::<GcpError>().expect("typed error");
    assert!(matches!(gcp_error, GcpError::NotFound { reference, .. } if reference == "nowhere"));
    assert!(gcp_error.is_recoverable());
    assert!(!env.dest_path("app.js").exists());
    Ok(())
}

#[tokio::test]
async fn test_cycle_is_reported() -> Result<()> {
    let env = TestEnvironment::new()?;
    let a = env.write_source("a.js", "// = require b\n")?;
    env.write_source("b.js", "// = require a\n")?;

    let err = pipeline().compile(&a, &env.dest_path("a.js"), CompileOptions::default()).await.unwrap_err();

    let gcp_error = err.downcast_ref::<GcpError>().expect("typed error");
    assert!(matches!(gcp_error, GcpError::CycleDetected { .. }));
    assert!(!gcp_error.is_recoverable());
    assert!(gcp_error.to_string().contains(" -> "));
    Ok(())
}

#[tokio::test]
async fn test_concurrent_compiles_share_no_duplicate_state() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.write_source("shared.js", "var shared;")?;
    for i in 0..8 {
        env.write_source(&format!("entry{i}.js"), &format!("// = require shared\nvar e{i};"))?;
    }

    let pipeline = Arc::new(pipeline());
    let mut tasks = Vec::new();
    for i in 0..8 {
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

    for i in 0..8 {
        let output = env.read_dest(&format!("entry{i}.js"))?;
        assert_eq!(output.matches("var shared;").count(), 1, "entry{i}");
    }
    Ok(())
}
