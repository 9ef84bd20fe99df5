//! The `gcp` binary end to end.

use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;

use gcp_cli::test_utils::TestEnvironment;

fn gcp(env: &TestEnvironment) -> Command {
    let mut cmd = Command::cargo_bin("gcp").unwrap();
    cmd.current_dir(&env.root).env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_compile_writes_dist_next_to_entry() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.write_source("app.js", "// = require foo\nvar app = 1;")?;
    env.write_source("foo.js", "var foo = 2;")?;

    gcp(&env)
        .args(["compile", "src/app.js"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Compiled to 'src/app.dist.js'"));

    let output = std::fs::read_to_string(env.source_path("app.dist.js"))?;
    assert!(output.find("var foo = 2;").unwrap() < output.find("var app = 1;").unwrap());
    assert!(!env.source_path("app.min.js").exists());
    Ok(())
}

#[test]
fn test_compile_to_explicit_destination() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.write_source("app.js", "var app;")?;

    gcp(&env)
        .args(["compile", "src/app.js", "public/bundle.js"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Compiled to 'public/bundle.dist.js'"));

    assert!(env.read_dest("bundle.dist.js")?.contains("var app;"));
    Ok(())
}

#[test]
fn test_compile_all_runs_configured_minifier() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.write_config("minifier = [\"sh\", \"-c\", \"tr a-z A-Z\"]\n")?;
    env.write_source("app.js", "var app;")?;

    gcp(&env)
        .args(["compile", "src/app.js", "public/app.js", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Compiled to 'public/app.dist.js'"))
        .stdout(predicate::str::contains("Minified to 'public/app.min.js'"));

    assert!(env.read_dest("app.dist.js")?.contains("var app;"));
    assert!(env.read_dest("app.min.js")?.contains("VAR APP;"));
    Ok(())
}

#[test]
fn test_compile_missing_dependency_fails_without_output() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.write_source("app.js", "// = require nowhere\nvar app;")?;

    gcp(&env)
        .args(["compile", "src/app.js"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error: Module 'nowhere' not found"));

    assert!(!env.source_path("app.dist.js").exists());
    Ok(())
}

#[test]
fn test_compile_reports_cycle() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.write_source("a.js", "// = require b\n")?;
    env.write_source("b.js", "// = require a\n")?;

    gcp(&env)
        .args(["compile", "src/a.js"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Circular dependency detected"));
    Ok(())
}

#[test]
fn test_build_compiles_entries_and_skips_marked_ones() -> Result<()> {
    let env = TestEnvironment::with_config()?;
    env.write_source("app.js", "// = require lib/foo\nvar app;")?;
    env.write_source("admin.js", "var admin;")?;
    env.write_source("draft_skip.js", "var draft;")?;
    env.write_source("lib/foo.js", "var foo;")?;

    gcp(&env)
        .arg("build")
        .assert()
        .success()
        .stdout(predicate::str::contains("rebuilt app.js"))
        .stdout(predicate::str::contains("rebuilt admin.js"))
        .stdout(predicate::str::contains("draft_skip.js").not());

    assert!(env.read_dest("app.js")?.contains("var foo;"));
    assert!(env.dest_path("admin.js").exists());
    assert!(!env.dest_path("draft_skip.js").exists());
    assert!(!env.dest_path("lib/foo.js").exists());
    Ok(())
}

#[test]
fn test_second_build_reuses_outputs() -> Result<()> {
    let env = TestEnvironment::with_config()?;
    env.write_source("app.js", "// = require lib/foo\nvar app;")?;
    env.write_source("lib/foo.js", "var foo;")?;

    gcp(&env)
        .arg("build")
        .assert()
        .success()
        .stdout(predicate::str::contains("rebuilt app.js"));
    let written = std::fs::metadata(env.dest_path("app.js"))?.modified()?;

    gcp(&env)
        .arg("build")
        .assert()
        .success()
        .stdout(predicate::str::contains("cached  app.js"))
        .stdout(predicate::str::contains("rebuilt").not());

    assert_eq!(std::fs::metadata(env.dest_path("app.js"))?.modified()?, written);
    Ok(())
}

#[test]
fn test_build_continues_past_missing_entry() -> Result<()> {
    let env = TestEnvironment::with_config()?;
    env.write_source("app.js", "var app;")?;

    gcp(&env)
        .args(["build", "ghost.js", "app.js"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rebuilt app.js"))
        .stderr(predicate::str::contains("missing ghost.js"));

    assert!(env.dest_path("app.js").exists());
    Ok(())
}

#[test]
fn test_build_without_source_directory_configured() -> Result<()> {
    let env = TestEnvironment::new()?;

    gcp(&env)
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
    Ok(())
}

#[test]
fn test_tree_marks_duplicates_and_includes() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.write_source("app.js", "// = require lib shared\n// = include sep\nvar app;")?;
    env.write_source("lib.js", "// = require shared\nvar lib;")?;
    env.write_source("shared.js", "var shared;")?;
    env.write_source("sep.js", "/* -- */")?;

    gcp(&env)
        .args(["tree", "src/app.js"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("src/app.js\n"))
        .stdout(predicate::str::contains("├── lib.js\n│   └── shared.js\n"))
        .stdout(predicate::str::contains("├── shared.js (*)\n"))
        .stdout(predicate::str::contains("└── sep.js [include]\n"))
        .stdout(predicate::str::contains("(*) = already required above"));
    Ok(())
}

#[test]
fn test_unknown_config_key_is_rejected() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.write_config("sorce = \"src\"\n")?;
    env.write_source("app.js", "var app;")?;

    gcp(&env).args(["compile", "src/app.js"]).assert().failure().code(1);
    Ok(())
}
