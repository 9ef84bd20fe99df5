//! Display the resolved dependency tree of an entry file.
//!
//! ```text
//! assets/js/app.js
//! ├── vendor/jquery.js
//! ├── lib/widgets.js
//! │   └── vendor/jquery.js (*)
//! ├── views/item.ejs
//! └── partials/banner.js [include]
//!
//! (*) = already required above, not repeated in the output
//! ```
//!
//! Child paths are shown relative to the entry file's directory.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};

use super::common::{display_path, template_renderer};
use crate::config::GcpConfig;
use crate::graph::{FileNode, NodeKind, build_tree};
use crate::utils::fs::relative_path;

/// Print the resolved dependency tree of an entry file.
#[derive(Args, Debug)]
pub struct TreeCommand {
    /// Entry file
    file: PathBuf,
}

impl TreeCommand {
    /// Run the command.
    pub async fn execute(self, config: &GcpConfig, cwd: &Path) -> Result<()> {
        let renderer = template_renderer(config);
        let entry = if self.file.is_absolute() {
            self.file.clone()
        } else {
            cwd.join(&self.file)
        };

        let root = build_tree(&entry, renderer.as_ref()).await?;
        let base = root.path.parent().map(Path::to_path_buf).unwrap_or_default();

        let mut lines = Vec::new();
        for (i, child) in root.children.iter().enumerate() {
            let is_last = i == root.children.len() - 1;
            format_node(child, &base, "", is_last, &mut lines);
        }

        println!("{}", display_path(cwd, &self.file).cyan().bold());
        for line in &lines {
            println!("{line}");
        }

        if has_duplicates(&root) {
            println!();
            println!("{}", "(*) = already required above, not repeated in the output".bright_black());
        }
        Ok(())
    }
}

fn format_node(node: &FileNode, base: &Path, prefix: &str, is_last: bool, lines: &mut Vec<String>) {
    let connector = if is_last { "└── " } else { "├── " };
    let name = relative_path(base, &node.path);

    let marker = if node.is_duplicate {
        " (*)".bright_black().to_string()
    } else if node.kind == NodeKind::IncludedFragment {
        format!(" [{}]", node.kind).bright_black().to_string()
    } else {
        String::new()
    };

    lines.push(format!("{prefix}{connector}{name}{marker}"));

    let child_prefix = if is_last {
        format!("{prefix}    ")
    } else {
        format!("{prefix}│   ")
    };
    for (i, child) in node.children.iter().enumerate() {
        let is_last_child = i == node.children.len() - 1;
        format_node(child, base, &child_prefix, is_last_child, lines);
    }
}

fn has_duplicates(node: &FileNode) -> bool {
    node.is_duplicate || node.children.iter().any(has_duplicates)
}
