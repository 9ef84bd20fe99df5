//! Serialization of a dependency tree into the concatenated artifact.
//!
//! Nodes are emitted children-first, so every module appears after everything it
//! requires. Each contributing node is preceded by a banner naming its file:
//!
//! ```text
//! //=============================================
//! ///abs/path/to/foo.js
//! //=============================================
//!
//! var foo = 2;
//!
//! ```

use crate::constants::BANNER_RULE_WIDTH;
use crate::graph::FileNode;

/// Render `root` and its dependencies into one script.
#[must_use]
pub fn render(root: &FileNode) -> String {
    let rule = "=".repeat(BANNER_RULE_WIDTH);
    let mut output = String::new();
    render_into(root, &rule, &mut output);
    output
}

fn render_into(node: &FileNode, rule: &str, output: &mut String) {
    for child in &node.children {
        render_into(child, rule, output);
    }

    if node.contributes() {
        output.push_str("//");
        output.push_str(rule);
        output.push_str("\n//");
        output.push_str(&node.path.display().to_string());
        output.push_str("\n//");
        output.push_str(rule);
        output.push_str("\n\n");
        output.push_str(&node.source);
        output.push_str("\n\n");
    }
}
