//! Graph command handler.

use std::path::PathBuf;

use color_eyre::Result;
use serde::Serialize;

use crate::context::Context;
use crate::di::FromRef;
use crate::schema::{SchemaGraph, SchemaNode};
use crate::services::FinderService;

use super::App;

#[derive(Serialize)]
struct GraphOutput<'a> {
    nodes: Vec<&'a SchemaNode>,
    errors: Vec<String>,
}

impl App {
    /// Walk whole documents and print every node with its edges.
    pub async fn run_graph(&self, ctx: &Context, files: &[PathBuf], json: bool) -> Result<()> {
        let service = FinderService::from_ref(ctx);
        let schemas = service.load_schemas(files).await?;
        let graph = service.build_graph(&schemas);

        tracing::info!(
            nodes = graph.len(),
            errors = graph.errors().len(),
            "Built schema graph"
        );

        if json {
            let output = GraphOutput {
                nodes: graph.nodes().collect(),
                errors: graph.errors().iter().map(ToString::to_string).collect(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            print_tree(&graph);
        }

        Ok(())
    }
}

/// Indented tree from the umbrella root. Nodes reached a second time (shared
/// `$ref` targets, cycles) are printed once more but not descended into.
fn print_tree(graph: &SchemaGraph) {
    let mut seen = std::collections::HashSet::new();
    let mut stack = vec![(graph.root(), 0usize)];

    while let Some((node, depth)) = stack.pop() {
        let indent = "  ".repeat(depth);
        println!("{indent}{} [{}] {}", node.label(), node.value_type, node.uri);

        if !seen.insert(node.uri.as_str()) {
            continue;
        }
        for child in graph.children(&node.uri).into_iter().rev() {
            stack.push((child, depth + 1));
        }
    }

    for err in graph.errors() {
        eprintln!("warning: {err}");
    }
}
