use anyhow::{Context, Result};
use glam::Vec2;
use kestrel_stage::cli::{ToolArgs, ToolCommand};
use kestrel_stage::stage::{EntityId, Stage, TextTree};
use kestrel_stage::StageConfig;
use std::fs;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();
    if let Err(err) = run() {
        eprintln!("error: {err:?}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = ToolArgs::parse_from_env()?;
    let Some(input) = args.input.as_deref() else {
        print_usage();
        return Ok(());
    };
    let config = match args.config.as_deref() {
        Some(path) => StageConfig::load(path)?,
        None => StageConfig::default(),
    };
    let indent = args.indent.unwrap_or(config.text_tree.indent_unit);
    let text = fs::read_to_string(input).with_context(|| format!("reading '{input}'"))?;

    let mut stage = Stage::new(config);
    let tree = stage.add_node_by_text(&text, indent, Vec2::ZERO)?;
    match args.command {
        ToolCommand::Tree => print_tree(&stage, &tree),
        ToolCommand::Eval => {
            for _ in 0..args.ticks {
                let report = stage.auto_compute_engine_tick();
                eprintln!(
                    "[tick] nodes={} sections={} edges={} writes={}",
                    report.nodes, report.sections, report.edges, report.writes
                );
            }
            stage.drain_events();
            if args.json {
                println!("{}", stage.manager.snapshot().to_json_pretty()?);
            } else {
                print_tree(&stage, &tree);
            }
        }
        ToolCommand::Help => print_usage(),
    }
    Ok(())
}

fn print_usage() {
    eprintln!(
        "Stage Tool

Usage:
  stage_tool tree <file> [--indent N] [--config <json>]            Build a node tree from indented text
  stage_tool eval <file> [--indent N] [--ticks N] [--json] [--config <json>]
                                                                   Build the tree and run compute ticks
  stage_tool help                                                  Show this message
"
    );
}

fn print_tree(stage: &Stage, tree: &TextTree) {
    let is_tree = if stage.manager.is_tree(tree.root) { "yes" } else { "no" };
    println!("nodes: {}  edges: {}  tree: {}", tree.nodes.len() + 1, stage.manager.edge_count(), is_tree);
    print_subtree(stage, tree.root, 0);
}

fn print_subtree(stage: &Stage, id: EntityId, depth: usize) {
    let Some(node) = stage.manager.text_node(id) else {
        return;
    };
    println!("{}{}", "  ".repeat(depth), node.text);
    for child in stage.manager.child_text_nodes(id) {
        print_subtree(stage, child, depth + 1);
    }
}
