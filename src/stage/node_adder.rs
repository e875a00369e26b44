//! Factory operations that create nodes from user gestures: a click, a pasted block
//! of indented text, or a routing point dropped into sections.

use crate::config::{NodeConfig, TextTreeConfig};
use crate::stage::entity::{ConnectPoint, EntityId, TextNode};
use crate::stage::manager::{StageError, StageManager};
use chrono::NaiveDateTime;
use glam::Vec2;
use std::collections::HashSet;
use tracing::debug;

/// Nodes created by [`add_node_by_text`]. `nodes` follows line order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextTree {
    pub root: EntityId,
    pub nodes: Vec<EntityId>,
}

/// Create a node centered on `location`, named from the configured template.
pub fn add_node_by_click(
    stage: &mut StageManager,
    location: Vec2,
    config: &NodeConfig,
    now: NaiveDateTime,
) -> Result<EntityId, StageError> {
    let name = {
        let existing: HashSet<&str> = stage.text_nodes().into_iter().map(|node| node.text.as_str()).collect();
        auto_name(&config.auto_name_template, &existing, now)
    };
    let size = config.default_size();
    let node = TextNode::new(name, location - size / 2.0, size);
    stage.add_text_node(node)
}

/// Build a node tree from indented text.
///
/// A root node stands in for indentation level `-1`. Each non-blank line becomes a node
/// at `(level * spacing_x, line_index * spacing_y) + offset` and is connected under the
/// nearest preceding line with a strictly smaller level.
pub fn add_node_by_text(
    stage: &mut StageManager,
    text: &str,
    indent_unit: usize,
    offset: Vec2,
    config: &TextTreeConfig,
    node_size: Vec2,
) -> Result<TextTree, StageError> {
    let spacing = Vec2::new(config.spacing_x, config.spacing_y);
    let root_location = offset - spacing;
    let root = stage.add_text_node(TextNode::new(config.root_text.clone(), root_location, node_size))?;

    let mut stack: Vec<(EntityId, isize)> = vec![(root, -1)];
    let mut nodes = Vec::new();
    for (line_index, line) in text.lines().enumerate() {
        let content = line.trim();
        if content.is_empty() {
            continue;
        }
        let level = indent_level(line, indent_unit);
        let location = Vec2::new(level as f32 * spacing.x, line_index as f32 * spacing.y) + offset;
        let id = stage.add_text_node(TextNode::new(content, location, node_size))?;

        let level = level as isize;
        while stack.last().is_some_and(|(_, top)| *top >= level) {
            stack.pop();
        }
        let parent = stack.last().map(|(parent, _)| *parent).unwrap_or(root);
        stage.connect_entity(parent, id)?;
        stack.push((id, level));
        nodes.push(id);
    }
    debug!(root = %root, nodes = nodes.len(), "text tree added");
    Ok(TextTree { root, nodes })
}

/// Add a connect point and register it as a child of every listed section.
/// Sections are validated up front so a bad id leaves the stage untouched.
pub fn add_connect_point(
    stage: &mut StageManager,
    location: Vec2,
    sections: &[EntityId],
) -> Result<EntityId, StageError> {
    for section in sections {
        if stage.section(*section).is_none() {
            return Err(if stage.contains(*section) {
                StageError::NotASection(*section)
            } else {
                StageError::EntityNotFound(*section)
            });
        }
    }
    let id = stage.add_connect_point(ConnectPoint::new(location))?;
    for section in sections {
        stage.add_to_section(*section, id)?;
    }
    Ok(id)
}

/// Leading spaces count one unit each and tabs count `indent_unit`; the total is
/// floor-divided by `indent_unit`. A zero unit is treated as one.
pub fn indent_level(line: &str, indent_unit: usize) -> usize {
    let unit = indent_unit.max(1);
    let mut width = 0;
    for ch in line.chars() {
        match ch {
            ' ' => width += 1,
            '\t' => width += unit,
            _ => break,
        }
    }
    width / unit
}

/// Resolve `{{date}}`, `{{time}}` and `{{i}}` in a name template. `{{i}}` takes the
/// smallest non-negative integer whose name is not in `existing`; the search is bounded
/// by the size of `existing`.
pub fn auto_name(template: &str, existing: &HashSet<&str>, now: NaiveDateTime) -> String {
    let base = template
        .replace("{{date}}", &now.format("%Y-%m-%d").to_string())
        .replace("{{time}}", &now.format("%H:%M:%S").to_string());
    if !base.contains("{{i}}") {
        return base;
    }
    (0..=existing.len())
        .map(|i| base.replace("{{i}}", &i.to_string()))
        .find(|candidate| !existing.contains(candidate.as_str()))
        .unwrap_or_else(|| base.replace("{{i}}", &existing.len().to_string()))
}
