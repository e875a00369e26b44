use crate::geometry::Rectangle;
use crate::stage::entity::{ConnectPoint, Edge, Entity, EntityId, EntityKind, Section, TextNode};
use crate::stage::snapshot::StageSnapshot;
use glam::Vec2;
use indexmap::IndexMap;
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageError {
    #[error("entity {0} is already registered")]
    DuplicateEntity(EntityId),
    #[error("entity {0} does not exist")]
    EntityNotFound(EntityId),
    #[error("entity {0} is not a section")]
    NotASection(EntityId),
    #[error("entity {0} is an edge and cannot be connected")]
    NotConnectable(EntityId),
}

/// Owner of every entity on the stage and the single source of truth for connectivity.
///
/// Connectable entities and edges live in insertion-ordered arenas keyed by [`EntityId`].
/// Parent/child relations are derived on demand by scanning the edge arena.
#[derive(Debug, Default)]
pub struct StageManager {
    entities: IndexMap<EntityId, Entity>,
    edges: IndexMap<EntityId, Edge>,
}

impl StageManager {
    pub fn new() -> Self {
        Self::default()
    }

    // ---------- Registration ----------

    pub fn add_entity(&mut self, entity: Entity) -> Result<EntityId, StageError> {
        let id = entity.id();
        if self.contains(id) {
            return Err(StageError::DuplicateEntity(id));
        }
        debug!(entity = %id, kind = entity.kind().label(), "entity added");
        self.entities.insert(id, entity);
        Ok(id)
    }

    pub fn add_text_node(&mut self, node: TextNode) -> Result<EntityId, StageError> {
        self.add_entity(Entity::TextNode(node))
    }

    /// Alias kept for callers that think of every text-bearing entity as a "node".
    pub fn add_node(&mut self, node: TextNode) -> Result<EntityId, StageError> {
        self.add_text_node(node)
    }

    pub fn add_connect_point(&mut self, point: ConnectPoint) -> Result<EntityId, StageError> {
        self.add_entity(Entity::ConnectPoint(point))
    }

    pub fn add_section(&mut self, section: Section) -> Result<EntityId, StageError> {
        for child in &section.children {
            if !self.entities.contains_key(child) {
                return Err(StageError::EntityNotFound(*child));
            }
        }
        let id = self.add_entity(Entity::Section(section))?;
        self.adjust_section(id)?;
        Ok(id)
    }

    /// Create a directed edge. Parallel edges and self-loops are allowed.
    pub fn connect_entity(&mut self, source: EntityId, target: EntityId) -> Result<EntityId, StageError> {
        for endpoint in [source, target] {
            if self.edges.contains_key(&endpoint) {
                return Err(StageError::NotConnectable(endpoint));
            }
            if !self.entities.contains_key(&endpoint) {
                return Err(StageError::EntityNotFound(endpoint));
            }
        }
        let edge = Edge::new(source, target);
        let id = edge.id;
        debug!(edge = %id, %source, %target, "entities connected");
        self.edges.insert(id, edge);
        Ok(id)
    }

    pub fn connect_entity_with_text(
        &mut self,
        source: EntityId,
        target: EntityId,
        text: impl Into<String>,
    ) -> Result<EntityId, StageError> {
        let id = self.connect_entity(source, target)?;
        if let Some(edge) = self.edges.get_mut(&id) {
            edge.text = text.into();
        }
        Ok(id)
    }

    // ---------- Removal ----------

    /// Remove an entity together with its incident edges and any section membership.
    /// Edges are removed through [`StageManager::remove_edge`].
    pub fn remove_entity(&mut self, id: EntityId) -> Option<Entity> {
        let removed = self.entities.shift_remove(&id)?;
        let before = self.edges.len();
        self.edges.retain(|_, edge| !edge.is_incident_to(id));
        let mut touched_sections = Vec::new();
        for entity in self.entities.values_mut() {
            if let Entity::Section(section) = entity {
                let len = section.children.len();
                section.children.retain(|child| *child != id);
                if section.children.len() != len {
                    touched_sections.push(section.id);
                }
            }
        }
        for section in touched_sections {
            self.refit_section(section);
        }
        debug!(entity = %id, dropped_edges = before - self.edges.len(), "entity removed");
        Some(removed)
    }

    pub fn remove_edge(&mut self, id: EntityId) -> Option<Edge> {
        let removed = self.edges.shift_remove(&id);
        if removed.is_some() {
            debug!(edge = %id, "edge removed");
        }
        removed
    }

    pub fn remove_selected(&mut self) -> usize {
        let selected = self.selected_entities();
        let mut removed = 0;
        for id in selected {
            if self.edges.contains_key(&id) {
                if self.remove_edge(id).is_some() {
                    removed += 1;
                }
            } else if self.remove_entity(id).is_some() {
                removed += 1;
            }
        }
        removed
    }

    /// Drop every entity, edge and selection flag.
    pub fn destroy(&mut self) {
        debug!(entities = self.entities.len(), edges = self.edges.len(), "stage destroyed");
        self.entities.clear();
        self.edges.clear();
    }

    // ---------- Queries ----------

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id) || self.edges.contains_key(&id)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn kind_of(&self, id: EntityId) -> Option<EntityKind> {
        if self.edges.contains_key(&id) {
            return Some(EntityKind::Edge);
        }
        self.entities.get(&id).map(Entity::kind)
    }

    pub fn text_node(&self, id: EntityId) -> Option<&TextNode> {
        self.entities.get(&id).and_then(Entity::as_text_node)
    }

    pub fn text_node_mut(&mut self, id: EntityId) -> Option<&mut TextNode> {
        match self.entities.get_mut(&id) {
            Some(Entity::TextNode(node)) => Some(node),
            _ => None,
        }
    }

    pub fn section(&self, id: EntityId) -> Option<&Section> {
        self.entities.get(&id).and_then(Entity::as_section)
    }

    pub fn edge(&self, id: EntityId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    pub fn entities(&self) -> Vec<&Entity> {
        self.entities.values().collect()
    }

    pub fn text_nodes(&self) -> Vec<&TextNode> {
        self.entities.values().filter_map(Entity::as_text_node).collect()
    }

    pub fn sections(&self) -> Vec<&Section> {
        self.entities.values().filter_map(Entity::as_section).collect()
    }

    pub fn connect_points(&self) -> Vec<&ConnectPoint> {
        self.entities
            .values()
            .filter_map(|entity| match entity {
                Entity::ConnectPoint(point) => Some(point),
                _ => None,
            })
            .collect()
    }

    pub fn edges(&self) -> Vec<&Edge> {
        self.edges.values().collect()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn collision_box(&self, id: EntityId) -> Option<Rectangle> {
        if let Some(edge) = self.edges.get(&id) {
            return self.edge_collision_box(edge);
        }
        self.entities.get(&id).map(Entity::collision_box)
    }

    /// Box spanning the centers of both endpoints; `None` when an endpoint is gone.
    pub fn edge_collision_box(&self, edge: &Edge) -> Option<Rectangle> {
        let source = self.entities.get(&edge.source)?.collision_box();
        let target = self.entities.get(&edge.target)?.collision_box();
        Some(Rectangle::from_points(source.center(), target.center()))
    }

    // ---------- Connectivity ----------

    /// Text nodes feeding into `id`, ordered by ascending x of their collision box.
    /// Equal x keeps edge insertion order.
    pub fn parent_text_nodes(&self, id: EntityId) -> Vec<EntityId> {
        let sources = self.edges.values().filter(|edge| edge.target == id).map(|edge| edge.source);
        self.sorted_text_nodes(sources)
    }

    /// Text nodes fed by `id`, ordered by ascending x of their collision box.
    pub fn child_text_nodes(&self, id: EntityId) -> Vec<EntityId> {
        let targets = self.edges.values().filter(|edge| edge.source == id).map(|edge| edge.target);
        self.sorted_text_nodes(targets)
    }

    pub fn parent_entities(&self, id: EntityId) -> Vec<EntityId> {
        dedup(self.edges.values().filter(|edge| edge.target == id).map(|edge| edge.source))
    }

    pub fn child_entities(&self, id: EntityId) -> Vec<EntityId> {
        dedup(self.edges.values().filter(|edge| edge.source == id).map(|edge| edge.target))
    }

    pub fn edges_between(&self, source: EntityId, target: EntityId) -> Vec<EntityId> {
        self.edges
            .values()
            .filter(|edge| edge.source == source && edge.target == target)
            .map(|edge| edge.id)
            .collect()
    }

    /// Whether the subgraph reachable from `root` along outgoing edges is a tree: every
    /// reachable entity is reached by exactly one edge and nothing points back at the root.
    pub fn is_tree(&self, root: EntityId) -> bool {
        if !self.entities.contains_key(&root) {
            return false;
        }
        let mut visited = HashSet::new();
        visited.insert(root);
        let mut stack = vec![root];
        while let Some(current) = stack.pop() {
            for edge in self.edges.values().filter(|edge| edge.source == current) {
                if !visited.insert(edge.target) {
                    return false;
                }
                stack.push(edge.target);
            }
        }
        true
    }

    fn sorted_text_nodes(&self, ids: impl Iterator<Item = EntityId>) -> Vec<EntityId> {
        let mut nodes: Vec<(EntityId, f32)> = dedup(ids)
            .into_iter()
            .filter_map(|id| self.text_node(id).map(|node| (id, node.rect.location.x)))
            .collect();
        nodes.sort_by(|a, b| a.1.total_cmp(&b.1));
        nodes.into_iter().map(|(id, _)| id).collect()
    }

    // ---------- Mutation ----------

    /// Set the text of a node, section or edge. Returns `true` when it changed.
    pub fn rename(&mut self, id: EntityId, text: impl Into<String>) -> bool {
        let text = text.into();
        if let Some(edge) = self.edges.get_mut(&id) {
            if edge.text == text {
                return false;
            }
            edge.text = text;
            return true;
        }
        match self.entities.get_mut(&id) {
            Some(Entity::TextNode(node)) => node.rename(text),
            Some(Entity::Section(section)) => {
                if section.text == text {
                    return false;
                }
                section.text = text;
                true
            }
            _ => false,
        }
    }

    pub fn move_entity(&mut self, id: EntityId, delta: Vec2) -> bool {
        let Some(entity) = self.entities.get_mut(&id) else {
            return false;
        };
        entity.move_by(delta);
        self.refit_sections_containing(id);
        true
    }

    pub fn move_entity_to(&mut self, id: EntityId, location: Vec2) -> bool {
        let Some(current) = self.entities.get(&id).map(|entity| entity.collision_box().location) else {
            return false;
        };
        self.move_entity(id, location - current)
    }

    pub fn add_to_section(&mut self, section: EntityId, child: EntityId) -> Result<(), StageError> {
        if section == child {
            return Err(StageError::NotConnectable(child));
        }
        if !self.entities.contains_key(&child) {
            return Err(StageError::EntityNotFound(child));
        }
        match self.entities.get_mut(&section) {
            Some(Entity::Section(target)) => {
                if !target.children.contains(&child) {
                    target.children.push(child);
                }
            }
            Some(_) => return Err(StageError::NotASection(section)),
            None => return Err(StageError::EntityNotFound(section)),
        }
        self.adjust_section(section)
    }

    /// Recompute a section's rectangle so it contains all of its children.
    pub fn adjust_section(&mut self, section: EntityId) -> Result<(), StageError> {
        match self.entities.get(&section).map(Entity::kind) {
            Some(EntityKind::Section) => {}
            Some(_) => return Err(StageError::NotASection(section)),
            None => return Err(StageError::EntityNotFound(section)),
        }
        self.refit_section(section);
        Ok(())
    }

    /// No-op unless `section` is a registered section.
    fn refit_section(&mut self, section: EntityId) {
        let Some(children) = self.section(section).map(|target| target.children.clone()) else {
            return;
        };
        let boxes: Vec<Rectangle> =
            children.iter().filter_map(|child| self.entities.get(child).map(Entity::collision_box)).collect();
        if let Some(Entity::Section(target)) = self.entities.get_mut(&section) {
            target.adjust_location_and_size(boxes.iter());
        }
    }

    fn refit_sections_containing(&mut self, id: EntityId) {
        let mut pending: Vec<EntityId> = self
            .entities
            .values()
            .filter_map(Entity::as_section)
            .filter(|section| section.children.contains(&id))
            .map(|section| section.id)
            .collect();
        let mut seen = HashSet::new();
        while let Some(section) = pending.pop() {
            if !seen.insert(section) {
                continue;
            }
            self.refit_section(section);
            pending.extend(
                self.entities
                    .values()
                    .filter_map(Entity::as_section)
                    .filter(|outer| outer.children.contains(&section))
                    .map(|outer| outer.id),
            );
        }
    }

    // ---------- Selection ----------

    pub fn select(&mut self, id: EntityId) -> bool {
        self.set_selected(id, true)
    }

    pub fn deselect(&mut self, id: EntityId) -> bool {
        self.set_selected(id, false)
    }

    fn set_selected(&mut self, id: EntityId, selected: bool) -> bool {
        if let Some(edge) = self.edges.get_mut(&id) {
            edge.is_selected = selected;
            return true;
        }
        match self.entities.get_mut(&id) {
            Some(entity) => {
                entity.set_selected(selected);
                true
            }
            None => false,
        }
    }

    pub fn select_all(&mut self) {
        self.entities.values_mut().for_each(|entity| entity.set_selected(true));
        self.edges.values_mut().for_each(|edge| edge.is_selected = true);
    }

    pub fn clear_selection(&mut self) {
        self.entities.values_mut().for_each(|entity| entity.set_selected(false));
        self.edges.values_mut().for_each(|edge| edge.is_selected = false);
    }

    /// Selected connectable entities followed by selected edges.
    pub fn selected_entities(&self) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|entity| entity.is_selected())
            .map(Entity::id)
            .chain(self.edges.values().filter(|edge| edge.is_selected).map(|edge| edge.id))
            .collect()
    }

    pub fn snapshot(&self) -> StageSnapshot {
        StageSnapshot::capture(self)
    }
}

fn dedup(ids: impl Iterator<Item = EntityId>) -> Vec<EntityId> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).collect()
}
