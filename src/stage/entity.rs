use crate::geometry::Rectangle;
use glam::Vec2;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub const CONNECT_POINT_SIZE: f32 = 1.0;
pub const SECTION_PADDING: f32 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(Uuid);

impl EntityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for EntityId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    TextNode,
    Section,
    ConnectPoint,
    Edge,
}

impl EntityKind {
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::TextNode => "TextNode",
            EntityKind::Section => "Section",
            EntityKind::ConnectPoint => "ConnectPoint",
            EntityKind::Edge => "Edge",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    pub id: EntityId,
    pub text: String,
    pub details: String,
    pub rect: Rectangle,
    pub is_selected: bool,
}

impl TextNode {
    pub fn new(text: impl Into<String>, location: Vec2, size: Vec2) -> Self {
        Self {
            id: EntityId::new(),
            text: text.into(),
            details: String::new(),
            rect: Rectangle::new(location, size),
            is_selected: false,
        }
    }

    /// Returns `true` when the text actually changed.
    pub fn rename(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        if self.text == text {
            return false;
        }
        self.text = text;
        true
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub id: EntityId,
    pub text: String,
    pub rect: Rectangle,
    pub children: Vec<EntityId>,
    pub is_collapsed: bool,
    pub is_selected: bool,
}

impl Section {
    pub fn new(text: impl Into<String>, rect: Rectangle) -> Self {
        Self {
            id: EntityId::new(),
            text: text.into(),
            rect,
            children: Vec::new(),
            is_collapsed: false,
            is_selected: false,
        }
    }

    /// Refit the section around the given child boxes. An empty section keeps its rectangle.
    pub fn adjust_location_and_size<'a>(&mut self, child_boxes: impl IntoIterator<Item = &'a Rectangle>) {
        if let Some(bounds) = Rectangle::bounding(child_boxes, SECTION_PADDING) {
            self.rect = bounds;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectPoint {
    pub id: EntityId,
    pub rect: Rectangle,
    pub is_selected: bool,
}

impl ConnectPoint {
    pub fn new(location: Vec2) -> Self {
        Self {
            id: EntityId::new(),
            rect: Rectangle::centered_at(location, Vec2::splat(CONNECT_POINT_SIZE)),
            is_selected: false,
        }
    }
}

/// Directed connection between two connectable entities. Endpoints are ids into the
/// stage arena, so a removed endpoint resolves to "not found" instead of dangling.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: EntityId,
    pub source: EntityId,
    pub target: EntityId,
    pub text: String,
    pub is_selected: bool,
}

impl Edge {
    pub fn new(source: EntityId, target: EntityId) -> Self {
        Self { id: EntityId::new(), source, target, text: String::new(), is_selected: false }
    }

    pub fn is_incident_to(&self, id: EntityId) -> bool {
        self.source == id || self.target == id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    TextNode(TextNode),
    Section(Section),
    ConnectPoint(ConnectPoint),
}

impl Entity {
    pub fn id(&self) -> EntityId {
        match self {
            Entity::TextNode(node) => node.id,
            Entity::Section(section) => section.id,
            Entity::ConnectPoint(point) => point.id,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::TextNode(_) => EntityKind::TextNode,
            Entity::Section(_) => EntityKind::Section,
            Entity::ConnectPoint(_) => EntityKind::ConnectPoint,
        }
    }

    pub fn collision_box(&self) -> Rectangle {
        match self {
            Entity::TextNode(node) => node.rect,
            Entity::Section(section) => section.rect,
            Entity::ConnectPoint(point) => point.rect,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Entity::TextNode(node) => &node.text,
            Entity::Section(section) => &section.text,
            Entity::ConnectPoint(_) => "",
        }
    }

    pub fn is_selected(&self) -> bool {
        match self {
            Entity::TextNode(node) => node.is_selected,
            Entity::Section(section) => section.is_selected,
            Entity::ConnectPoint(point) => point.is_selected,
        }
    }

    pub fn set_selected(&mut self, selected: bool) {
        match self {
            Entity::TextNode(node) => node.is_selected = selected,
            Entity::Section(section) => section.is_selected = selected,
            Entity::ConnectPoint(point) => point.is_selected = selected,
        }
    }

    pub fn move_by(&mut self, delta: Vec2) {
        match self {
            Entity::TextNode(node) => node.rect = node.rect.translate(delta),
            Entity::Section(section) => section.rect = section.rect.translate(delta),
            Entity::ConnectPoint(point) => point.rect = point.rect.translate(delta),
        }
    }

    pub fn as_text_node(&self) -> Option<&TextNode> {
        match self {
            Entity::TextNode(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_section(&self) -> Option<&Section> {
        match self {
            Entity::Section(section) => Some(section),
            _ => None,
        }
    }
}

impl From<TextNode> for Entity {
    fn from(value: TextNode) -> Self {
        Entity::TextNode(value)
    }
}

impl From<Section> for Entity {
    fn from(value: Section) -> Self {
        Entity::Section(value)
    }
}

impl From<ConnectPoint> for Entity {
    fn from(value: ConnectPoint) -> Self {
        Entity::ConnectPoint(value)
    }
}
