use crate::geometry::Rectangle;
use crate::stage::entity::Entity;
use crate::stage::manager::StageManager;
use serde::{Deserialize, Serialize};

/// Read-only copy of the stage handed to an external persistence layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageSnapshot {
    #[serde(default)]
    pub entities: Vec<EntitySnapshot>,
    #[serde(default)]
    pub edges: Vec<EdgeSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntitySnapshot {
    TextNode {
        uuid: String,
        text: String,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        details: String,
        location: Vec2Data,
        size: Vec2Data,
    },
    Section {
        uuid: String,
        text: String,
        location: Vec2Data,
        size: Vec2Data,
        #[serde(default)]
        children: Vec<String>,
        #[serde(default)]
        is_collapsed: bool,
    },
    ConnectPoint {
        uuid: String,
        location: Vec2Data,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeSnapshot {
    pub uuid: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct Vec2Data {
    pub x: f32,
    pub y: f32,
}

impl StageSnapshot {
    pub fn capture(stage: &StageManager) -> Self {
        let entities = stage.entities().into_iter().map(EntitySnapshot::from).collect();
        let edges = stage
            .edges()
            .into_iter()
            .map(|edge| EdgeSnapshot {
                uuid: edge.id.to_string(),
                source: edge.source.to_string(),
                target: edge.target.to_string(),
                text: edge.text.clone(),
            })
            .collect();
        Self { entities, edges }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl From<&Entity> for EntitySnapshot {
    fn from(entity: &Entity) -> Self {
        match entity {
            Entity::TextNode(node) => {
                let (location, size) = rect_data(&node.rect);
                EntitySnapshot::TextNode {
                    uuid: node.id.to_string(),
                    text: node.text.clone(),
                    details: node.details.clone(),
                    location,
                    size,
                }
            }
            Entity::Section(section) => {
                let (location, size) = rect_data(&section.rect);
                EntitySnapshot::Section {
                    uuid: section.id.to_string(),
                    text: section.text.clone(),
                    location,
                    size,
                    children: section.children.iter().map(ToString::to_string).collect(),
                    is_collapsed: section.is_collapsed,
                }
            }
            Entity::ConnectPoint(point) => EntitySnapshot::ConnectPoint {
                uuid: point.id.to_string(),
                location: point.rect.center().into(),
            },
        }
    }
}

fn rect_data(rect: &Rectangle) -> (Vec2Data, Vec2Data) {
    (rect.location.into(), rect.size.into())
}

impl From<glam::Vec2> for Vec2Data {
    fn from(value: glam::Vec2) -> Self {
        Self { x: value.x, y: value.y }
    }
}

impl From<Vec2Data> for glam::Vec2 {
    fn from(value: Vec2Data) -> Self {
        glam::Vec2::new(value.x, value.y)
    }
}
