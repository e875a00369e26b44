use crate::geometry::Rectangle;
use crate::stage::entity::EntityId;
use std::fmt;

/// Notifications for the excluded renderer/effects layer. Fire-and-forget.
#[derive(Debug, Clone, PartialEq)]
pub enum StageEvent {
    OperatorHighlighted { entity: EntityId, rect: Rectangle },
    NodeRenamed { entity: EntityId, text: String },
    EntityMoved { entity: EntityId },
    CameraMoved,
}

impl fmt::Display for StageEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageEvent::OperatorHighlighted { entity, rect } => {
                write!(
                    f,
                    "OperatorHighlighted entity={} at=({:.1}, {:.1}) size=({:.1}, {:.1})",
                    entity, rect.location.x, rect.location.y, rect.size.x, rect.size.y
                )
            }
            StageEvent::NodeRenamed { entity, text } => write!(f, "NodeRenamed entity={entity} text={text:?}"),
            StageEvent::EntityMoved { entity } => write!(f, "EntityMoved entity={entity}"),
            StageEvent::CameraMoved => write!(f, "CameraMoved"),
        }
    }
}

#[derive(Debug, Default)]
pub struct EventBus {
    events: Vec<StageEvent>,
}

impl EventBus {
    pub fn push(&mut self, event: StageEvent) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<StageEvent> {
        self.events.drain(..).collect()
    }

    pub fn pending(&self) -> &[StageEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
