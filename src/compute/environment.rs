use crate::camera::Camera2D;
use crate::compute::functions::{number_to_string, string_to_number};
use crate::compute::operator::EnvironmentFunction;
use crate::events::{EventBus, StageEvent};
use crate::stage::entity::EntityId;
use crate::stage::manager::StageManager;
use glam::Vec2;

/// Everything outside the entity graph that environment functions may read or write.
pub struct ComputeEnvironment<'a> {
    pub camera: &'a mut Camera2D,
    pub mouse_world: Vec2,
    pub now_millis: f64,
    pub events: &'a mut EventBus,
}

/// Run an environment function. `parents` and `children` are the operator node's
/// text-node neighbours in ascending x order.
pub fn call_environment(
    function: EnvironmentFunction,
    stage: &mut StageManager,
    env: &mut ComputeEnvironment<'_>,
    parents: &[EntityId],
    children: &[EntityId],
) -> Vec<String> {
    match function {
        EnvironmentFunction::Rgb => {
            let [r, g, b] = channels::<3>(stage, parents);
            vec![format!("rgb({r}, {g}, {b})")]
        }
        EnvironmentFunction::Rgba => {
            let [r, g, b] = channels::<3>(stage, parents);
            let alpha = parent_numbers(stage, parents).get(3).copied().unwrap_or(1.0).clamp(0.0, 1.0);
            vec![format!("rgba({r}, {g}, {b}, {})", number_to_string(alpha))]
        }
        EnvironmentFunction::GetLocation => match first_box(stage, parents) {
            Some(rect) => vec2_strings(rect.location),
            None => Vec::new(),
        },
        EnvironmentFunction::GetSize => match first_box(stage, parents) {
            Some(rect) => vec2_strings(rect.size),
            None => Vec::new(),
        },
        EnvironmentFunction::SetLocation => {
            let Some(location) = parent_vec2(stage, parents) else {
                return Vec::new();
            };
            for child in children {
                if stage.move_entity_to(*child, location) {
                    env.events.push(StageEvent::EntityMoved { entity: *child });
                }
            }
            Vec::new()
        }
        EnvironmentFunction::GetMouseLocation => vec2_strings(env.mouse_world),
        EnvironmentFunction::GetCameraLocation => vec2_strings(env.camera.position),
        EnvironmentFunction::SetCameraLocation => {
            if let Some(location) = parent_vec2(stage, parents) {
                env.camera.set_position(location);
                env.events.push(StageEvent::CameraMoved);
            }
            Vec::new()
        }
        EnvironmentFunction::GetCameraScale => vec![number_to_string(f64::from(env.camera.zoom))],
        EnvironmentFunction::SetCameraScale => {
            if let Some(scale) = parent_numbers(stage, parents).first() {
                env.camera.set_zoom(*scale as f32);
                env.events.push(StageEvent::CameraMoved);
            }
            Vec::new()
        }
        EnvironmentFunction::IsCollision => {
            let boxes: Vec<_> = parents.iter().filter_map(|id| stage.collision_box(*id)).collect();
            let hit = match boxes.split_first() {
                Some((first, rest)) => rest.iter().any(|other| first.intersects(other)),
                None => false,
            };
            let flag = if hit { "1" } else { "0" };
            vec![flag.to_string()]
        }
        EnvironmentFunction::GetTime => vec![number_to_string(env.now_millis)],
    }
}

fn parent_numbers(stage: &StageManager, parents: &[EntityId]) -> Vec<f64> {
    parents.iter().filter_map(|id| stage.text_node(*id)).map(|node| string_to_number(&node.text)).collect()
}

fn parent_vec2(stage: &StageManager, parents: &[EntityId]) -> Option<Vec2> {
    match parent_numbers(stage, parents).as_slice() {
        [x, y, ..] => Some(Vec2::new(*x as f32, *y as f32)),
        _ => None,
    }
}

fn channels<const N: usize>(stage: &StageManager, parents: &[EntityId]) -> [u8; N] {
    let numbers = parent_numbers(stage, parents);
    std::array::from_fn(|i| numbers.get(i).copied().unwrap_or(0.0).round().clamp(0.0, 255.0) as u8)
}

fn first_box(stage: &StageManager, parents: &[EntityId]) -> Option<crate::geometry::Rectangle> {
    parents.first().and_then(|id| stage.collision_box(*id))
}

fn vec2_strings(value: Vec2) -> Vec<String> {
    vec![number_to_string(f64::from(value.x)), number_to_string(f64::from(value.y))]
}
