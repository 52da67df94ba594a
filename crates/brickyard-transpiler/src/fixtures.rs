//! Component builders shared by tests.

use brickyard_core::ComponentId;
use brickyard_core::model::{Argument, Brick, BrickResult, Component, Container, Data, Implementation};
use uuid::Uuid;

/// A deterministic component identifier.
pub(crate) fn id(n: u128) -> ComponentId {
    ComponentId::from_uuid(Uuid::from_u128(n))
}

/// An alpine container.
pub(crate) fn alpine() -> Container {
    Container::new("alpine").with_command(["sh", "-c"])
}

/// A brick writing parameter `value`, optionally reading parameter `input`.
pub(crate) fn value_brick(n: u128, input: Option<&str>) -> Component {
    let mut brick = Brick::new(alpine())
        .with_arg(Argument::literal("echo"))
        .with_result(BrickResult::file("value", "/tmp/value"));
    if let Some(input) = input {
        brick = brick.with_arg(Argument::port(input));
    }

    let component = Component::new(id(n), format!("brick-{n}"), Implementation::Brick(brick))
        .with_output(Data::parameter("value"));
    match input {
        Some(input) => component.with_input(Data::parameter(input)),
        None => component,
    }
}
