use crate::core::association::container::{Container, ContainerId, ContainerKind};

pub fn budget(id: ContainerId) -> Container {
    Container::new(id, ContainerKind::Budget)
}

pub fn category(id: ContainerId) -> Container {
    Container::new(id, ContainerKind::Category)
}

pub fn payment_method(id: ContainerId) -> Container {
    Container::new(id, ContainerKind::PaymentMethod)
}
