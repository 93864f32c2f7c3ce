// Shared test fixtures: event builders and seeded containers.

pub mod containers;
pub mod events {
    pub mod mutation_event;
}
