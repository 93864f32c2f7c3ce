// Composition root for the association sync worker.
//
// Responsibilities
// - Instantiate concrete infrastructure implementations.
// - Wire implementations into the sync engines and the member link handler.
// - Spawn one consumer per topic and stop them together.

pub mod workers;
