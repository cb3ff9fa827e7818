//! Dialog definitions, the registry that holds them, and the engine that
//! runs them turn by turn.

pub mod definition;
pub mod engine;
pub mod registry;
pub mod step;

pub use definition::{DialogDefinition, InterruptionHandler};
pub use engine::{DialogEngine, TurnTrace};
pub use registry::{DefaultHandler, DialogRegistry, RegistryBuilder};
pub use step::{ReplyStep, Step, StepContext, StepInput, StepResult};
