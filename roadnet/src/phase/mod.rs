//! Dynamic environment.
//!
//! - [`Timer`] supplies elapsed seconds
//! - [`DynamicEnvironmentHandler`] advances phase rings when its strategy
//!   decides it is time
//! - [`FixedPhaseIterationHandler`] steps every ring once per fixed duration

pub mod fixed;
pub mod handler;
pub mod timer;

pub use fixed::FixedPhaseIterationHandler;
pub use handler::{
    DynamicEnvironmentHandler, DynamicEnvironmentHandlerType, create_dynamic_environment_handler,
};
pub use timer::{ChronoTimer, ManualTimer, Timer, TimerType, create_timer};
