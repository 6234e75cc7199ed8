//! Genetic search over turbine layouts.
//!
//! One generation is evaluate → controller update → select → crossover →
//! mutate → repair; [`runner::LayoutOptimizer`] drives the loop and
//! records a [`history::GenerationRecord`] per generation.

pub mod crossover;
pub mod fuzzy;
pub mod history;
pub mod mutation;
pub mod repair;
pub mod runner;
pub mod selection;

pub use fuzzy::{AdaptiveController, ControllerState, OperatorPlan, Trend};
pub use history::{BestLayout, GenerationRecord, RunHistory, StopReason};
pub use runner::{LayoutOptimizer, NoProgress, ProgressCallback};
