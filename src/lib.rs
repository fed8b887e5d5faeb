// src/lib.rs

pub mod botma_errors;
pub mod config;
pub mod data_generator;
pub mod objective;
pub mod observation;
pub mod parameter_space;
pub mod pheromone;
pub mod solver;
pub mod trajectory_model;

pub use botma_errors::BotmaError;
pub use objective::ObjectiveFunction;
pub use observation::{Observation, ObservationSet};
pub use parameter_space::{ParamSet, ParameterSpace};
pub use pheromone::PheromoneState;
pub use solver::{
    AntColonySolver, Execution, ParameterVector, SamplingMode, SolverConfig, SolverResult,
    StopReason,
};
pub use trajectory_model::TrajectoryModel;
