// src/config.rs

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::botma_errors::BotmaError;
use crate::parameter_space::{ParamSet, ParameterSpace};
use crate::solver::{Execution, SamplingMode, SolverConfig};
use crate::trajectory_model::{TrajectoryModel, KINEMATIC_DIMENSIONS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModelKind {
    /// 截断泰勒展开，阶数由 --numvars 决定
    Polynomial,
    /// 固定 6 参数运动学模型
    Kinematic,
}

/// ACO BOTMA 命令行配置
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Ant-colony bearings-only target motion analysis",
    long_about = None
)]
pub struct Config {
    /// Input CSV: header row, then time, ownship_x, ownship_y, measure
    #[arg(long, value_name = "FILE", required_unless_present = "simulate")]
    pub csv: Option<PathBuf>,

    /// Generate a noise-free synthetic scenario instead of reading a CSV
    #[arg(long, default_value_t = false)]
    pub simulate: bool,

    /// Number of polynomial coefficients (ignored by the kinematic model)
    #[arg(long, default_value_t = 6, value_parser = parse_numvars)]
    pub numvars: usize,

    /// Parameter range preset: 0/near-linear, 1/polynomial, 2/kinematic
    #[arg(long, default_value = "0")]
    pub param_set: String,

    #[arg(long, value_enum, default_value_t = ModelKind::Polynomial)]
    pub model: ModelKind,

    /// Seed of the single random stream
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    #[arg(long, default_value_t = 100)]
    pub ant_count: usize,

    #[arg(long, default_value_t = 1000)]
    pub iterations: usize,

    #[arg(long, default_value_t = 0.1)]
    pub evaporation_rate: f64,

    /// Enables pheromone-biased sampling with this exploration probability
    #[arg(long)]
    pub epsilon: Option<f64>,

    /// Evaluate ants of one iteration in parallel
    #[arg(long, default_value_t = false)]
    pub parallel: bool,

    /// Stop after this many iterations without improvement
    #[arg(long)]
    pub plateau_patience: Option<NonZeroUsize>,

    /// Wall-clock limit, checked after each iteration
    #[arg(long, value_name = "SECS")]
    pub time_limit_secs: Option<f64>,

    /// Replace the time column by (i + 1) * SAMPLING_TIME
    #[arg(long, value_name = "SAMPLING_TIME")]
    pub sampling_time: Option<f64>,

    /// Per-iteration logging (DEBUG level)
    #[arg(long, short, default_value_t = false)]
    pub debug: bool,
}

fn parse_numvars(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(n @ (4 | 6 | 8)) => Ok(n),
        _ => Err(format!("must be 4, 6, or 8, got '{s}'")),
    }
}

impl Config {
    /// 选定的轨迹模型。
    pub fn trajectory_model(&self) -> Result<TrajectoryModel, BotmaError> {
        match self.model {
            ModelKind::Polynomial => TrajectoryModel::polynomial(self.numvars),
            ModelKind::Kinematic => Ok(TrajectoryModel::Kinematic),
        }
    }

    /// 按模型维数从预置表中取参数空间。
    pub fn parameter_space(&self) -> Result<ParameterSpace, BotmaError> {
        let preset: ParamSet = self.param_set.parse()?;
        let dims = match self.model {
            ModelKind::Polynomial => self.numvars,
            ModelKind::Kinematic => KINEMATIC_DIMENSIONS,
        };
        ParameterSpace::bounds_for(dims, preset)
    }

    pub fn solver_config(&self) -> Result<SolverConfig, BotmaError> {
        let sampling = match self.epsilon {
            Some(epsilon) => SamplingMode::PheromoneBiased { epsilon },
            None => SamplingMode::Unbiased,
        };
        let execution = if self.parallel {
            Execution::Parallel
        } else {
            Execution::Sequential
        };
        let time_limit = self
            .time_limit_secs
            .map(Duration::try_from_secs_f64)
            .transpose()
            .map_err(|_| {
                BotmaError::InvalidTimeLimit(self.time_limit_secs.unwrap_or_default())
            })?;

        let config = SolverConfig {
            ant_count: self.ant_count,
            iterations: self.iterations,
            evaporation_rate: self.evaporation_rate,
            sampling,
            seed: self.seed,
            execution,
            plateau_patience: self.plateau_patience,
            time_limit,
        };
        config.validate()?;
        Ok(config)
    }
}
