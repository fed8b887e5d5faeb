// src/main.rs
use std::process::ExitCode;

use aco_botma::config::Config;
use aco_botma::data_generator::{generate_scenario, ScenarioConfig};
use aco_botma::{AntColonySolver, BotmaError, ObservationSet, ParameterSpace, SolverResult};
use clap::Parser;
use tracing::{debug, error, info};

fn main() -> ExitCode {
    let config = Config::parse();
    init_logging(config.debug);

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<(), BotmaError> {
    // 所有配置错误都在搜索开始前报告
    let model = config.trajectory_model()?;
    let space = config.parameter_space()?;
    let solver_config = config.solver_config()?;

    let observations = load_observations(config, &space)?;
    let solver = AntColonySolver::new(model, space, solver_config)?;

    println!("Running ACO minimisation...");
    let result = solver.run(&observations);

    print_result(&solver, &observations, &result);
    Ok(())
}

fn load_observations(
    config: &Config,
    space: &ParameterSpace,
) -> Result<ObservationSet, BotmaError> {
    let observations = match &config.csv {
        Some(path) if !config.simulate => {
            let set = ObservationSet::from_csv_path(path)?;
            info!("Data successfully loaded. Total entries: {}", set.len());
            set
        }
        _ => {
            // 目标真实参数取参数空间中点
            let true_theta: Vec<f64> = space
                .bounds()
                .iter()
                .map(|&(lower, upper)| 0.5 * (lower + upper))
                .collect();
            let scenario = ScenarioConfig {
                model: config.trajectory_model()?,
                true_theta,
                ..ScenarioConfig::default()
            };
            let (theta, set) = generate_scenario(&scenario, config.seed)?;
            info!("Simulated {} observations, true parameters {:?}", set.len(), theta);
            set
        }
    };

    match config.sampling_time {
        Some(dt) => observations.with_uniform_sampling(dt),
        None => Ok(observations),
    }
}

fn print_result(solver: &AntColonySolver, observations: &ObservationSet, result: &SolverResult) {
    let solution: Vec<String> = result.best.iter().map(|v| v.to_string()).collect();
    println!("Best Solution: {}", solution.join(" "));
    println!("Best Fitness: {:.6}", result.best_fitness);

    let residuals = solver.objective().residuals(&result.best, observations);
    let max_residual = residuals.iter().fold(0.0_f64, |acc, r| acc.max(r.abs()));
    debug!(
        "Stopped by {:?} after {}/{} iterations, max |residual| = {:.6} rad",
        result.stop_reason,
        result.iterations_run,
        solver.config().iterations,
        max_residual
    );
    println!("Elapsed Time: {:.2} seconds", result.elapsed.as_secs_f64());
}

/// 初始化日志，`--debug` 时输出每轮最优适应度
fn init_logging(debug: bool) {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(level)
        .init();
}
