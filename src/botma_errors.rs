// src/botma_errors.rs

use thiserror::Error;

/// 本 crate 所有可失败操作的统一错误类型。
///
/// 配置错误与数据形状错误都在迭代开始之前报告，求解器本身不做任何恢复。
#[derive(Error, Debug)]
pub enum BotmaError {
    #[error("Unsupported number of variables: {0} (must be 4, 6 or 8)")]
    UnsupportedNumVars(usize),

    #[error("Unknown parameter set: {0}")]
    UnknownParamSet(String),

    #[error("Parameter set '{preset}' defines {available} dimensions, {requested} requested")]
    PresetTooShort {
        preset: &'static str,
        available: usize,
        requested: usize,
    },

    #[error("Invalid bounds for dimension {dim}: [{lower}, {upper}]")]
    InvalidBounds { dim: usize, lower: f64, upper: f64 },

    #[error("Dimension mismatch: model expects {expected}, parameter space has {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("Iteration count must be positive")]
    InvalidIterations,

    #[error("Ant count must be positive")]
    InvalidAntCount,

    #[error("Evaporation rate must lie in [0, 1), got {0}")]
    InvalidEvaporationRate(f64),

    #[error("Epsilon must lie in [0, 1], got {0}")]
    InvalidEpsilon(f64),

    #[error("Time limit must be a non-negative number of seconds, got {0}")]
    InvalidTimeLimit(f64),

    #[error("Sampling time must be a positive finite number of seconds, got {0}")]
    InvalidSamplingTime(f64),

    #[error("Observation set is empty")]
    EmptyObservationSet,

    #[error(
        "Observation columns have mismatched lengths: \
         time={t}, ownship_x={ox}, ownship_y={oy}, measure={bearing}"
    )]
    MismatchedColumns {
        t: usize,
        ox: usize,
        oy: usize,
        bearing: usize,
    },

    #[error("Observation {0} contains a non-finite value")]
    NonFiniteObservation(usize),

    #[error("Gaussian noise generation failed: {0:?}")]
    NoiseInjectionError(rand_distr::NormalError),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<rand_distr::NormalError> for BotmaError {
    fn from(err: rand_distr::NormalError) -> Self {
        BotmaError::NoiseInjectionError(err)
    }
}

impl PartialEq for BotmaError {
    fn eq(&self, other: &Self) -> bool {
        use BotmaError::*;
        match (self, other) {
            (UnsupportedNumVars(a), UnsupportedNumVars(b)) => a == b,
            (UnknownParamSet(a), UnknownParamSet(b)) => a == b,
            (
                PresetTooShort {
                    preset: p1,
                    available: a1,
                    requested: r1,
                },
                PresetTooShort {
                    preset: p2,
                    available: a2,
                    requested: r2,
                },
            ) => p1 == p2 && a1 == a2 && r1 == r2,
            (
                InvalidBounds {
                    dim: d1,
                    lower: l1,
                    upper: u1,
                },
                InvalidBounds {
                    dim: d2,
                    lower: l2,
                    upper: u2,
                },
            ) => d1 == d2 && l1.to_bits() == l2.to_bits() && u1.to_bits() == u2.to_bits(),
            (
                DimensionMismatch {
                    expected: e1,
                    found: f1,
                },
                DimensionMismatch {
                    expected: e2,
                    found: f2,
                },
            ) => e1 == e2 && f1 == f2,
            (InvalidEvaporationRate(a), InvalidEvaporationRate(b)) => a.to_bits() == b.to_bits(),
            (InvalidEpsilon(a), InvalidEpsilon(b)) => a.to_bits() == b.to_bits(),
            (InvalidTimeLimit(a), InvalidTimeLimit(b)) => a.to_bits() == b.to_bits(),
            (InvalidSamplingTime(a), InvalidSamplingTime(b)) => a.to_bits() == b.to_bits(),
            (
                MismatchedColumns {
                    t: t1,
                    ox: x1,
                    oy: y1,
                    bearing: b1,
                },
                MismatchedColumns {
                    t: t2,
                    ox: x2,
                    oy: y2,
                    bearing: b2,
                },
            ) => t1 == t2 && x1 == x2 && y1 == y2 && b1 == b2,
            (NonFiniteObservation(a), NonFiniteObservation(b)) => a == b,
            (NoiseInjectionError(a), NoiseInjectionError(b)) => a == b,

            // 底层错误不可比较：同一变体即视为相等
            (CsvError(_), CsvError(_)) => true,
            (IoError(_), IoError(_)) => true,

            (InvalidIterations, InvalidIterations) => true,
            (InvalidAntCount, InvalidAntCount) => true,
            (EmptyObservationSet, EmptyObservationSet) => true,

            _ => false,
        }
    }
}
