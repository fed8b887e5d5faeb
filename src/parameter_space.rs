// src/parameter_space.rs

use std::fmt;
use std::str::FromStr;

use crate::botma_errors::BotmaError;

// 手工调出的取值范围，按目标距离、航速及高阶项的物理量级设定。
const NEAR_LINEAR_BOUNDS: [(f64, f64); 8] = [
    (20000.0, 40000.0),
    (20000.0, 40000.0),
    (5.0, 10.0),
    (5.0, 10.0),
    (-0.01, 0.01),
    (-0.01, 0.01),
    (-0.0001, 0.0001),
    (-0.0001, 0.0001),
];

const POLYNOMIAL_BOUNDS: [(f64, f64); 8] = [
    (-500000.0, -200000.0),
    (2000000.0, 5000000.0),
    (0.0, 10.0),
    (0.0, 10.0),
    (0.0, 0.001),
    (-0.001, 0.0),
    (-0.00001, 0.00001),
    (-0.00001, 0.00001),
];

// 加速度维度被钉死为 0
const KINEMATIC_BOUNDS: [(f64, f64); 6] = [
    (0.0, 50000.0),
    (0.0, 50000.0),
    (-10.0, 10.0),
    (-10.0, 10.0),
    (0.0, 0.0),
    (0.0, 0.0),
];

/// 预置参数范围表。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamSet {
    #[default]
    NearLinear,
    Polynomial,
    Kinematic,
}

impl ParamSet {
    pub fn name(&self) -> &'static str {
        match self {
            ParamSet::NearLinear => "near-linear",
            ParamSet::Polynomial => "polynomial",
            ParamSet::Kinematic => "kinematic",
        }
    }

    fn table(&self) -> &'static [(f64, f64)] {
        match self {
            ParamSet::NearLinear => &NEAR_LINEAR_BOUNDS,
            ParamSet::Polynomial => &POLYNOMIAL_BOUNDS,
            ParamSet::Kinematic => &KINEMATIC_BOUNDS,
        }
    }
}

impl fmt::Display for ParamSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ParamSet {
    type Err = BotmaError;

    /// 接受编号 (`0`, `1`, `2`) 或名称。
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "near-linear" | "near_linear" => Ok(ParamSet::NearLinear),
            "1" | "polynomial" => Ok(ParamSet::Polynomial),
            "2" | "kinematic" => Ok(ParamSet::Kinematic),
            _ => Err(BotmaError::UnknownParamSet(s.to_string())),
        }
    }
}

/// 每个维度的闭区间 `[lower, upper]`。
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpace {
    bounds: Vec<(f64, f64)>,
}

impl ParameterSpace {
    /// 用自定义范围构造参数空间。
    ///
    /// 每个维度要求上下界有限且 `lower <= upper`；宽度为零的维度即被固定。
    pub fn new(bounds: Vec<(f64, f64)>) -> Result<Self, BotmaError> {
        for (dim, &(lower, upper)) in bounds.iter().enumerate() {
            if !lower.is_finite() || !upper.is_finite() || lower > upper {
                return Err(BotmaError::InvalidBounds { dim, lower, upper });
            }
        }
        Ok(ParameterSpace { bounds })
    }

    /// 取预置表的前 `numvars` 个维度。
    ///
    /// # 返回值
    /// `numvars` 不是 4、6、8 时返回 `UnsupportedNumVars`；
    /// 预置表比请求的维数短时返回 `PresetTooShort`。
    pub fn bounds_for(numvars: usize, preset: ParamSet) -> Result<Self, BotmaError> {
        if !matches!(numvars, 4 | 6 | 8) {
            return Err(BotmaError::UnsupportedNumVars(numvars));
        }
        let table = preset.table();
        if numvars > table.len() {
            return Err(BotmaError::PresetTooShort {
                preset: preset.name(),
                available: table.len(),
                requested: numvars,
            });
        }
        Ok(ParameterSpace {
            bounds: table[..numvars].to_vec(),
        })
    }

    pub fn dimensions(&self) -> usize {
        self.bounds.len()
    }

    pub fn bounds(&self) -> &[(f64, f64)] {
        &self.bounds
    }

    /// 把单位区间上的 `u` 线性映射到第 `dim` 维的取值范围。
    #[inline]
    pub fn scale(&self, dim: usize, u: f64) -> f64 {
        let (lower, upper) = self.bounds[dim];
        lower + u * (upper - lower)
    }

    pub fn contains(&self, theta: &[f64]) -> bool {
        theta.len() == self.bounds.len()
            && theta
                .iter()
                .zip(&self.bounds)
                .all(|(&v, &(lower, upper))| v >= lower && v <= upper)
    }
}
