// src/observation.rs

use std::io::Read;
use std::path::Path;

use nalgebra::Point2;
use serde::Deserialize;

use crate::botma_errors::BotmaError;

/// 单个方位观测：时间、本舰位置与测得方位角（弧度）。
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Observation {
    pub t: f64,
    pub ox: f64,
    pub oy: f64,
    pub bearing: f64,
}

impl Observation {
    pub fn new(t: f64, ox: f64, oy: f64, bearing: f64) -> Self {
        Observation { t, ox, oy, bearing }
    }

    /// 观测时刻的本舰位置。
    pub fn ownship(&self) -> Point2<f64> {
        Point2::new(self.ox, self.oy)
    }

    fn is_finite(&self) -> bool {
        self.t.is_finite() && self.ox.is_finite() && self.oy.is_finite() && self.bearing.is_finite()
    }
}

/// 按时间排序的观测序列，求解期间只读。
///
/// 构造时保证非空且所有字段有限，目标函数因此无需再做检查。
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationSet {
    records: Vec<Observation>,
}

impl ObservationSet {
    pub fn new(records: Vec<Observation>) -> Result<Self, BotmaError> {
        if records.is_empty() {
            return Err(BotmaError::EmptyObservationSet);
        }
        if let Some(idx) = records.iter().position(|r| !r.is_finite()) {
            return Err(BotmaError::NonFiniteObservation(idx));
        }
        Ok(ObservationSet { records })
    }

    /// 由四个等长数组构造观测集合。
    ///
    /// # 参数
    /// * `t` - 观测时间。
    /// * `ox`, `oy` - 本舰坐标。
    /// * `bearing` - 测得方位角。
    ///
    /// # 返回值
    /// 长度不一致时返回 `BotmaError::MismatchedColumns`。
    pub fn from_columns(
        t: &[f64],
        ox: &[f64],
        oy: &[f64],
        bearing: &[f64],
    ) -> Result<Self, BotmaError> {
        let n = t.len();
        if ox.len() != n || oy.len() != n || bearing.len() != n {
            return Err(BotmaError::MismatchedColumns {
                t: n,
                ox: ox.len(),
                oy: oy.len(),
                bearing: bearing.len(),
            });
        }
        let records = (0..n)
            .map(|i| Observation::new(t[i], ox[i], oy[i], bearing[i]))
            .collect();
        Self::new(records)
    }

    /// 从 CSV 文件读取观测数据。
    ///
    /// 第一行为表头并被跳过；其余每行按固定顺序包含
    /// 时间、本舰 x、本舰 y、测得方位四列，不依赖表头名称。
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, BotmaError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, BotmaError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut records = Vec::new();
        for row in rdr.records() {
            let row = row?;
            let obs: Observation = row.deserialize(None)?;
            records.push(obs);
        }
        Self::new(records)
    }

    /// 用固定采样周期重建时间轴：第 i 个样本（从 0 开始）的时间为 `(i + 1) * dt`。
    ///
    /// 适用于只带本舰位置和方位、不带时间列的数据流。
    ///
    /// # 返回值
    /// `dt` 非正、非有限或使时间溢出时返回 `BotmaError::InvalidSamplingTime`。
    pub fn with_uniform_sampling(mut self, dt: f64) -> Result<Self, BotmaError> {
        let last = self.records.len() as f64 * dt;
        if !(dt > 0.0 && last.is_finite()) {
            return Err(BotmaError::InvalidSamplingTime(dt));
        }
        for (i, r) in self.records.iter_mut().enumerate() {
            r.t = (i + 1) as f64 * dt;
        }
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// 构造保证非空，恒为 `false`。
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[Observation] {
        &self.records
    }
}

impl<'a> IntoIterator for &'a ObservationSet {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
