//! サイズ分類モジュール
//!
//! 同じ料理コードに「小・中・大」など複数のマスタ行がある場合、
//! 検出領域の面積とお皿の種類からサイズを決める。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// サイズ区分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeBucket {
    Small,
    Medium,
    Large,
}

impl std::fmt::Display for SizeBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SizeBucket::Small => write!(f, "小"),
            SizeBucket::Medium => write!(f, "中"),
            SizeBucket::Large => write!(f, "大"),
        }
    }
}

/// 面積をしきい値で分類する（中は両端を含む）
pub fn classify(area: f64, low: f64, high: f64) -> SizeBucket {
    if area < low {
        SizeBucket::Small
    } else if area <= high {
        SizeBucket::Medium
    } else {
        SizeBucket::Large
    }
}

/// お皿の種類ごとのしきい値表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeTable {
    thresholds: BTreeMap<String, (f64, f64)>,
}

impl Default for SizeTable {
    fn default() -> Self {
        let mut thresholds = BTreeMap::new();
        thresholds.insert("DON".to_string(), (0.02441, 0.03906));
        thresholds.insert("CURRY".to_string(), (0.1953, 0.2441));
        thresholds.insert("RICE".to_string(), (0.01953, 0.02441));
        Self { thresholds }
    }
}

impl SizeTable {
    /// しきい値を追加・上書きする。`low > high` の場合は入れ替える
    pub fn set(&mut self, plate_type: impl Into<String>, low: f64, high: f64) {
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        self.thresholds.insert(plate_type.into(), (low, high));
    }

    pub fn thresholds(&self, plate_type: &str) -> Option<(f64, f64)> {
        self.thresholds.get(plate_type).copied()
    }

    /// お皿の種類が表に無ければ None
    pub fn classify(&self, plate_type: &str, area: f64) -> Option<SizeBucket> {
        self.thresholds(plate_type)
            .map(|(low, high)| classify(area, low, high))
    }
}

/// 表示名の先頭でサイズを判定するための接頭辞
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeLabels {
    pub small: Vec<String>,
    pub medium: Vec<String>,
    pub large: Vec<String>,
}

impl Default for SizeLabels {
    fn default() -> Self {
        Self {
            small: vec!["小".into(), "Small".into()],
            medium: vec!["中".into(), "Medium".into()],
            large: vec!["大".into(), "Large".into()],
        }
    }
}

impl SizeLabels {
    pub fn prefixes(&self, bucket: SizeBucket) -> &[String] {
        match bucket {
            SizeBucket::Small => &self.small,
            SizeBucket::Medium => &self.medium,
            SizeBucket::Large => &self.large,
        }
    }

    pub fn matches(&self, bucket: SizeBucket, display_name: &str) -> bool {
        self.prefixes(bucket)
            .iter()
            .any(|p| display_name.starts_with(p.as_str()))
    }
}
