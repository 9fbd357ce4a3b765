//! お皿と料理の紐付けモジュール
//!
//! お皿ごとに、中心間距離がしきい値未満の料理のうち確信度が最大のものを
//! 1つだけ紐付ける（貪欲法。一度紐付けた料理は他のお皿に使わない）。

use crate::types::Detection;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// お皿と料理の中心間距離のしきい値（画像サイズ比）
pub const DEFAULT_DISTANCE_THRESHOLD: f64 = 0.3;

/// お皿と料理のペア
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociationPair {
    pub plate: Detection,
    /// 料理が見つからなかった場合は None（お皿のみ）
    pub dish: Option<Detection>,
    pub plate_area: f64,
}

/// お皿ごとに料理を紐付ける
///
/// 出力はお皿と同じ件数・同じ順序。どのお皿にも紐付かなかった料理は捨てる。
pub fn associate(plates: &[Detection], dishes: &[Detection], threshold: f64) -> Vec<AssociationPair> {
    let mut consumed = vec![false; dishes.len()];
    let mut pairs = Vec::with_capacity(plates.len());

    for plate in plates {
        let mut candidate: Option<usize> = None;
        let mut max_confidence = f64::NEG_INFINITY;

        for (i, dish) in dishes.iter().enumerate() {
            if consumed[i] {
                continue;
            }
            let distance = plate.bbox.center_distance(&dish.bbox);
            // 最も近いものではなく、確信度が最大のもの（同値なら先勝ち）
            if distance < threshold && dish.confidence > max_confidence {
                max_confidence = dish.confidence;
                candidate = Some(i);
            }
        }

        let dish = candidate.map(|i| {
            consumed[i] = true;
            dishes[i].clone()
        });
        debug!(
            plate = %plate.label,
            dish = dish.as_ref().map(|d| d.label.as_str()).unwrap_or("-"),
            "お皿と料理を紐付け"
        );

        pairs.push(AssociationPair {
            plate: plate.clone(),
            dish,
            plate_area: plate.bbox.area(),
        });
    }

    pairs
}
