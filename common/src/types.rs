//! 検出結果・料理マスタの型定義
//!
//! CLIとライブラリで共有される型:
//! - Detection: 物体検出器の出力（お皿・料理どちらも同じ形）
//! - CatalogEntry: 料理マスタの1行
//! - CachedEntry: 最近入力されたメニュー（注文数つき）

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::str::FromStr;

/// 正規化済みバウンディングボックス (x1, y1, x2, y2)
///
/// 座標は画像サイズに対する割合 (0-1)。常に `x1 <= x2`, `y1 <= y2`。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 4]", into = "[f64; 4]")]
pub struct BBox {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
}

impl BBox {
    /// 任意の2頂点から生成（頂点の並び替え・0-1へのクランプを行う）
    pub fn from_corners(ax: f64, ay: f64, bx: f64, by: f64) -> Result<Self> {
        if ![ax, ay, bx, by].iter().all(|v| v.is_finite()) {
            return Err(Error::InvalidDetection(format!(
                "座標が有限値ではありません: [{ax}, {ay}, {bx}, {by}]"
            )));
        }
        let clamp = |v: f64| v.clamp(0.0, 1.0);
        Ok(Self {
            x1: clamp(ax.min(bx)),
            y1: clamp(ay.min(by)),
            x2: clamp(ax.max(bx)),
            y2: clamp(ay.max(by)),
        })
    }

    pub fn x1(&self) -> f64 {
        self.x1
    }

    pub fn y1(&self) -> f64 {
        self.y1
    }

    pub fn x2(&self) -> f64 {
        self.x2
    }

    pub fn y2(&self) -> f64 {
        self.y2
    }

    /// 中心座標
    pub fn center(&self) -> (f64, f64) {
        ((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    /// 面積（画像全体に対する割合）
    pub fn area(&self) -> f64 {
        (self.x2 - self.x1) * (self.y2 - self.y1)
    }

    /// 中心間のユークリッド距離
    pub fn center_distance(&self, other: &BBox) -> f64 {
        let (ax, ay) = self.center();
        let (bx, by) = other.center();
        ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
    }
}

impl TryFrom<[f64; 4]> for BBox {
    type Error = Error;

    fn try_from(xyxy: [f64; 4]) -> Result<Self> {
        Self::from_corners(xyxy[0], xyxy[1], xyxy[2], xyxy[3])
    }
}

impl From<BBox> for [f64; 4] {
    fn from(b: BBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

/// 物体検出器の出力1件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDetection")]
pub struct Detection {
    /// 検出ラベル（お皿なら "DON" 等、料理なら料理コード）
    pub label: String,
    /// 確信度 (0-1)
    pub confidence: f64,
    #[serde(rename = "xyxy")]
    pub bbox: BBox,
}

impl Detection {
    pub fn new(label: impl Into<String>, confidence: f64, bbox: BBox) -> Result<Self> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(Error::InvalidDetection(format!(
                "確信度が範囲外です: {confidence}"
            )));
        }
        Ok(Self {
            label: label.into(),
            confidence,
            bbox,
        })
    }
}

/// 検証前の検出結果JSON
#[derive(Deserialize)]
struct RawDetection {
    label: String,
    confidence: f64,
    xyxy: BBox,
}

impl TryFrom<RawDetection> for Detection {
    type Error = Error;

    fn try_from(raw: RawDetection) -> Result<Self> {
        Detection::new(raw.label, raw.confidence, raw.xyxy)
    }
}

/// 1フレーム分の検出結果（お皿モデル・料理モデルの出力）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionFrame {
    pub plates: Vec<Detection>,
    pub dishes: Vec<Detection>,
}

/// 栄養素（値が無い列は None）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Nutrition {
    pub energy: Option<f64>,
    pub protein: Option<f64>,
    pub fat: Option<f64>,
    pub carbohydrates: Option<f64>,
    pub fiber: Option<f64>,
    pub vegetables: Option<f64>,
}

/// 料理マスタの1行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// 料理コード。「212080」
    pub code: String,
    /// 表示名。「自家製カレー」
    pub display_name: String,
    /// ローマ字。「JIKASEI KARE」
    pub romaji: String,
    /// 検出モデルの学習名。「homemade_curry」
    pub detector_label: String,
    /// JANコード。「2121052120800」
    pub jan_code: String,
    /// 税込価格（円）
    pub price_minor: u64,
    #[serde(default)]
    pub nutrition: Nutrition,
}

impl CatalogEntry {
    /// 指定フィールドの文字列表現
    pub fn field_value(&self, field: CatalogField) -> Cow<'_, str> {
        match field {
            CatalogField::Code => Cow::Borrowed(&self.code),
            CatalogField::DisplayName => Cow::Borrowed(&self.display_name),
            CatalogField::Romaji => Cow::Borrowed(&self.romaji),
            CatalogField::DetectorLabel => Cow::Borrowed(&self.detector_label),
            CatalogField::JanCode => Cow::Borrowed(&self.jan_code),
            CatalogField::PriceMinor => Cow::Owned(self.price_minor.to_string()),
        }
    }
}

/// キャッシュされたメニュー（これまでに注文された数つき）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedEntry {
    #[serde(flatten)]
    pub entry: CatalogEntry,
    pub count: u32,
}

impl CachedEntry {
    pub fn new(entry: CatalogEntry) -> Self {
        Self { entry, count: 1 }
    }
}

/// 検索対象フィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogField {
    Code,
    DisplayName,
    Romaji,
    DetectorLabel,
    JanCode,
    PriceMinor,
}

impl CatalogField {
    /// JSON上のキー名
    pub fn json_key(&self) -> &'static str {
        match self {
            CatalogField::Code => "code",
            CatalogField::DisplayName => "displayName",
            CatalogField::Romaji => "romaji",
            CatalogField::DetectorLabel => "detectorLabel",
            CatalogField::JanCode => "janCode",
            CatalogField::PriceMinor => "priceMinor",
        }
    }
}

impl FromStr for CatalogField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        // 旧クライアントのキー名 (menu_code, yolo_name, price) も受け付ける
        match s.trim().to_lowercase().as_str() {
            "code" | "menu_code" => Ok(CatalogField::Code),
            "displayname" | "display_name" => Ok(CatalogField::DisplayName),
            "romaji" => Ok(CatalogField::Romaji),
            "detectorlabel" | "detector_label" | "yolo_name" => Ok(CatalogField::DetectorLabel),
            "jancode" | "jan_code" => Ok(CatalogField::JanCode),
            "priceminor" | "price_minor" | "price" => Ok(CatalogField::PriceMinor),
            _ => Err(Error::UnknownField(s.to_string())),
        }
    }
}

impl std::fmt::Display for CatalogField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.json_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_sorts_corners() {
        let b = BBox::from_corners(0.5, 0.6, 0.1, 0.2).unwrap();
        assert_eq!(<[f64; 4]>::from(b), [0.1, 0.2, 0.5, 0.6]);
    }

    #[test]
    fn test_bbox_clamps_and_rejects_nan() {
        let b = BBox::from_corners(-0.01, 0.0, 1.02, 0.5).unwrap();
        assert_eq!(b.x1(), 0.0);
        assert_eq!(b.x2(), 1.0);
        assert!(BBox::from_corners(f64::NAN, 0.0, 0.1, 0.1).is_err());
    }

    #[test]
    fn test_bbox_center_and_area() {
        let b = BBox::from_corners(0.1, 0.1, 0.5, 0.5).unwrap();
        let (cx, cy) = b.center();
        assert!((cx - 0.3).abs() < 1e-12);
        assert!((cy - 0.3).abs() < 1e-12);
        assert!((b.area() - 0.16).abs() < 1e-12);
    }

    #[test]
    fn test_detection_confidence_range() {
        let b = BBox::from_corners(0.0, 0.0, 0.1, 0.1).unwrap();
        assert!(Detection::new("DON", 1.2, b).is_err());
        assert!(Detection::new("DON", 0.9, b).is_ok());
    }

    #[test]
    fn test_detection_deserialize_xyxy() {
        let json = r#"{"label": "101", "confidence": 0.9, "xyxy": [0.4, 0.4, 0.2, 0.2]}"#;
        let det: Detection = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(det.label, "101");
        assert_eq!(det.bbox.x1(), 0.2);
        assert_eq!(det.bbox.x2(), 0.4);
    }

    /// 範囲外の確信度はJSONからも受け付けない
    #[test]
    fn test_detection_frame_rejects_out_of_range_confidence() {
        let json = r#"{"plates": [{"label": "DON", "confidence": 7.5, "xyxy": [0.1, 0.1, 0.2, 0.2]}]}"#;
        let err = serde_json::from_str::<DetectionFrame>(json).unwrap_err();
        assert!(err.to_string().contains("確信度"));

        let json = r#"{"dishes": [{"label": "101", "confidence": -0.1, "xyxy": [0.1, 0.1, 0.2, 0.2]}]}"#;
        assert!(serde_json::from_str::<DetectionFrame>(json).is_err());

        let det: Detection = serde_json::from_str(r#"{"label": "DON", "confidence": 1.0, "xyxy": [0, 0, 1, 1]}"#)
            .expect("境界値は有効");
        assert_eq!(det.confidence, 1.0);
    }

    #[test]
    fn test_cached_entry_serialize_flat() {
        let cached = CachedEntry::new(CatalogEntry {
            code: "212080".into(),
            display_name: "自家製カレー".into(),
            romaji: "JIKASEI KARE".into(),
            detector_label: "homemade_curry".into(),
            jan_code: "2121052120800".into(),
            price_minor: 341,
            nutrition: Nutrition::default(),
        });
        let json = serde_json::to_string(&cached).expect("シリアライズ失敗");
        assert!(json.contains("\"displayName\":\"自家製カレー\""));
        assert!(json.contains("\"priceMinor\":341"));
        assert!(json.contains("\"count\":1"));
    }

    #[test]
    fn test_catalog_field_from_str() {
        assert_eq!("display_name".parse::<CatalogField>().unwrap(), CatalogField::DisplayName);
        assert_eq!("yolo_name".parse::<CatalogField>().unwrap(), CatalogField::DetectorLabel);
        assert_eq!(" Price ".parse::<CatalogField>().unwrap(), CatalogField::PriceMinor);
        assert!("calories".parse::<CatalogField>().is_err());
    }
}
