//! 会計確定結果のログ（LabelMe形式）
//!
//! 利用者が確認・修正した最終結果を、画像と LabelMe JSON の組で保存する。
//! 再学習用のアノテーションとしてそのまま LabelMe で開ける。

use crate::error::{Result, TrayAiError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;
use tray_ai_common::BBox;

const LABELME_VERSION: &str = "5.5.0";

/// 確定したbbox（ラベルと正規化座標）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggedBox {
    pub label: String,
    pub xyxy: BBox,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub label: String,
    pub points: Vec<[f64; 2]>,
    pub group_id: Option<String>,
    pub description: String,
    pub shape_type: String,
    pub flags: serde_json::Map<String, serde_json::Value>,
    pub mask: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelMeData {
    pub version: String,
    pub flags: serde_json::Map<String, serde_json::Value>,
    pub shapes: Vec<Shape>,
    pub image_path: String,
    pub image_data: String,
    pub image_height: u32,
    pub image_width: u32,
}

/// 今日の日付のログフォルダ（root/YYYYMMDD）を作成して返す
pub fn daily_dir(root: &Path) -> Result<PathBuf> {
    let dir = root.join(Local::now().format("%Y%m%d").to_string());
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// データURIの場合はカンマ以降を取り出す
fn strip_data_uri(image_base64: &str) -> &str {
    match image_base64.split_once(',') {
        Some((_, data)) => data,
        None => image_base64,
    }
}

/// 画像とLabelMe JSONを保存し、JSONのパスを返す
pub fn log_as_labelme(image_base64: &str, boxes: &[LoggedBox], save_dir: &Path) -> Result<PathBuf> {
    let output_name = Local::now().format("%Y%m%d_%H%M%S").to_string();
    std::fs::create_dir_all(save_dir)?;

    let image_base64 = strip_data_uri(image_base64).trim();
    let bytes = STANDARD.decode(image_base64)?;
    let image = image::load_from_memory(&bytes).map_err(|e| TrayAiError::ImageDecode(e.to_string()))?;
    let (width, height) = (image.width(), image.height());

    let image_path = save_dir.join(format!("{output_name}.jpg"));
    image::DynamicImage::ImageRgb8(image.to_rgb8())
        .save_with_format(&image_path, image::ImageFormat::Jpeg)
        .map_err(|e| TrayAiError::ImageDecode(e.to_string()))?;

    let shapes = boxes
        .iter()
        .map(|b| Shape {
            label: b.label.clone(),
            points: vec![
                [b.xyxy.x1() * width as f64, b.xyxy.y1() * height as f64],
                [b.xyxy.x2() * width as f64, b.xyxy.y2() * height as f64],
            ],
            group_id: None,
            description: String::new(),
            shape_type: "rectangle".to_string(),
            flags: Default::default(),
            mask: None,
        })
        .collect();

    let data = LabelMeData {
        version: LABELME_VERSION.to_string(),
        flags: Default::default(),
        shapes,
        image_path: image_path.to_string_lossy().to_string(),
        image_data: image_base64.to_string(),
        image_height: height,
        image_width: width,
    };

    let json_path = save_dir.join(format!("{output_name}.json"));
    std::fs::write(&json_path, serde_json::to_string_pretty(&data)?)?;
    info!(path = %json_path.display(), boxes = boxes.len(), "LabelMeログを保存しました");

    Ok(json_path)
}
