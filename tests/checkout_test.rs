//! 会計処理テスト
//!
//! 検出結果JSON → 料理マスタCSV → 会計結果 までを通しで検証

use tempfile::tempdir;
use tray_ai_common::{CatalogSchema, DetectionFrame, SizeBucket};
use tray_ai_rust::catalog::load_catalog;
use tray_ai_rust::checkout::{add_by_code, record_items, run_checkout};
use tray_ai_rust::config::Config;
use tray_ai_rust::error::TrayAiError;
use tray_ai_rust::menu_cache::RecentItemsCache;

const MENU_CSV: &str = "\u{feff}料理コード,JANコード,お客様向け名称,ローマ字,販売価格(税込),検出名,エネルギー,たんぱく質,脂質,炭水化物,食物繊維,野菜量
101,2000000001010,Large Curry,OMORI KARE,600,curry,900,20,30,120,4,50
101,2000000001011,Small Curry,SHO KARE,400,curry,600,12,20,80,3,30
212080,2121052120800,自家製カレー,JIKASEI KARE,341,homemade_curry,650,15,20,95,3,40
RICE,2000000000001,ライス,RAISU,100,rice,250,4,0.5,55,0.5,
";

fn write_catalog(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("menu.csv");
    std::fs::write(&path, MENU_CSV).unwrap();
    path
}

fn frame(json: &str) -> DetectionFrame {
    serde_json::from_str(json).expect("検出結果JSONのパース失敗")
}

/// 丼のお皿に乗ったカレー → 面積が大きいので「Large Curry」
#[test]
fn test_end_to_end_large_curry() {
    let dir = tempdir().expect("Failed to create temp dir");
    let catalog = load_catalog(&write_catalog(dir.path()), CatalogSchema::Extended).expect("マスタ読み込み失敗");
    let config = Config::default();

    let frame = frame(
        r#"{
            "plates": [{"label": "DON", "confidence": 0.95, "xyxy": [0.10, 0.10, 0.50, 0.50]}],
            "dishes": [{"label": "101", "confidence": 0.90, "xyxy": [0.20, 0.20, 0.40, 0.40]}]
        }"#,
    );

    let result = run_checkout(&frame, &catalog, &config.resolve_options(), config.distance_threshold);
    assert_eq!(result.boxes.len(), 1);
    let item = &result.boxes[0];
    assert_eq!(item.plate_type, "DON");
    assert_eq!(item.size, Some(SizeBucket::Large));
    assert_eq!(item.entry.display_name(), "Large Curry");
    assert_eq!(result.total, 600);
    assert_eq!(result.nutrition_totals.energy, 900.0);
}

/// 料理の無いお皿・マスタに無い料理・紐付かない料理の混在
#[test]
fn test_mixed_frame_totals() {
    let dir = tempdir().expect("Failed to create temp dir");
    let catalog = load_catalog(&write_catalog(dir.path()), CatalogSchema::Basic).expect("マスタ読み込み失敗");
    let config = Config::default();

    let frame = frame(
        r#"{
            "plates": [
                {"label": "CURRY", "confidence": 0.9, "xyxy": [0.0, 0.0, 0.3, 0.3]},
                {"label": "RICE", "confidence": 0.9, "xyxy": [0.6, 0.6, 0.75, 0.75]},
                {"label": "DON", "confidence": 0.9, "xyxy": [0.0, 0.6, 0.2, 0.8]}
            ],
            "dishes": [
                {"label": "212080", "confidence": 0.8, "xyxy": [0.05, 0.05, 0.25, 0.25]},
                {"label": "999", "confidence": 0.7, "xyxy": [0.02, 0.62, 0.18, 0.78]},
                {"label": "212080", "confidence": 0.99, "xyxy": [0.9, 0.0, 1.0, 0.1]}
            ]
        }"#,
    );

    let result = run_checkout(&frame, &catalog, &config.resolve_options(), config.distance_threshold);
    assert_eq!(result.boxes.len(), 3);
    assert_eq!(result.boxes[0].entry.display_name(), "自家製カレー");
    assert_eq!(result.boxes[1].label, "RICE");
    assert_eq!(result.boxes[1].entry.display_name(), "ライス");
    assert!(result.boxes[2].entry.is_unknown());
    assert_eq!(result.total, 341 + 100);
}

/// 解決したメニューのうちマスタに該当したものだけ記録する
#[test]
fn test_record_items() {
    let dir = tempdir().expect("Failed to create temp dir");
    let catalog = load_catalog(&write_catalog(dir.path()), CatalogSchema::Basic).expect("マスタ読み込み失敗");
    let config = Config::default();

    let frame = frame(
        r#"{
            "plates": [
                {"label": "CURRY", "confidence": 0.9, "xyxy": [0.0, 0.0, 0.3, 0.3]},
                {"label": "DON", "confidence": 0.9, "xyxy": [0.6, 0.6, 0.9, 0.9]}
            ],
            "dishes": [
                {"label": "212080", "confidence": 0.8, "xyxy": [0.05, 0.05, 0.25, 0.25]},
                {"label": "999", "confidence": 0.8, "xyxy": [0.65, 0.65, 0.85, 0.85]}
            ]
        }"#,
    );
    let result = run_checkout(&frame, &catalog, &config.resolve_options(), config.distance_threshold);

    let cache = RecentItemsCache::new();
    assert_eq!(record_items(&result, &cache), 1);
    assert_eq!(record_items(&result, &cache), 1);
    let entries = cache.snapshot();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].count, 2);
}

/// 料理コードで手入力 → 同じコードの先頭行が追加される
#[test]
fn test_add_by_code() {
    let dir = tempdir().expect("Failed to create temp dir");
    let catalog = load_catalog(&write_catalog(dir.path()), CatalogSchema::Basic).expect("マスタ読み込み失敗");
    let cache = RecentItemsCache::new();

    let entry = add_by_code(&catalog, &cache, " 101 ").expect("追加失敗");
    assert_eq!(entry.display_name, "Large Curry");
    add_by_code(&catalog, &cache, "212080").expect("追加失敗");
    assert_eq!(cache.len(), 2);

    let err = add_by_code(&catalog, &cache, "999").unwrap_err();
    assert!(matches!(err, TrayAiError::Common(tray_ai_common::Error::NotFound(_))));
    assert_eq!(cache.len(), 2);
}

/// 必須列の無いマスタは読み込みエラー
#[test]
fn test_catalog_missing_columns_is_fatal() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("broken.csv");
    std::fs::write(&path, "料理コード,お客様向け名称\n101,カレー\n").unwrap();

    let err = load_catalog(&path, CatalogSchema::Basic).unwrap_err();
    assert!(matches!(err, TrayAiError::Common(tray_ai_common::Error::MissingColumns(_))));
}

#[test]
fn test_catalog_not_found() {
    let dir = tempdir().expect("Failed to create temp dir");
    let err = load_catalog(&dir.path().join("none.csv"), CatalogSchema::Basic).unwrap_err();
    assert!(matches!(err, TrayAiError::FileNotFound(_)));
}

/// 会計結果JSONの形
#[test]
fn test_checkout_result_json_shape() {
    let dir = tempdir().expect("Failed to create temp dir");
    let catalog = load_catalog(&write_catalog(dir.path()), CatalogSchema::Basic).expect("マスタ読み込み失敗");
    let config = Config::default();

    let frame = frame(r#"{"plates": [{"label": "RICE", "confidence": 0.9, "xyxy": [0.1, 0.1, 0.2, 0.2]}]}"#);
    let result = run_checkout(&frame, &catalog, &config.resolve_options(), config.distance_threshold);

    let json = serde_json::to_value(&result).expect("シリアライズ失敗");
    assert_eq!(json["total"], 100);
    assert_eq!(json["boxes"][0]["menuObject"]["janCode"], "2000000000001");
    assert!(json["nutritionTotals"]["energy"].is_number());
}
