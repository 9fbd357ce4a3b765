//! 会計処理
//!
//! 検出結果 → お皿と料理の紐付け → メニュー解決 → 合計 の順に処理する。

use crate::error::Result;
use crate::menu_cache::RecentItemsCache;
use serde::{Deserialize, Serialize};
use tracing::debug;
use tray_ai_common::{
    associate, resolve, summarize, CatalogEntry, CatalogField, CatalogIndex, DetectionFrame, Error,
    MatchMode, NutritionTotals, ResolveOptions, ResolvedItem,
};

/// 会計結果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResult {
    pub boxes: Vec<ResolvedItem>,
    /// 合計金額（税込）
    pub total: u64,
    pub nutrition_totals: NutritionTotals,
}

pub fn run_checkout(
    frame: &DetectionFrame,
    catalog: &CatalogIndex,
    options: &ResolveOptions,
    distance_threshold: f64,
) -> CheckoutResult {
    let pairs = associate(&frame.plates, &frame.dishes, distance_threshold);
    let boxes = resolve(&pairs, catalog, options);
    let totals = summarize(&boxes);
    debug!(
        plates = frame.plates.len(),
        dishes = frame.dishes.len(),
        items = boxes.len(),
        total = totals.total_price_minor,
        "会計処理完了"
    );

    CheckoutResult {
        boxes,
        total: totals.total_price_minor,
        nutrition_totals: totals.nutrition,
    }
}

/// マスタに該当したメニューをキャッシュに記録し、記録した件数を返す
pub fn record_items(result: &CheckoutResult, cache: &RecentItemsCache) -> usize {
    let mut recorded = 0;
    for entry in result.boxes.iter().filter_map(|item| item.entry.catalog_entry()) {
        cache.add(entry);
        recorded += 1;
    }
    recorded
}

/// 料理コードで手入力されたメニューをキャッシュに追加する。同じコードの行が複数あれば先頭
pub fn add_by_code<'a>(
    catalog: &'a CatalogIndex,
    cache: &RecentItemsCache,
    code: &str,
) -> Result<&'a CatalogEntry> {
    let entry = catalog
        .lookup(CatalogField::Code, code.trim(), MatchMode::Exact)
        .into_iter()
        .next()
        .ok_or_else(|| Error::NotFound(code.to_string()))?;
    cache.add(entry);
    Ok(entry)
}
