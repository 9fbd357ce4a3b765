//! 会計集計モジュール
//!
//! 解決済みメニューの合計金額・栄養素合計を計算する。

use crate::resolver::ResolvedItem;
use crate::types::Nutrition;
use serde::{Deserialize, Serialize};

/// 栄養素の合計（値の無いメニューは加算しない）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionTotals {
    pub energy: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbohydrates: f64,
    pub fiber: f64,
    pub vegetables: f64,
}

impl NutritionTotals {
    pub fn add(&mut self, n: &Nutrition) {
        self.energy += n.energy.unwrap_or(0.0);
        self.protein += n.protein.unwrap_or(0.0);
        self.fat += n.fat.unwrap_or(0.0);
        self.carbohydrates += n.carbohydrates.unwrap_or(0.0);
        self.fiber += n.fiber.unwrap_or(0.0);
        self.vegetables += n.vegetables.unwrap_or(0.0);
    }
}

/// 会計の合計
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutTotals {
    pub total_price_minor: u64,
    pub nutrition: NutritionTotals,
}

pub fn summarize(items: &[ResolvedItem]) -> CheckoutTotals {
    items.iter().fold(CheckoutTotals::default(), |mut totals, item| {
        totals.total_price_minor += item.entry.price_minor();
        totals.nutrition.add(item.entry.nutrition());
        totals
    })
}
