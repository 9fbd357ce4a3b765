//! メニュー解決モジュール
//!
//! お皿と料理のペアから料理マスタの行を決める。
//! 同じ料理コードに複数行（小・中・大）がある場合は面積でサイズを判定する。

use crate::association::AssociationPair;
use crate::catalog::{CatalogIndex, MatchMode};
use crate::size::{SizeBucket, SizeLabels, SizeTable};
use crate::types::{BBox, CatalogEntry, CatalogField, Nutrition};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// マスタに該当が無い場合のメニュー
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnknownEntry {
    pub code: Option<String>,
    pub display_name: String,
    pub romaji: Option<String>,
    pub detector_label: Option<String>,
    pub jan_code: Option<String>,
    pub price_minor: u64,
    pub nutrition: Nutrition,
}

impl Default for UnknownEntry {
    fn default() -> Self {
        Self {
            code: None,
            display_name: "unknown".to_string(),
            romaji: None,
            detector_label: None,
            jan_code: None,
            price_minor: 0,
            nutrition: Nutrition::default(),
        }
    }
}

/// 解決結果のメニュー
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResolvedEntry {
    Matched(CatalogEntry),
    Unknown(UnknownEntry),
}

impl ResolvedEntry {
    pub fn unknown() -> Self {
        ResolvedEntry::Unknown(UnknownEntry::default())
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, ResolvedEntry::Unknown(_))
    }

    pub fn catalog_entry(&self) -> Option<&CatalogEntry> {
        match self {
            ResolvedEntry::Matched(entry) => Some(entry),
            ResolvedEntry::Unknown(_) => None,
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            ResolvedEntry::Matched(entry) => Some(&entry.code),
            ResolvedEntry::Unknown(entry) => entry.code.as_deref(),
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            ResolvedEntry::Matched(entry) => &entry.display_name,
            ResolvedEntry::Unknown(entry) => &entry.display_name,
        }
    }

    pub fn price_minor(&self) -> u64 {
        match self {
            ResolvedEntry::Matched(entry) => entry.price_minor,
            ResolvedEntry::Unknown(entry) => entry.price_minor,
        }
    }

    pub fn nutrition(&self) -> &Nutrition {
        match self {
            ResolvedEntry::Matched(entry) => &entry.nutrition,
            ResolvedEntry::Unknown(entry) => &entry.nutrition,
        }
    }
}

/// ペア1件分の解決結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedItem {
    /// 料理のラベル（料理が無ければお皿のラベル）
    pub label: String,
    /// お皿の種類
    pub plate_type: String,
    pub confidence: f64,
    #[serde(rename = "xyxy")]
    pub bbox: BBox,
    /// サイズ判定を行った場合のみ
    pub size: Option<SizeBucket>,
    #[serde(rename = "menuObject")]
    pub entry: ResolvedEntry,
}

/// 解決時の設定
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    pub size_table: SizeTable,
    pub size_labels: SizeLabels,
}

/// ペアごとにメニューを解決する（ラベルが空のペアは出力しない）
pub fn resolve(pairs: &[AssociationPair], catalog: &CatalogIndex, options: &ResolveOptions) -> Vec<ResolvedItem> {
    pairs
        .iter()
        .filter_map(|pair| resolve_pair(pair, catalog, options))
        .collect()
}

fn resolve_pair(pair: &AssociationPair, catalog: &CatalogIndex, options: &ResolveOptions) -> Option<ResolvedItem> {
    let target = pair.dish.as_ref().unwrap_or(&pair.plate);
    let label = target.label.trim();
    if label.is_empty() {
        return None;
    }

    let candidates = catalog.lookup(CatalogField::Code, label, MatchMode::Exact);
    debug!(label, candidates = candidates.len(), "メニュー候補");

    let (size, entry) = match candidates.as_slice() {
        [] => (None, ResolvedEntry::unknown()),
        [only] => (None, ResolvedEntry::Matched((*only).clone())),
        _ => select_by_size(&candidates, &pair.plate.label, target.bbox.area(), options),
    };

    Some(ResolvedItem {
        label: label.to_string(),
        plate_type: pair.plate.label.clone(),
        confidence: target.confidence,
        bbox: target.bbox,
        size,
        entry,
    })
}

/// 面積からサイズを判定し、表示名がサイズ接頭辞で始まる最初の候補を選ぶ
fn select_by_size(
    candidates: &[&CatalogEntry],
    plate_type: &str,
    area: f64,
    options: &ResolveOptions,
) -> (Option<SizeBucket>, ResolvedEntry) {
    let Some(size) = options.size_table.classify(plate_type, area) else {
        // しきい値の無いお皿: マスタ順で最初の候補
        warn!(
            plate_type,
            code = %candidates[0].code,
            "サイズ判定できないお皿のため先頭の候補を使用"
        );
        return (None, ResolvedEntry::Matched(candidates[0].clone()));
    };
    debug!(plate_type, area, %size, "サイズ判定");

    match candidates
        .iter()
        .find(|c| options.size_labels.matches(size, &c.display_name))
    {
        Some(found) => (Some(size), ResolvedEntry::Matched((*found).clone())),
        None => {
            warn!(code = %candidates[0].code, %size, "サイズに合う候補がありません");
            (Some(size), ResolvedEntry::unknown())
        }
    }
}
