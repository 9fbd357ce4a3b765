//! 料理マスタモジュール
//!
//! 料理マスタ（CSV/Excelを表形式にしたもの）を読み込み、
//! 料理コード・表示名などで検索できるようにする。

use crate::error::{Error, Result};
use crate::table::CatalogTable;
use crate::types::{CatalogEntry, CatalogField, Nutrition};
use std::collections::HashMap;
use tracing::{debug, info};

const CODE_COLUMN: &str = "料理コード";
const JAN_CODE_COLUMN: &str = "JANコード";
const DISPLAY_NAME_COLUMN: &str = "お客様向け名称";
const ROMAJI_COLUMN: &str = "ローマ字";
const PRICE_COLUMN: &str = "販売価格(税込)";
const DETECTOR_LABEL_COLUMN: &str = "検出名";

const NUTRITION_COLUMNS: [&str; 6] = ["エネルギー", "たんぱく質", "脂質", "炭水化物", "食物繊維", "野菜量"];

/// 料理マスタの列構成
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CatalogSchema {
    /// 料理コード・JANコード・名称・ローマ字・価格が必須
    #[default]
    Basic,
    /// Basic に加えて栄養素6列も必須
    Extended,
}

/// 検索方法
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchMode {
    #[default]
    Exact,
    Partial,
}

/// 料理マスタ全体（読み込み後は変更しない）
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    /// 全行（マスタの並び順）
    entries: Vec<CatalogEntry>,
    /// 料理コード → 行番号（サイズ違いで複数行あり得る）
    by_code: HashMap<String, Vec<usize>>,
}

/// 列の位置
struct ColumnMap {
    code: usize,
    jan_code: usize,
    display_name: usize,
    romaji: usize,
    price: usize,
    detector_label: Option<usize>,
    nutrition: [Option<usize>; 6],
}

impl ColumnMap {
    fn locate(table: &CatalogTable, schema: CatalogSchema) -> Result<Self> {
        let mut missing = Vec::new();
        let mut required = |name: &str| {
            let col = table.find_column(name);
            if col.is_none() {
                missing.push(name.to_string());
            }
            col.unwrap_or_default()
        };

        let code = required(CODE_COLUMN);
        let jan_code = required(JAN_CODE_COLUMN);
        let display_name = required(DISPLAY_NAME_COLUMN);
        let romaji = required(ROMAJI_COLUMN);
        let price = required(PRICE_COLUMN);

        let mut nutrition = [None; 6];
        for (slot, name) in nutrition.iter_mut().zip(NUTRITION_COLUMNS) {
            *slot = match schema {
                CatalogSchema::Extended => Some(required(name)),
                CatalogSchema::Basic => table.find_column(name),
            };
        }

        if !missing.is_empty() {
            return Err(Error::MissingColumns(missing));
        }

        Ok(Self {
            code,
            jan_code,
            display_name,
            romaji,
            price,
            detector_label: table.find_column(DETECTOR_LABEL_COLUMN),
            nutrition,
        })
    }
}

impl CatalogIndex {
    /// 表から読み込み。必須列が無ければエラー（部分的なマスタは作らない）
    pub fn from_table(table: &CatalogTable, schema: CatalogSchema) -> Result<Self> {
        let columns = ColumnMap::locate(table, schema)?;
        let mut entries = Vec::with_capacity(table.rows.len());

        for (i, row) in table.rows.iter().enumerate() {
            // ヘッダーが1行目
            let line = i + 2;
            let cell = |col: usize| row.get(col).map(|s| s.trim()).unwrap_or("");

            let code = normalize_code(cell(columns.code)).ok_or_else(|| Error::InvalidRow {
                line,
                reason: format!("料理コードが不正です: '{}'", cell(columns.code)),
            })?;
            let price_minor = parse_price(cell(columns.price)).ok_or_else(|| Error::InvalidRow {
                line,
                reason: format!("販売価格が不正です: '{}'", cell(columns.price)),
            })?;

            let nutrient = |idx: usize| columns.nutrition[idx].and_then(|col| parse_nutrient(cell(col)));

            entries.push(CatalogEntry {
                code,
                display_name: cell(columns.display_name).to_string(),
                romaji: cell(columns.romaji).to_string(),
                detector_label: columns.detector_label.map(|c| cell(c).to_string()).unwrap_or_default(),
                jan_code: cell(columns.jan_code).to_string(),
                price_minor,
                nutrition: Nutrition {
                    energy: nutrient(0),
                    protein: nutrient(1),
                    fat: nutrient(2),
                    carbohydrates: nutrient(3),
                    fiber: nutrient(4),
                    vegetables: nutrient(5),
                },
            });
        }

        info!(count = entries.len(), "料理マスタを読み込みました");
        Ok(Self::from_entries(entries))
    }

    /// 読み込み済みの行から作成
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        let mut by_code: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, entry) in entries.iter().enumerate() {
            by_code.entry(entry.code.clone()).or_default().push(i);
        }
        Self { entries, by_code }
    }

    /// キーと値で検索する
    pub fn lookup(&self, field: CatalogField, value: &str, mode: MatchMode) -> Vec<&CatalogEntry> {
        match (field, mode) {
            (CatalogField::Code, MatchMode::Exact) => self
                .by_code
                .get(value)
                .map(|rows| rows.iter().map(|&i| &self.entries[i]).collect())
                .unwrap_or_default(),
            (_, MatchMode::Exact) => self
                .entries
                .iter()
                .filter(|e| e.field_value(field) == value)
                .collect(),
            (_, MatchMode::Partial) => self
                .entries
                .iter()
                .filter(|e| e.field_value(field).contains(value))
                .collect(),
        }
    }

    /// 画面の検索欄からの部分一致検索。キー・値が空なら空の結果
    pub fn search(&self, key: &str, value: &str) -> Result<Vec<&CatalogEntry>> {
        let key = key.trim().to_lowercase();
        let value = value.trim();
        if key.is_empty() || value.is_empty() {
            return Ok(Vec::new());
        }
        let field: CatalogField = key.parse()?;
        let results = self.lookup(field, value, MatchMode::Partial);
        debug!(%field, value, hits = results.len(), "メニュー検索");
        Ok(results)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 数値の料理コードは先頭の0を落とす（"00101" → "101"）
fn normalize_code(raw: &str) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    if let Ok(n) = raw.parse::<u64>() {
        return Some(n.to_string());
    }
    // Excel由来の "101.0"
    match raw.parse::<f64>() {
        Ok(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => Some((f as u64).to_string()),
        _ => Some(raw.to_string()),
    }
}

fn parse_price(raw: &str) -> Option<u64> {
    if let Ok(n) = raw.parse::<u64>() {
        return Some(n);
    }
    match raw.parse::<f64>() {
        Ok(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => Some(f as u64),
        _ => None,
    }
}

/// 空欄・"-" などの数値でない値は None
fn parse_nutrient(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_CSV: &str = r#"料理コード,JANコード,お客様向け名称,ローマ字,販売価格(税込),検出名,エネルギー,たんぱく質,脂質,炭水化物,食物繊維,野菜量
"212080","2121052120800","自家製カレー","JIKASEI KARE","341","homemade_curry","650.5","15.2","20.1","95.0","3.1","40"
"101","2000000001010","大カレー","DAI KARE","500","curry","","","","","",""
"101","2000000001011","小カレー","SHO KARE","300","curry","","","","","",""
"00305","2000000003050","味噌汁","MISOSHIRU","66","miso","30","2","1","3","0.5","-"
"#;

    fn load(csv: &str, schema: CatalogSchema) -> Result<CatalogIndex> {
        CatalogIndex::from_table(&CatalogTable::from_csv_str(csv), schema)
    }

    #[test]
    fn test_load_csv() {
        let catalog = load(TEST_CSV, CatalogSchema::Extended).unwrap();
        assert_eq!(catalog.len(), 4);
        let curry = &catalog.entries()[0];
        assert_eq!(curry.price_minor, 341);
        assert_eq!(curry.detector_label, "homemade_curry");
        assert_eq!(curry.nutrition.energy, Some(650.5));
    }

    #[test]
    fn test_code_normalized() {
        let catalog = load(TEST_CSV, CatalogSchema::Basic).unwrap();
        let miso = catalog.lookup(CatalogField::Code, "305", MatchMode::Exact);
        assert_eq!(miso.len(), 1);
        assert_eq!(miso[0].nutrition.vegetables, None);
    }

    #[test]
    fn test_duplicate_codes_kept_in_order() {
        let catalog = load(TEST_CSV, CatalogSchema::Basic).unwrap();
        let curries = catalog.lookup(CatalogField::Code, "101", MatchMode::Exact);
        assert_eq!(curries.len(), 2);
        assert_eq!(curries[0].display_name, "大カレー");
        assert_eq!(curries[1].display_name, "小カレー");
    }

    #[test]
    fn test_missing_required_columns() {
        let csv = "料理コード,お客様向け名称,販売価格(税込)\n101,カレー,500\n";
        let err = load(csv, CatalogSchema::Basic).unwrap_err();
        match err {
            Error::MissingColumns(cols) => {
                assert_eq!(cols, vec!["JANコード".to_string(), "ローマ字".to_string()]);
            }
            other => panic!("想定外のエラー: {other:?}"),
        }
    }

    #[test]
    fn test_extended_schema_requires_nutrition() {
        let csv = "料理コード,JANコード,お客様向け名称,ローマ字,販売価格(税込)\n101,1,カレー,KARE,500\n";
        assert!(load(csv, CatalogSchema::Basic).is_ok());
        assert!(matches!(
            load(csv, CatalogSchema::Extended),
            Err(Error::MissingColumns(cols)) if cols.len() == 6
        ));
    }

    #[test]
    fn test_invalid_price_row() {
        let csv = "料理コード,JANコード,お客様向け名称,ローマ字,販売価格(税込)\n101,1,カレー,KARE,abc\n";
        assert!(matches!(
            load(csv, CatalogSchema::Basic),
            Err(Error::InvalidRow { line: 2, .. })
        ));
    }

    #[test]
    fn test_lookup_exact_and_partial() {
        let catalog = load(TEST_CSV, CatalogSchema::Basic).unwrap();
        assert_eq!(catalog.lookup(CatalogField::DisplayName, "カレー", MatchMode::Exact).len(), 0);
        assert_eq!(catalog.lookup(CatalogField::DisplayName, "カレー", MatchMode::Partial).len(), 3);
        assert_eq!(catalog.lookup(CatalogField::PriceMinor, "500", MatchMode::Exact).len(), 1);
        assert_eq!(catalog.lookup(CatalogField::Code, "999", MatchMode::Exact).len(), 0);
    }

    #[test]
    fn test_search() {
        let catalog = load(TEST_CSV, CatalogSchema::Basic).unwrap();
        assert_eq!(catalog.search(" ROMAJI ", "KARE").unwrap().len(), 3);
        assert!(catalog.search("", "KARE").unwrap().is_empty());
        assert!(catalog.search("romaji", "  ").unwrap().is_empty());
        assert!(matches!(catalog.search("calorie", "1"), Err(Error::UnknownField(_))));
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("00101").as_deref(), Some("101"));
        assert_eq!(normalize_code("101.0").as_deref(), Some("101"));
        assert_eq!(normalize_code("A-12").as_deref(), Some("A-12"));
        assert_eq!(normalize_code(""), None);
    }
}
