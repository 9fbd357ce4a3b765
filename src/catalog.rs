//! 料理マスタファイルの読み込み
//!
//! CSV（UTF-8）と Excel / ODS（先頭シート）に対応する。

use crate::error::{Result, TrayAiError};
use calamine::{open_workbook_auto, Reader};
use std::path::Path;
use tracing::info;
use tray_ai_common::{CatalogIndex, CatalogSchema, CatalogTable};

const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods"];

/// 料理マスタを読み込む。必須列が無い場合は起動を中止するエラーになる
pub fn load_catalog(path: &Path, schema: CatalogSchema) -> Result<CatalogIndex> {
    if !path.exists() {
        return Err(TrayAiError::FileNotFound(path.display().to_string()));
    }

    let table = if is_spreadsheet(path) {
        read_spreadsheet(path)?
    } else {
        let content = std::fs::read_to_string(path)?;
        CatalogTable::from_csv_str(&content)
    };

    let catalog = CatalogIndex::from_table(&table, schema)?;
    info!(path = %path.display(), count = catalog.len(), "料理マスタ読み込み完了");
    Ok(catalog)
}

pub fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .map(|e| SPREADSHEET_EXTENSIONS.contains(&e.as_str()))
        .unwrap_or(false)
}

/// 先頭シートを表にする（1行目がヘッダー）
fn read_spreadsheet(path: &Path) -> Result<CatalogTable> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| TrayAiError::CatalogLoad(format!("{}: {}", path.display(), e)))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| TrayAiError::CatalogLoad(format!("シートがありません: {}", path.display())))?
        .map_err(|e| TrayAiError::CatalogLoad(e.to_string()))?;

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string().trim().to_string()).collect::<Vec<_>>())
        .filter(|row| row.iter().any(|cell| !cell.is_empty()));

    let headers = rows.next().unwrap_or_default();
    Ok(CatalogTable::new(headers, rows.collect()))
}
