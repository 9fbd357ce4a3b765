//! 料理マスタ対話式選択モジュール

use crate::catalog::is_spreadsheet;
use crate::error::{Result, TrayAiError};
use dialoguer::Select;
use std::path::{Path, PathBuf};

/// catalog/ から利用可能な料理マスタ一覧を取得
pub fn list_available_catalogs(dir: &Path) -> Vec<(String, PathBuf)> {
    let mut catalogs = Vec::new();

    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            let is_csv = path
                .extension()
                .map(|e| e.eq_ignore_ascii_case("csv"))
                .unwrap_or(false);
            if path.is_file() && (is_csv || is_spreadsheet(&path)) {
                if let Some(name) = path.file_name() {
                    catalogs.push((name.to_string_lossy().to_string(), path));
                }
            }
        }
    }

    // 名前でソート
    catalogs.sort_by(|a, b| a.0.cmp(&b.0));
    catalogs
}

/// 対話式で料理マスタを選択（候補が1つならそれを使う）
pub fn select_catalog_interactive(dir: &Path) -> Result<Option<PathBuf>> {
    let mut catalogs = list_available_catalogs(dir);

    match catalogs.len() {
        0 => {
            println!("⚠ {} に料理マスタがありません", dir.display());
            Ok(None)
        }
        1 => Ok(catalogs.pop().map(|(_, path)| path)),
        _ => {
            let names: Vec<&str> = catalogs.iter().map(|(name, _)| name.as_str()).collect();
            let selected = Select::new()
                .with_prompt("料理マスタを選択してください")
                .items(&names)
                .default(0)
                .interact_opt()
                .map_err(|e| TrayAiError::Config(e.to_string()))?;
            Ok(selected.map(|i| catalogs[i].1.clone()))
        }
    }
}
