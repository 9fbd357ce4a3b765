use crate::error::{Result, TrayAiError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tray_ai_common::{CatalogSchema, ResolveOptions, SizeLabels, SizeTable, DEFAULT_DISTANCE_THRESHOLD};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 料理マスタ (CSV / Excel)
    pub catalog_path: Option<PathBuf>,
    /// 最近入力されたメニューの保存先
    pub cache_path: PathBuf,
    /// LabelMe形式ログの保存先（日付ごとにサブフォルダを作る）
    pub log_dir: PathBuf,
    /// お皿と料理の中心間距離のしきい値
    pub distance_threshold: f64,
    /// 栄養素列を必須にする
    pub extended_schema: bool,
    /// お皿の種類ごとのサイズしきい値 [下限, 上限]（既定値に追加・上書き）
    pub size_thresholds: BTreeMap<String, [f64; 2]>,
    /// サイズ判定に使う表示名の接頭辞
    pub size_labels: SizeLabels,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: None,
            cache_path: PathBuf::from("menu_cache.json"),
            log_dir: PathBuf::from("Logging"),
            distance_threshold: DEFAULT_DISTANCE_THRESHOLD,
            extended_schema: false,
            size_thresholds: BTreeMap::new(),
            size_labels: SizeLabels::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| TrayAiError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("tray-ai").join("config.json"))
    }

    /// 料理マスタのパス（環境変数を優先）
    pub fn catalog_path(&self) -> Option<PathBuf> {
        std::env::var_os("TRAY_AI_CATALOG")
            .map(PathBuf::from)
            .or_else(|| self.catalog_path.clone())
    }

    /// キャッシュのパス（環境変数を優先）
    pub fn cache_path(&self) -> PathBuf {
        std::env::var_os("TRAY_AI_CACHE")
            .map(PathBuf::from)
            .unwrap_or_else(|| self.cache_path.clone())
    }

    pub fn set_catalog_path(&mut self, path: PathBuf) -> Result<()> {
        self.catalog_path = Some(path);
        self.save()
    }

    pub fn schema(&self) -> CatalogSchema {
        if self.extended_schema {
            CatalogSchema::Extended
        } else {
            CatalogSchema::Basic
        }
    }

    pub fn resolve_options(&self) -> ResolveOptions {
        let mut size_table = SizeTable::default();
        for (plate_type, [low, high]) in &self.size_thresholds {
            size_table.set(plate_type.clone(), *low, *high);
        }
        ResolveOptions {
            size_table,
            size_labels: self.size_labels.clone(),
        }
    }
}
