//! メニューキャッシュ（最近入力されたメニュー）モジュール
//!
//! - 同じ表示名のメニューが追加されたら注文数を増やす
//! - サーバーが動いている間はメモリ上に保持する
//! - JSONファイルに書き出すことで再起動後も復元できる
//!
//! 追加・削除・入出力はすべて1つのロックの中で行う。

use crate::error::Result;
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{info, warn};
use tray_ai_common::{CachedEntry, CatalogEntry, CatalogField, Error};

/// キャッシュ要素に必須のキー
const REQUIRED_KEYS: [&str; 7] = [
    "code",
    "displayName",
    "romaji",
    "detectorLabel",
    "janCode",
    "priceMinor",
    "count",
];

/// 最近入力されたメニューの一覧
#[derive(Debug, Default)]
pub struct RecentItemsCache {
    entries: Mutex<Vec<CachedEntry>>,
}

impl RecentItemsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// ファイルがあれば読み込み、無ければ空の配列で作成する
    pub fn load_or_init(path: &Path) -> Result<Self> {
        let cache = Self::new();
        if path.exists() {
            cache.import_json(path)?;
        } else {
            std::fs::write(path, "[\n]")?;
            info!(path = %path.display(), "メニューキャッシュを新規作成しました");
        }
        Ok(cache)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<CachedEntry>> {
        // 書き込み途中でパニックしても Vec 自体は壊れない
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 追加する。同じ表示名があれば注文数を1増やす
    pub fn add(&self, entry: &CatalogEntry) {
        let mut entries = self.lock();
        match entries
            .iter_mut()
            .find(|cached| cached.entry.display_name == entry.display_name)
        {
            Some(cached) => cached.count += 1,
            None => entries.push(CachedEntry::new(entry.clone())),
        }
    }

    /// 完全に一致する最初の要素を削除する
    pub fn remove(&self, target: &CachedEntry) -> Result<()> {
        let mut entries = self.lock();
        match entries.iter().position(|cached| cached == target) {
            Some(index) => {
                entries.remove(index);
                Ok(())
            }
            None => Err(Error::NotFound(target.entry.display_name.clone()).into()),
        }
    }

    /// 指定キーの値が一致する要素を取得する
    pub fn find(&self, field: CatalogField, value: &str) -> Vec<CachedEntry> {
        self.lock()
            .iter()
            .filter(|cached| cached.entry.field_value(field) == value)
            .cloned()
            .collect()
    }

    /// 検索して一致したものを全て削除する（見つからなかった要素は読み飛ばす）
    pub fn remove_matching(&self, field: CatalogField, value: &str) -> usize {
        let targets = self.find(field, value);
        let mut removed = 0;
        for target in &targets {
            match self.remove(target) {
                Ok(()) => removed += 1,
                Err(e) => warn!(error = %e, "キャッシュ削除をスキップ"),
            }
        }
        removed
    }

    /// 現在の一覧のコピー
    pub fn snapshot(&self) -> Vec<CachedEntry> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// JSONファイルに書き出す
    pub fn export_json(&self, path: &Path) -> Result<()> {
        let entries = self.lock();
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &*entries)?;
        info!(path = %path.display(), count = entries.len(), "メニューキャッシュを書き出しました");
        Ok(())
    }

    /// JSONファイルから読み込む。不正な要素が1つでもあれば何も変更しない
    pub fn import_json(&self, path: &Path) -> Result<()> {
        let mut entries = self.lock();
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let raw: Vec<Value> = serde_json::from_reader(reader)?;

        for (index, value) in raw.iter().enumerate() {
            let missing: Vec<String> = REQUIRED_KEYS
                .iter()
                .filter(|key| value.get(**key).is_none())
                .map(|key| key.to_string())
                .collect();
            if !missing.is_empty() {
                return Err(Error::InvalidCacheEntry { index, missing }.into());
            }
        }

        let imported = raw
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<CachedEntry>, _>>()?;

        info!(path = %path.display(), count = imported.len(), "メニューキャッシュを読み込みました");
        *entries = imported;
        Ok(())
    }

    /// 空にしてファイルも空の配列で上書きする
    pub fn reset(&self, path: &Path) -> Result<()> {
        let mut entries = self.lock();
        std::fs::write(path, "[\n]")?;
        entries.clear();
        Ok(())
    }
}
