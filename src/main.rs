use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tray_ai_common::{CatalogField, CatalogIndex, DetectionFrame};
use tray_ai_rust::{catalog, catalog_selector, checkout, cli, config, error, labelme, menu_cache};
use cli::{Cli, Commands};
use config::Config;
use menu_cache::RecentItemsCache;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "tray_ai=debug,tray_ai_rust=debug,tray_ai_common=debug"
    } else {
        "tray_ai=info,tray_ai_rust=info,tray_ai_common=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load().context("設定の読み込みに失敗")?;

    match cli.command {
        Commands::Resolve { input, output, threshold, record } => {
            let catalog = open_catalog(cli.catalog.as_deref(), &config)?;

            let content = std::fs::read_to_string(&input)
                .with_context(|| format!("検出結果を読み込めません: {}", input.display()))?;
            let frame: DetectionFrame = serde_json::from_str(&content)?;

            let threshold = threshold.unwrap_or(config.distance_threshold);
            let result = checkout::run_checkout(&frame, &catalog, &config.resolve_options(), threshold);

            if record {
                let cache_path = config.cache_path();
                let cache = RecentItemsCache::load_or_init(&cache_path)?;
                let recorded = checkout::record_items(&result, &cache);
                cache.export_json(&cache_path)?;
                eprintln!("✔ 最近のメニューに{}件記録しました", recorded);
            }

            let json = serde_json::to_string_pretty(&result)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    eprintln!("✔ 結果を保存: {}", path.display());
                }
                None => println!("{}", json),
            }
        }

        Commands::Search { key, value } => {
            let catalog = open_catalog(cli.catalog.as_deref(), &config)?;
            let results = catalog.search(&key, &value).map_err(error::TrayAiError::from)?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }

        Commands::Cache { show, add_code, remove_key, remove_value, reset } => {
            let cache_path = config.cache_path();
            let cache = RecentItemsCache::load_or_init(&cache_path)
                .with_context(|| format!("キャッシュを読み込めません: {}", cache_path.display()))?;

            if reset {
                cache.reset(&cache_path)?;
                println!("✔ キャッシュを空にしました: {}", cache_path.display());
            }

            if let Some(code) = add_code {
                let catalog = open_catalog(cli.catalog.as_deref(), &config)?;
                let entry = checkout::add_by_code(&catalog, &cache, &code)?;
                cache.export_json(&cache_path)?;
                println!("✔ 追加しました: {}", entry.display_name);
            }

            if let (Some(key), Some(value)) = (remove_key, remove_value) {
                let field: CatalogField = key.parse().map_err(error::TrayAiError::from)?;
                let removed = cache.remove_matching(field, &value);
                cache.export_json(&cache_path)?;
                println!("✔ {}件削除しました", removed);
            }

            if show {
                println!("{}", serde_json::to_string_pretty(&cache.snapshot())?);
            } else {
                println!("キャッシュ情報:");
                println!("  パス: {}", cache_path.display());
                println!("  件数: {}", cache.len());
            }
        }

        Commands::Log { image, items, dir } => {
            let bytes = std::fs::read(&image)
                .with_context(|| format!("画像を読み込めません: {}", image.display()))?;
            let content = std::fs::read_to_string(&items)?;
            let boxes: Vec<labelme::LoggedBox> = serde_json::from_str(&content)?;

            let save_dir = match dir {
                Some(dir) => dir,
                None => labelme::daily_dir(&config.log_dir)?,
            };
            let path = labelme::log_as_labelme(&STANDARD.encode(bytes), &boxes, &save_dir)?;
            println!("✔ ログを保存: {}", path.display());
        }

        Commands::Config { set_catalog, show } => {
            let mut config = config;

            if let Some(path) = set_catalog {
                config.set_catalog_path(path)?;
                println!("✔ 料理マスタを設定しました");
            }

            if show {
                println!("設定:");
                println!(
                    "  料理マスタ: {}",
                    config
                        .catalog_path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "未設定".into())
                );
                println!("  キャッシュ: {}", config.cache_path().display());
                println!("  ログ保存先: {}", config.log_dir.display());
                println!("  距離しきい値: {}", config.distance_threshold);
                println!("  栄養素列必須: {}", if config.extended_schema { "はい" } else { "いいえ" });
            }
        }
    }

    Ok(())
}

/// 料理マスタを開く。読み込めなければ処理を中止する
fn open_catalog(cli_path: Option<&Path>, config: &Config) -> Result<CatalogIndex> {
    let path: PathBuf = match cli_path.map(Path::to_path_buf).or_else(|| config.catalog_path()) {
        Some(path) => path,
        None => catalog_selector::select_catalog_interactive(Path::new("catalog"))?
            .ok_or(error::TrayAiError::MissingCatalog)?,
    };

    catalog::load_catalog(&path, config.schema())
        .with_context(|| format!("料理マスタを読み込めません: {}", path.display()))
}
