use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tray-ai")]
#[command(about = "セルフレジ向け お皿・料理ペアリング＆メニュー解決ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 料理マスタ (CSV / Excel)。省略時は設定・環境変数 TRAY_AI_CATALOG を使用
    #[arg(short, long, global = true)]
    pub catalog: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 検出結果JSONからメニューと合計金額を求める
    Resolve {
        /// 検出結果JSON（{"plates": [...], "dishes": [...]}）
        #[arg(required = true)]
        input: PathBuf,

        /// 出力JSONファイル（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// お皿と料理の中心間距離のしきい値
        #[arg(short, long)]
        threshold: Option<f64>,

        /// 解決したメニューを最近のメニューに記録
        #[arg(long)]
        record: bool,
    },

    /// 料理マスタを部分一致で検索
    Search {
        /// 検索キー (display_name/romaji/yolo_name/jan_code/price/menu_code)
        #[arg(short, long)]
        key: String,

        /// 検索値
        #[arg(long)]
        value: String,
    },

    /// 最近のメニュー（キャッシュ）管理
    Cache {
        /// 一覧を表示
        #[arg(long)]
        show: bool,

        /// 料理コードで料理マスタから追加（同じコードが複数あれば先頭の行）
        #[arg(long)]
        add_code: Option<String>,

        /// 削除する要素の検索キー
        #[arg(long, requires = "remove_value")]
        remove_key: Option<String>,

        /// 削除する要素の検索値
        #[arg(long, requires = "remove_key")]
        remove_value: Option<String>,

        /// キャッシュを空にする
        #[arg(long)]
        reset: bool,
    },

    /// 確定結果をLabelMe形式で保存
    Log {
        /// 撮影画像
        #[arg(long, required = true)]
        image: PathBuf,

        /// 確定したbboxのJSON（[{"label": ..., "xyxy": [...]}]）
        #[arg(long, required = true)]
        items: PathBuf,

        /// 保存先（省略時は設定の log_dir/今日の日付）
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// 設定を表示/編集
    Config {
        /// 料理マスタのパスを設定
        #[arg(long)]
        set_catalog: Option<PathBuf>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
