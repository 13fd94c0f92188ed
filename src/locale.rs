//! User-facing messages in the supported display languages.
//!
//! The language is resolved once at startup (`--lang`, then `D1_SYNC_LANG`,
//! then the usual locale variables) and the resulting [`Messages`] are handed
//! to whatever prints progress.

use std::fmt;
use std::str::FromStr;

use crate::config::ConfigError;

/// Supported display languages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Language {
    #[default]
    En,
    ZhCn,
    ZhTw,
    Ja,
}

/// Locale variables inspected when no explicit language is given, in order.
const LOCALE_VARS: [&str; 4] = ["LANG", "LANGUAGE", "LC_ALL", "LC_MESSAGES"];

impl Language {
    /// Detect the language from environment lookups.
    ///
    /// `D1_SYNC_LANG` wins when it names a supported language; otherwise the
    /// first non-empty locale variable is matched against known locales.
    pub fn detect<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(lang) = lookup("D1_SYNC_LANG").and_then(|v| v.parse().ok()) {
            return lang;
        }

        let locale = LOCALE_VARS
            .iter()
            .filter_map(|var| lookup(var))
            .find(|v| !v.is_empty())
            .unwrap_or_default();

        if ["zh_CN", "zh-CN", "zh.CN"].iter().any(|p| locale.contains(p)) {
            Language::ZhCn
        } else if ["zh_TW", "zh-TW", "zh_HK", "zh.TW"]
            .iter()
            .any(|p| locale.contains(p))
        {
            Language::ZhTw
        } else if ["ja_JP", "ja-JP", "ja.JP"].iter().any(|p| locale.contains(p)) {
            Language::Ja
        } else {
            Language::En
        }
    }

    /// Detect the language from the process environment.
    pub fn from_env() -> Self {
        Self::detect(|var| std::env::var(var).ok())
    }

    pub fn messages(self) -> &'static Messages {
        match self {
            Language::En => &EN,
            Language::ZhCn => &ZH_CN,
            Language::ZhTw => &ZH_TW,
            Language::Ja => &JA,
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" => Ok(Language::En),
            "zh" | "zh-cn" => Ok(Language::ZhCn),
            "zh-tw" | "tw" => Ok(Language::ZhTw),
            "ja" | "jp" => Ok(Language::Ja),
            other => Err(format!(
                "unsupported language '{other}' (expected en, zh-CN, zh-TW or ja)"
            )),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Language::En => "en",
            Language::ZhCn => "zh-CN",
            Language::ZhTw => "zh-TW",
            Language::Ja => "ja",
        })
    }
}

/// Translated progress and status messages.
#[derive(Debug)]
pub struct Messages {
    pub title: &'static str,
    pub reading_config: &'static str,
    pub found_config: &'static str,
    pub local_database: &'static str,
    pub select_source: &'static str,
    pub binding: &'static str,
    pub no_db_selected: &'static str,
    pub cancelled: &'static str,
    sync_warning: &'static str,
    pub confirm_replace: &'static str,
    pub exporting_db: &'static str,
    pub export_complete: &'static str,
    pub cleaning_local: &'static str,
    cleaned_local: &'static str,
    pub processing_export: &'static str,
    pub export_processed: &'static str,
    pub importing_local: &'static str,
    pub import_complete: &'static str,
    synced_tables: &'static str,
    pub table: &'static str,
    pub records: &'static str,
    pub unable_to_count: &'static str,
    pub sync_success: &'static str,
    pub validation_failed: &'static str,
    /// Label in front of a failure, including its separator.
    pub error: &'static str,
    config_not_found: &'static str,
    pub no_databases: &'static str,
    pub no_local_database: &'static str,
}

impl Messages {
    pub fn sync_warning(&self, source: &str) -> String {
        self.sync_warning.replace("{source}", source)
    }

    pub fn cleaned_local(&self, count: usize) -> String {
        self.cleaned_local.replace("{count}", &count.to_string())
    }

    pub fn synced_tables(&self, count: usize) -> String {
        self.synced_tables.replace("{count}", &count.to_string())
    }

    /// Translated text for the config errors a user can act on.
    pub fn config_error(&self, err: &ConfigError) -> Option<String> {
        match err {
            ConfigError::NotFound { path } => Some(
                self.config_not_found
                    .replace("{path}", &path.display().to_string()),
            ),
            ConfigError::NoDatabases => Some(self.no_databases.to_string()),
            ConfigError::NoLocalDatabase => Some(self.no_local_database.to_string()),
            _ => None,
        }
    }
}

static EN: Messages = Messages {
    title: "🚀 D1 Sync to Local",
    reading_config: "Reading wrangler.toml...",
    found_config: "Found wrangler.toml",
    local_database: "Local database",
    select_source: "Select source database to sync from:",
    binding: "Binding",
    no_db_selected: "No database selected",
    cancelled: "Cancelled",
    sync_warning: "This will sync {source} to local database",
    confirm_replace: "All local data will be replaced. Continue?",
    exporting_db: "Exporting source database...",
    export_complete: "Export completed",
    cleaning_local: "Cleaning local database...",
    cleaned_local: "Cleaned local database ({count} files)",
    processing_export: "Processing export file...",
    export_processed: "Export file processed",
    importing_local: "Importing to local database...",
    import_complete: "Import completed",
    synced_tables: "Synced {count} tables:",
    table: "Table",
    records: "records",
    unable_to_count: "unable to count",
    sync_success: "✨ Sync completed successfully!",
    validation_failed: "Validation failed:",
    error: "Error: ",
    config_not_found: "{path} not found",
    no_databases: "No D1 databases found in wrangler config",
    no_local_database: "No local D1 database configuration found",
};

static ZH_CN: Messages = Messages {
    title: "🚀 D1 同步到本地",
    reading_config: "正在读取 wrangler.toml...",
    found_config: "找到 wrangler.toml",
    local_database: "本地数据库",
    select_source: "选择要同步的源数据库：",
    binding: "绑定",
    no_db_selected: "未选择数据库",
    cancelled: "已取消",
    sync_warning: "将把 {source} 同步到本地数据库",
    confirm_replace: "所有本地数据将被替换。是否继续？",
    exporting_db: "正在导出源数据库...",
    export_complete: "导出完成",
    cleaning_local: "正在清理本地数据库...",
    cleaned_local: "已清理本地数据库（{count} 个文件）",
    processing_export: "正在处理导出文件...",
    export_processed: "导出文件处理完成",
    importing_local: "正在导入到本地数据库...",
    import_complete: "导入完成",
    synced_tables: "已同步 {count} 个表：",
    table: "表",
    records: "条记录",
    unable_to_count: "无法统计",
    sync_success: "✨ 同步成功完成！",
    validation_failed: "验证失败：",
    error: "错误：",
    config_not_found: "未找到 {path}",
    no_databases: "wrangler.toml 中未找到 D1 数据库",
    no_local_database: "未找到本地 D1 数据库配置",
};

static ZH_TW: Messages = Messages {
    title: "🚀 D1 同步到本地",
    reading_config: "正在讀取 wrangler.toml...",
    found_config: "找到 wrangler.toml",
    local_database: "本地資料庫",
    select_source: "選擇要同步的來源資料庫：",
    binding: "綁定",
    no_db_selected: "未選擇資料庫",
    cancelled: "已取消",
    sync_warning: "將把 {source} 同步到本地資料庫",
    confirm_replace: "所有本地資料將被取代。是否繼續？",
    exporting_db: "正在匯出來源資料庫...",
    export_complete: "匯出完成",
    cleaning_local: "正在清理本地資料庫...",
    cleaned_local: "已清理本地資料庫（{count} 個檔案）",
    processing_export: "正在處理匯出檔案...",
    export_processed: "匯出檔案處理完成",
    importing_local: "正在匯入到本地資料庫...",
    import_complete: "匯入完成",
    synced_tables: "已同步 {count} 個表：",
    table: "表",
    records: "筆記錄",
    unable_to_count: "無法統計",
    sync_success: "✨ 同步成功完成！",
    validation_failed: "驗證失敗：",
    error: "錯誤：",
    config_not_found: "未找到 {path}",
    no_databases: "wrangler.toml 中未找到 D1 資料庫",
    no_local_database: "未找到本地 D1 資料庫設定",
};

static JA: Messages = Messages {
    title: "🚀 D1 ローカル同期",
    reading_config: "wrangler.toml を読み込み中...",
    found_config: "wrangler.toml が見つかりました",
    local_database: "ローカルデータベース",
    select_source: "同期元のデータベースを選択してください：",
    binding: "バインディング",
    no_db_selected: "データベースが選択されていません",
    cancelled: "キャンセルされました",
    sync_warning: "{source} をローカルデータベースに同期します",
    confirm_replace: "すべてのローカルデータが置き換えられます。続行しますか？",
    exporting_db: "ソースデータベースをエクスポート中...",
    export_complete: "エクスポート完了",
    cleaning_local: "ローカルデータベースをクリーニング中...",
    cleaned_local: "ローカルデータベースをクリーンアップしました（{count} ファイル）",
    processing_export: "エクスポートファイルを処理中...",
    export_processed: "エクスポートファイルの処理が完了しました",
    importing_local: "ローカルデータベースにインポート中...",
    import_complete: "インポート完了",
    synced_tables: "{count} 個のテーブルを同期しました：",
    table: "テーブル",
    records: "レコード",
    unable_to_count: "カウントできません",
    sync_success: "✨ 同期が正常に完了しました！",
    validation_failed: "検証に失敗しました：",
    error: "エラー：",
    config_not_found: "{path} が見つかりません",
    no_databases: "wrangler.toml に D1 データベースが見つかりません",
    no_local_database: "ローカル D1 データベース設定が見つかりません",
};
