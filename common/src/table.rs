//! 表形式データ（ヘッダー行＋データ行）
//!
//! 料理マスタの読み込み元（CSV / Excel）を共通の形にしたもの。

/// ヘッダー付きの文字列テーブル
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CatalogTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// CSV文字列から読み込み（1行目をヘッダーとして扱う）
    pub fn from_csv_str(content: &str) -> Self {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let mut lines = content.lines().filter(|l| !l.trim().is_empty());

        let headers = match lines.next() {
            Some(line) => parse_csv_line(line).into_iter().map(String::from).collect(),
            None => return Self::default(),
        };
        let rows = lines
            .map(|line| parse_csv_line(line).into_iter().map(String::from).collect())
            .collect();

        Self { headers, rows }
    }

    /// ヘッダー名に `pattern` を含む最初の列番号
    pub fn find_column(&self, pattern: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.contains(pattern))
    }
}

/// CSV行をパース（ダブルクォート対応）
fn parse_csv_line(line: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut in_quotes = false;
    let mut field_start = 0;

    for (i, c) in line.char_indices() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if c == ',' && !in_quotes {
            fields.push(trim_quotes(&line[field_start..i]));
            field_start = i + c.len_utf8();
        }
    }

    // 最後のフィールド
    fields.push(trim_quotes(&line[field_start..]));
    fields
}

fn trim_quotes(s: &str) -> &str {
    let s = s.trim();
    if s.starts_with('"') && s.ends_with('"') && s.len() >= 2 {
        &s[1..s.len() - 1]
    } else {
        s
    }
}
