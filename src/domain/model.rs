use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// 閉區間頻率範圍，單位 kHz，保證 `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrequencyRange {
    start: u64,
    end: u64,
}

impl FrequencyRange {
    /// 端點順序顛倒時自動交換
    pub fn new(a: u64, b: u64) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn contains(&self, khz: u64) -> bool {
        self.start <= khz && khz <= self.end
    }
}

impl fmt::Display for FrequencyRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{} kHz", self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedLine {
    pub zone_name: String,
    pub range: FrequencyRange,
    pub is_free: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneGroup {
    pub zone_name: String,
    pub ranges: Vec<FrequencyRange>,
}

/// 單一區域文件的參考資訊（來自法規機關的文件目錄）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    pub zone_name: String,
    pub code: String,
    pub lang: String,
    pub year_suffix: u8,
    pub quarter: u8,
    pub locator: String,
}

impl DocumentRef {
    pub fn publication(&self) -> PublicationTag {
        PublicationTag {
            year: 2000 + u16::from(self.year_suffix),
            quarter: self.quarter,
        }
    }

    pub fn file_stem(&self) -> String {
        format!(
            "{}-{}-{:02}-{}",
            self.code, self.lang, self.year_suffix, self.quarter
        )
    }
}

/// 年度 + 季度，格式化為 `2024_Q4`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PublicationTag {
    pub year: u16,
    pub quarter: u8,
}

impl PublicationTag {
    pub fn new(year: u16, quarter: u8) -> Option<Self> {
        (1..=4).contains(&quarter).then_some(Self { year, quarter })
    }

    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            year: date.year() as u16,
            quarter: (date.month0() / 3 + 1) as u8,
        }
    }

    pub fn next(self) -> Self {
        if self.quarter == 4 {
            Self {
                year: self.year + 1,
                quarter: 1,
            }
        } else {
            Self {
                year: self.year,
                quarter: self.quarter + 1,
            }
        }
    }
}

impl fmt::Display for PublicationTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}_Q{}", self.year, self.quarter)
    }
}

impl FromStr for PublicationTag {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (year, quarter) = s
            .split_once("_Q")
            .ok_or_else(|| format!("invalid publication tag: {}", s))?;
        // `u16::from_str` 允許前置 `+`，所以先確認全是數字
        let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if year.len() != 4 || quarter.len() != 1 || !digits(year) || !digits(quarter) {
            return Err(format!("invalid publication tag: {}", s));
        }
        let year: u16 = year
            .parse()
            .map_err(|_| format!("invalid year in publication tag: {}", s))?;
        let quarter: u8 = quarter
            .parse()
            .map_err(|_| format!("invalid quarter in publication tag: {}", s))?;
        Self::new(year, quarter).ok_or_else(|| format!("quarter out of range: {}", s))
    }
}

/// 持久化的發佈狀態（meta.json）
///
/// 時間戳以字串保存（RFC 3339），舊檔案裡沒有時區的格式也能讀取；
/// 未知欄位保留在 `extra`，寫回時不會遺失。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PublicationState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_publication: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_publication_ts: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}
