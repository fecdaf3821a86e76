use crate::domain::model::{ClassifiedLine, FrequencyRange};

pub const DEFAULT_MARKER: &str = "OK";
pub const DEFAULT_FREE_PHRASES: [&str; 3] = ["VRIJGESTELD", "MAXIMUM 10 MW", "MAX 10 MW"];

/// 抽取規則：授權標記與免權利金的判斷片語
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    pub marker: String,
    pub free_phrases: Vec<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            free_phrases: DEFAULT_FREE_PHRASES.iter().map(|p| p.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token {
    Numeric(f64),
    NotNumeric,
}

/// 數字格式：一串數字，最多一個小數點（`.` 或 `,`）
pub fn classify_token(token: &str) -> Token {
    match normalize_decimal(token) {
        Some(normalized) => normalized
            .parse::<f64>()
            .map(Token::Numeric)
            .unwrap_or(Token::NotNumeric),
        None => Token::NotNumeric,
    }
}

fn normalize_decimal(token: &str) -> Option<String> {
    let (int_part, frac_part) = match token.find(['.', ',']) {
        Some(idx) => (&token[..idx], Some(&token[idx + 1..])),
        None => (token, None),
    };

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) {
        return None;
    }
    match frac_part {
        Some(frac) if all_digits(frac) => Some(format!("{}.{}", int_part, frac)),
        Some(_) => None,
        None => Some(int_part.to_string()),
    }
}

pub fn mhz_to_khz(mhz: f64) -> u64 {
    (mhz * 1000.0).round() as u64
}

pub struct RecordExtractor {
    config: ExtractorConfig,
    marker_upper: String,
    free_upper: Vec<String>,
}

impl RecordExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        let marker_upper = config.marker.to_uppercase();
        let free_upper = config.free_phrases.iter().map(|p| p.to_uppercase()).collect();
        Self {
            config,
            marker_upper,
            free_upper,
        }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn is_free_line(&self, line: &str) -> bool {
        let upper = line.to_uppercase();
        self.free_upper.iter().any(|phrase| upper.contains(phrase.as_str()))
    }

    /// 解析單行；不符合格式的行回傳 None，不會出錯
    pub fn parse_line(&self, line: &str) -> Option<(FrequencyRange, bool)> {
        let line = line.trim();
        if line.is_empty() || !line.to_uppercase().contains(self.marker_upper.as_str()) {
            return None;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        let marker_idx = tokens
            .iter()
            .position(|t| t.to_uppercase() == self.marker_upper)?;

        let numbers: Vec<f64> = tokens[..marker_idx]
            .iter()
            .filter_map(|t| match classify_token(t) {
                Token::Numeric(value) => Some(value),
                Token::NotNumeric => None,
            })
            .collect();

        let [.., low, high] = numbers.as_slice() else {
            return None;
        };

        let range = FrequencyRange::new(mhz_to_khz(*low), mhz_to_khz(*high));
        Some((range, self.is_free_line(line)))
    }

    pub fn extract(&self, zone_name: &str, text: &str) -> Vec<ClassifiedLine> {
        text.lines()
            .filter_map(|line| self.parse_line(line))
            .map(|(range, is_free)| ClassifiedLine {
                zone_name: zone_name.to_string(),
                range,
                is_free,
            })
            .collect()
    }
}

impl Default for RecordExtractor {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}

/// 依分類拆成 (授權, 免權利金)
pub fn split_by_class(lines: &[ClassifiedLine]) -> (Vec<FrequencyRange>, Vec<FrequencyRange>) {
    let (free, licensed): (Vec<_>, Vec<_>) = lines.iter().partition(|l| l.is_free);
    (
        licensed.into_iter().map(|l| l.range).collect(),
        free.into_iter().map(|l| l.range).collect(),
    )
}
