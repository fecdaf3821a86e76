#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::adapters::http::DEFAULT_SOURCE_URL;
use crate::core::extractor::ExtractorConfig;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_lang_code, validate_non_empty_string, validate_path, validate_range, validate_url,
    Validate,
};
use toml_config::TomlConfig;

pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_LANG: &str = "NL";
pub const DEFAULT_LIST_NAME: &str = "Belgium (BIPT zones)";
pub const DEFAULT_FREE_GROUP_NAME: &str = "Vrije frequenties";
pub const DEFAULT_CHECK_HOUR: u32 = 2;
pub const DEFAULT_CHECK_MINUTE: u32 = 15;

/// 合併命令列、設定檔與預設值後的最終設定
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_dir: String,
    pub source_url: String,
    pub lang: String,
    pub list_name: String,
    pub free_group_name: String,
    pub machine: String,
    pub check_hour: u32,
    pub check_minute: u32,
    pub extractor: ExtractorConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: DEFAULT_DATA_DIR.to_string(),
            source_url: DEFAULT_SOURCE_URL.to_string(),
            lang: DEFAULT_LANG.to_string(),
            list_name: DEFAULT_LIST_NAME.to_string(),
            free_group_name: DEFAULT_FREE_GROUP_NAME.to_string(),
            machine: detect_machine_name(),
            check_hour: DEFAULT_CHECK_HOUR,
            check_minute: DEFAULT_CHECK_MINUTE,
            extractor: ExtractorConfig::default(),
        }
    }
}

impl AppConfig {
    /// 套用設定檔中有設定的欄位
    pub fn merge_toml(mut self, file: TomlConfig) -> Self {
        if let Some(v) = file.source.url {
            self.source_url = v;
        }
        if let Some(v) = file.source.lang {
            self.lang = v;
        }
        if let Some(v) = file.output.data_dir {
            self.data_dir = v;
        }
        if let Some(v) = file.output.list_name {
            self.list_name = v;
        }
        if let Some(v) = file.output.free_group_name {
            self.free_group_name = v;
        }
        if let Some(v) = file.output.machine {
            self.machine = v;
        }
        if let Some(v) = file.extract.marker {
            self.extractor.marker = v;
        }
        if let Some(v) = file.extract.free_phrases {
            self.extractor.free_phrases = v;
        }
        if let Some(v) = file.schedule.check_hour {
            self.check_hour = v;
        }
        if let Some(v) = file.schedule.check_minute {
            self.check_minute = v;
        }
        self
    }

    #[cfg(feature = "cli")]
    pub fn from_cli(args: &cli::CliArgs) -> Result<Self> {
        let mut config = Self::default();
        if let Some(path) = &args.config {
            config = config.merge_toml(TomlConfig::from_file(path)?);
        }
        Ok(config.merge_cli(args))
    }

    #[cfg(feature = "cli")]
    fn merge_cli(mut self, args: &cli::CliArgs) -> Self {
        let overrides = [
            (&args.data_dir, &mut self.data_dir),
            (&args.source_url, &mut self.source_url),
            (&args.lang, &mut self.lang),
            (&args.list_name, &mut self.list_name),
            (&args.free_group_name, &mut self.free_group_name),
            (&args.machine, &mut self.machine),
        ];
        for (value, target) in overrides {
            if let Some(v) = value {
                *target = v.clone();
            }
        }
        if let Some(v) = args.check_hour {
            self.check_hour = v;
        }
        if let Some(v) = args.check_minute {
            self.check_minute = v;
        }
        self
    }
}

impl ConfigProvider for AppConfig {
    fn list_name(&self) -> &str {
        &self.list_name
    }

    fn free_group_name(&self) -> &str {
        &self.free_group_name
    }

    fn machine(&self) -> &str {
        &self.machine
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_path("data_dir", &self.data_dir)?;
        validate_url("source_url", &self.source_url)?;
        validate_lang_code("lang", &self.lang)?;
        validate_non_empty_string("list_name", &self.list_name)?;
        validate_non_empty_string("free_group_name", &self.free_group_name)?;
        validate_non_empty_string("extract.marker", &self.extractor.marker)?;
        validate_range("check_hour", self.check_hour, 0, 23)?;
        validate_range("check_minute", self.check_minute, 0, 59)?;
        Ok(())
    }
}

#[cfg(feature = "cli")]
fn detect_machine_name() -> String {
    sysinfo::System::host_name().unwrap_or_else(|| "unknown".to_string())
}

#[cfg(not(feature = "cli"))]
fn detect_machine_name() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "unknown".to_string())
}
