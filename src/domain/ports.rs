use crate::domain::model::{DocumentRef, PublicationState};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// 區域 -> 文件目錄
#[async_trait]
pub trait DocumentDirectory: Send + Sync {
    async fn list_documents(&self) -> Result<Vec<DocumentRef>>;
}

/// 依文件位置取得已抽取的純文字內容
#[async_trait]
pub trait DocumentTextProvider: Send + Sync {
    async fn fetch_text(&self, document: &DocumentRef) -> Result<String>;
}

#[async_trait]
pub trait StateStore: Send + Sync {
    async fn load(&self) -> Result<PublicationState>;
    async fn save(&self, state: &PublicationState) -> Result<()>;
}

#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn list_names(&self) -> Result<Vec<String>>;
    async fn write(&self, name: &str, data: &[u8]) -> Result<()>;
    /// 目標不存在時也回傳 Ok
    async fn delete(&self, name: &str) -> Result<()>;
}

pub trait ConfigProvider: Send + Sync {
    fn list_name(&self) -> &str;
    fn free_group_name(&self) -> &str;
    fn machine(&self) -> &str;
}

/// 對外公開的操作：執行一次完整流程、列出現有檔案
#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn run_pipeline(&self, today: NaiveDate) -> Result<bool>;
    async fn list_artifacts(&self) -> Result<Vec<String>>;
}
