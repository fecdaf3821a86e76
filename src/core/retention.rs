use crate::domain::model::PublicationTag;
use crate::domain::ports::ArtifactStore;
use crate::utils::error::Result;
use chrono::NaiveDate;

pub const ARTIFACT_PREFIX: &str = "bipt_inclusion_list_";
pub const ARTIFACT_SUFFIX: &str = ".ils";

pub fn artifact_name(tag: PublicationTag) -> String {
    format!("{}{}{}", ARTIFACT_PREFIX, tag, ARTIFACT_SUFFIX)
}

/// `bipt_inclusion_list_<YYYY>_Q<1-4>.ils` -> 期別；不符合命名規則回傳 None
pub fn parse_artifact_name(name: &str) -> Option<PublicationTag> {
    name.strip_prefix(ARTIFACT_PREFIX)?
        .strip_suffix(ARTIFACT_SUFFIX)?
        .parse()
        .ok()
}

pub fn is_artifact_name(name: &str) -> bool {
    parse_artifact_name(name).is_some()
}

/// 保留本季與下一季
pub fn keep_set(today: NaiveDate) -> [PublicationTag; 2] {
    let current = PublicationTag::for_date(today);
    [current, current.next()]
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RetentionReport {
    pub kept: Vec<String>,
    pub deleted: Vec<String>,
    pub failed: Vec<String>,
}

/// 刪除不在保留集合內的檔案；刪除失敗只記錄，不往上拋
pub async fn apply_retention<A: ArtifactStore + ?Sized>(
    store: &A,
    today: NaiveDate,
) -> Result<RetentionReport> {
    let keep = keep_set(today);
    let mut report = RetentionReport::default();

    let mut names = store.list_names().await?;
    names.sort();

    for name in names {
        let Some(tag) = parse_artifact_name(&name) else {
            continue;
        };
        if keep.contains(&tag) {
            report.kept.push(name);
            continue;
        }

        let outcome: Result<()> = store.delete(&name).await;
        match outcome {
            Ok(()) => {
                tracing::info!("🗑️  Removed stale artifact {}", name);
                report.deleted.push(name);
            }
            Err(e) => {
                tracing::warn!("⚠️  Could not remove {}: {}", name, e);
                report.failed.push(name);
            }
        }
    }

    tracing::debug!(
        "Retention for {} / {}: kept {}, deleted {}, failed {}",
        keep[0],
        keep[1],
        report.kept.len(),
        report.deleted.len(),
        report.failed.len()
    );
    Ok(report)
}
