use crate::domain::model::{DocumentRef, PublicationState, PublicationTag};
use chrono::{DateTime, Local};
use std::collections::BTreeMap;

/// 每個區域只保留最新的一份文件（依 `(year_suffix, quarter)` 比較）
pub fn latest_per_zone(documents: Vec<DocumentRef>) -> BTreeMap<String, DocumentRef> {
    let mut best: BTreeMap<String, DocumentRef> = BTreeMap::new();
    for doc in documents {
        let newer = match best.get(&doc.zone_name) {
            Some(current) => {
                (doc.year_suffix, doc.quarter) > (current.year_suffix, current.quarter)
            }
            None => true,
        };
        if newer {
            best.insert(doc.zone_name.clone(), doc);
        }
    }
    best
}

/// 所有選定文件中最新的發佈期別
pub fn newest_publication<'a, I>(selected: I) -> Option<PublicationTag>
where
    I: IntoIterator<Item = &'a DocumentRef>,
{
    selected.into_iter().map(DocumentRef::publication).max()
}

/// 只有「完全相同」才視為沒有變更；較舊的期別仍會重新產生
pub fn needs_regeneration(new_identifier: &str, previous: Option<&str>) -> bool {
    previous != Some(new_identifier)
}

/// 成功寫出檔案後才呼叫，回傳更新後的狀態
pub fn advance(
    state: &PublicationState,
    publication: PublicationTag,
    at: DateTime<Local>,
) -> PublicationState {
    PublicationState {
        latest_publication: Some(publication.to_string()),
        latest_publication_ts: Some(at.to_rfc3339()),
        extra: state.extra.clone(),
    }
}
