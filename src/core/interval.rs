use crate::domain::model::FrequencyRange;

/// 合併重疊或相接的範圍，輸出依 `(start, end)` 排序且兩兩不相交
pub fn merge(ranges: &[FrequencyRange]) -> Vec<FrequencyRange> {
    let mut sorted = ranges.to_vec();
    sorted.sort();

    let mut merged: Vec<FrequencyRange> = Vec::with_capacity(sorted.len());
    for range in sorted {
        if let Some(current) = merged.last_mut() {
            // 相接（start == end）也要合併
            if range.start() <= current.end() {
                *current = FrequencyRange::new(current.start(), current.end().max(range.end()));
                continue;
            }
        }
        merged.push(range);
    }
    merged
}

/// 把新的範圍併入已合併的集合
pub fn merge_into(acc: &mut Vec<FrequencyRange>, ranges: &[FrequencyRange]) {
    acc.extend_from_slice(ranges);
    *acc = merge(acc);
}
