use crate::core::extractor::split_by_class;
use crate::core::interval::{merge, merge_into};
use crate::domain::model::{ClassifiedLine, FrequencyRange, ZoneGroup};

/// 累積每個區域的可用範圍，以及所有區域共用的免權利金聯集
#[derive(Debug, Default)]
pub struct GroupAccumulator {
    zones: Vec<ZoneGroup>,
    free_union: Vec<FrequencyRange>,
}

impl GroupAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_zone(&mut self, zone_name: &str, lines: &[ClassifiedLine]) -> &ZoneGroup {
        let (licensed, free) = split_by_class(lines);
        let licensed = merge(&licensed);
        let free = merge(&free);

        let mut usable = licensed.clone();
        usable.extend_from_slice(&free);

        tracing::debug!(
            "🧮 {}: {} licensed, {} free range(s) after merge",
            zone_name,
            licensed.len(),
            free.len()
        );

        merge_into(&mut self.free_union, &free);
        self.zones.push(ZoneGroup {
            zone_name: zone_name.to_string(),
            ranges: merge(&usable),
        });
        &self.zones[self.zones.len() - 1]
    }

    pub fn free_union(&self) -> &[FrequencyRange] {
        &self.free_union
    }

    /// 區域依名稱（不分大小寫）排序，免權利金群組固定放最後
    pub fn finish(self, free_group_name: &str) -> Vec<ZoneGroup> {
        let mut groups = self.zones;
        groups.sort_by(|a, b| {
            a.zone_name
                .to_lowercase()
                .cmp(&b.zone_name.to_lowercase())
                .then_with(|| a.zone_name.cmp(&b.zone_name))
        });
        groups.push(ZoneGroup {
            zone_name: free_group_name.to_string(),
            ranges: self.free_union,
        });
        groups
    }
}
