use crate::domain::model::ZoneGroup;
use chrono::{DateTime, Local};
use uuid::Uuid;

/// 識別碼：UUIDv5，namespace 固定為 URL namespace
pub const LIST_ID_PREFIX: &str = "wwb-inclusion-list:";
pub const GROUP_ID_PREFIX: &str = "wwb-inclusion-group:";

pub fn list_uuid(list_name: &str) -> Uuid {
    Uuid::new_v5(
        &Uuid::NAMESPACE_URL,
        format!("{}{}", LIST_ID_PREFIX, list_name).as_bytes(),
    )
}

pub fn group_uuid(list_name: &str, group_name: &str) -> Uuid {
    Uuid::new_v5(
        &Uuid::NAMESPACE_URL,
        format!("{}{}:{}", GROUP_ID_PREFIX, list_name, group_name).as_bytes(),
    )
}

pub fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

/// 產生清單時的中繼資料
#[derive(Debug, Clone)]
pub struct ListMetadata<'a> {
    pub list_name: &'a str,
    pub machine: &'a str,
    pub generated_at: DateTime<Local>,
}

pub fn render_inclusion_list(meta: &ListMetadata<'_>, groups: &[ZoneGroup]) -> String {
    let date_str = meta.generated_at.format("%a %b %d %Y").to_string();
    let time_str = meta.generated_at.format("%H:%M:%S").to_string();

    let mut lines: Vec<String> = Vec::new();
    lines.push(r#"<?xml version="1.0" encoding="UTF-8"?>"#.to_string());
    lines.push(format!(
        r#"<inclusion_list active="false" user="" date="{}" time="{}" version="1.0" name="{}" machine="{}" uuid="{}">"#,
        xml_escape(&date_str),
        xml_escape(&time_str),
        xml_escape(meta.list_name),
        xml_escape(meta.machine),
        list_uuid(meta.list_name)
    ));

    for group in groups {
        lines.push(format!(
            r##"    <inclusion_group color="#FFFFFF" version="1.0" name="{}" uuid="{}">"##,
            xml_escape(&group.zone_name),
            group_uuid(meta.list_name, &group.zone_name)
        ));
        lines.push(r#"        <freqs units="KHz" count="0"/>"#.to_string());
        lines.push(format!(
            r#"        <freq_ranges units="KHz" count="{}">"#,
            group.ranges.len()
        ));
        for range in &group.ranges {
            lines.push("            <fr>".to_string());
            lines.push(format!("                <f>{}</f>", range.start()));
            lines.push(format!("                <f>{}</f>", range.end()));
            lines.push("            </fr>".to_string());
        }
        lines.push("        </freq_ranges>".to_string());
        lines.push("    </inclusion_group>".to_string());
    }

    lines.push("</inclusion_list>".to_string());
    lines.join("\n")
}
