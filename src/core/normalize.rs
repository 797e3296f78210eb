use crate::domain::model::{Keyword, RelationshipSet, SourceFormat, UploadedPart};
use crate::utils::error::{AuditError, Result};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// 外層物件中可能包住清單的欄位，依序查找
const WRAPPER_FIELDS: [&str; 2] = [
    Keyword::Following.wrapper_field(),
    Keyword::Followers.wrapper_field(),
];

const STRING_LIST_FIELD: &str = "string_list_data";

/// 個人頁連結所在的網域片段
pub const PROFILE_DOMAIN: &str = "instagram.com";

/// 網站導覽用的路徑，不是帳號
pub const RESERVED_PATHS: [&str; 18] = [
    "accounts",
    "about",
    "developer",
    "explore",
    "reels",
    "stories",
    "legal",
    "privacy",
    "terms",
    "directory",
    "oauth",
    "graphql",
    "i",
    "p",
    "web",
    "emails",
    "security",
    "help",
];

static PROFILE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"{}/([A-Za-z0-9._]+)/",
        regex::escape(PROFILE_DOMAIN)
    ))
    .unwrap()
});

/// 把 JSON 與舊版 HTML 匯出轉成 RelationshipSet
pub struct FormatNormalizer;

impl FormatNormalizer {
    /// 依副檔名、宣告的 content type、最後以內容判斷格式
    pub fn detect_format(part: &UploadedPart) -> SourceFormat {
        let name = part.file_name.to_lowercase();
        if name.ends_with(".json") {
            return SourceFormat::Json;
        }
        if name.ends_with(".html") || name.ends_with(".htm") {
            return SourceFormat::Html;
        }

        if let Some(content_type) = &part.content_type {
            let content_type = content_type.to_lowercase();
            if content_type.contains("json") {
                return SourceFormat::Json;
            }
            if content_type.contains("html") {
                return SourceFormat::Html;
            }
        }

        match part.bytes.iter().find(|b| !b.is_ascii_whitespace()) {
            Some(b'{') | Some(b'[') => SourceFormat::Json,
            _ => SourceFormat::Html,
        }
    }

    pub fn normalize(bytes: &[u8], format: SourceFormat, origin: &str) -> Result<RelationshipSet> {
        let set = match format {
            SourceFormat::Json => Self::parse_json(bytes, origin)?,
            SourceFormat::Html => Self::parse_html(bytes),
        };
        tracing::debug!("Normalized {} usernames from {} ({})", set.len(), origin, format);
        Ok(set)
    }

    /// 接受外層物件 (`relationships_following` / `relationships_followers`) 或直接的清單。
    ///
    /// 缺少巢狀結構的元素會被略過，不會讓整份檔案失敗。
    pub fn parse_json(bytes: &[u8], origin: &str) -> Result<RelationshipSet> {
        let document: Value = serde_json::from_slice(bytes)
            .map_err(|e| AuditError::format(origin, "JSON", e.to_string()))?;

        let items = relationship_list(&document).ok_or_else(|| {
            AuditError::format(
                origin,
                "JSON",
                format!(
                    "expected a list or an object with one of {}",
                    WRAPPER_FIELDS.join(", ")
                ),
            )
        })?;

        let mut set = RelationshipSet::source_ordered();
        let mut skipped = 0usize;
        for item in items {
            match string_list_entry(item) {
                Some((username, timestamp)) => set.insert(username, timestamp),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            tracing::warn!(
                "⚠️ Skipped {} of {} entries without usable {} in {}",
                skipped,
                items.len(),
                STRING_LIST_FIELD,
                origin
            );
        }
        Ok(set)
    }

    /// 以個人頁連結樣式掃描文字；無效位元組以替代字元處理，不會失敗
    pub fn parse_html(bytes: &[u8]) -> RelationshipSet {
        let text = String::from_utf8_lossy(bytes);

        let mut set = RelationshipSet::unordered();
        for captures in PROFILE_LINK.captures_iter(&text) {
            let handle = &captures[1];
            if RESERVED_PATHS.contains(&handle) {
                continue;
            }
            set.insert(handle, None);
        }
        set
    }
}

fn relationship_list(document: &Value) -> Option<&Vec<Value>> {
    match document {
        Value::Array(items) => Some(items),
        Value::Object(fields) => WRAPPER_FIELDS
            .iter()
            .find_map(|field| fields.get(*field))
            .and_then(Value::as_array),
        _ => None,
    }
}

/// 取出 `string_list_data[0]` 的帳號與時間戳。
///
/// 欄位缺失時的處理方式：
/// - `string_list_data` 不存在、不是清單或為空：整個元素略過
/// - `value` 不存在或不是字串：整個元素略過
/// - `timestamp` 不存在或不是整數：保留元素，時間戳為 None
fn string_list_entry(item: &Value) -> Option<(&str, Option<i64>)> {
    let first = item.get(STRING_LIST_FIELD)?.as_array()?.first()?;
    let username = first.get("value")?.as_str()?;
    let timestamp = first.get("timestamp").and_then(Value::as_i64);
    Some((username, timestamp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(value: &str, timestamp: i64) -> Value {
        json!({
            "title": "",
            "media_list_data": [],
            "string_list_data": [{
                "href": format!("https://www.instagram.com/{value}"),
                "value": value,
                "timestamp": timestamp
            }]
        })
    }

    #[test]
    fn test_parse_wrapped_following_list() {
        let doc = json!({ "relationships_following": [entry("alice", 100), entry("bob", 200)] });
        let set = FormatNormalizer::parse_json(doc.to_string().as_bytes(), "following.json").unwrap();

        assert_eq!(set.usernames(), vec!["alice", "bob"]);
        assert_eq!(set.get("bob"), Some(Some(200)));
    }

    #[test]
    fn test_parse_bare_followers_list() {
        let doc = json!([entry("carol", 300)]);
        let set = FormatNormalizer::parse_json(doc.to_string().as_bytes(), "followers_1.json").unwrap();
        assert_eq!(set.get("carol"), Some(Some(300)));
    }

    #[test]
    fn test_duplicate_usernames_keep_last_timestamp() {
        let doc = json!([entry("dave", 10), entry("erin", 11), entry("dave", 20)]);
        let set = FormatNormalizer::parse_json(doc.to_string().as_bytes(), "following.json").unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.get("dave"), Some(Some(20)));
        assert_eq!(set.usernames(), vec!["dave", "erin"]);
    }

    #[test]
    fn test_malformed_elements_are_skipped() {
        let doc = json!([
            entry("alice", 1),
            { "string_list_data": [] },
            { "title": "no nested list" },
            { "string_list_data": [{ "href": "https://www.instagram.com/x" }] },
            { "string_list_data": [{ "value": "notime" }] },
            "not even an object"
        ]);
        let set = FormatNormalizer::parse_json(doc.to_string().as_bytes(), "followers.json").unwrap();

        assert_eq!(set.usernames(), vec!["alice", "notime"]);
        assert_eq!(set.get("notime"), Some(None));
    }

    #[test]
    fn test_invalid_json_is_a_format_error() {
        let err = FormatNormalizer::parse_json(b"{ not json", "following.json").unwrap_err();
        assert!(matches!(err, AuditError::FormatError { .. }));
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_object_without_known_field_is_a_format_error() {
        let err = FormatNormalizer::parse_json(br#"{"something_else": []}"#, "x.json").unwrap_err();
        assert!(matches!(err, AuditError::FormatError { .. }));
    }

    #[test]
    fn test_html_extracts_profile_links() {
        let html = r#"
            <div><a href="https://www.instagram.com/alice/">alice</a></div>
            <div><a href="https://www.instagram.com/bob.smith_2/">bob</a></div>
            <div><a href="https://www.instagram.com/alice/">alice again</a></div>
        "#;
        let set = FormatNormalizer::parse_html(html.as_bytes());
        assert_eq!(set.len(), 2);
        assert!(set.contains("alice"));
        assert!(set.contains("bob.smith_2"));
        assert_eq!(set.get("alice"), Some(None));
    }

    #[test]
    fn test_html_never_emits_reserved_paths() {
        let html = r#"
            <a href="https://help.instagram.com/">x</a>
            <a href="https://www.instagram.com/help/">Help</a>
            <a href="https://www.instagram.com/accounts/login/">Login</a>
            <a href="https://www.instagram.com/p/">p</a>
            <a href="https://www.instagram.com/carol/">carol</a>
        "#;
        let set = FormatNormalizer::parse_html(html.as_bytes());
        assert!(!set.contains("help"));
        assert!(!set.contains("accounts"));
        assert!(!set.contains("p"));
        assert_eq!(set.usernames(), vec!["carol"]);
    }

    #[test]
    fn test_html_tolerates_invalid_utf8() {
        let mut bytes = b"<a href=\"https://www.instagram.com/dave/\">".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe, 0x00]);
        bytes.extend_from_slice(b"<a href=\"https://www.instagram.com/erin/\">");

        let set = FormatNormalizer::parse_html(&bytes);
        assert_eq!(set.usernames(), vec!["dave", "erin"]);
    }

    #[test]
    fn test_detect_format() {
        let json_named = UploadedPart::new("Following.JSON", b"<html>".to_vec());
        assert_eq!(FormatNormalizer::detect_format(&json_named), SourceFormat::Json);

        let typed = UploadedPart::new("upload", b"".to_vec()).with_content_type("text/html; charset=utf-8");
        assert_eq!(FormatNormalizer::detect_format(&typed), SourceFormat::Html);

        let sniffed = UploadedPart::new("upload", b"  \n[{}]".to_vec());
        assert_eq!(FormatNormalizer::detect_format(&sniffed), SourceFormat::Json);

        let legacy = UploadedPart::new("followers.htm", b"{".to_vec());
        assert_eq!(FormatNormalizer::detect_format(&legacy), SourceFormat::Html);
    }
}
