use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// 要在匯出檔中尋找的關係種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Followers,
    Following,
}

impl Keyword {
    pub const fn as_str(self) -> &'static str {
        match self {
            Keyword::Followers => "followers",
            Keyword::Following => "following",
        }
    }

    /// JSON 匯出外層物件中包住清單的欄位
    pub const fn wrapper_field(self) -> &'static str {
        match self {
            Keyword::Followers => "relationships_followers",
            Keyword::Following => "relationships_following",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 來源格式，同時也是壓縮檔解析時的優先層級 (JSON 優先於 HTML)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Json,
    Html,
}

impl SourceFormat {
    pub fn extension(self) -> &'static str {
        match self {
            SourceFormat::Json => ".json",
            SourceFormat::Html => ".html",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SourceFormat::Json => "JSON",
            SourceFormat::Html => "HTML",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    pub username: String,
    pub timestamp: Option<i64>,
}

impl RelationshipRecord {
    pub fn new(username: impl Into<String>, timestamp: Option<i64>) -> Self {
        Self {
            username: username.into(),
            timestamp,
        }
    }
}

/// 集合的迭代順序是型別的一部分，而不是底層容器的副作用
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOrdering {
    /// 依來源出現順序；重複的帳號保留第一次出現的位置、最後一次的時間戳
    SourceOrder,
    /// 沒有語意上的順序；迭代時以帳號排序，讓輸出可重現
    Unordered,
}

#[derive(Debug, Clone)]
enum Entries {
    Ordered {
        records: Vec<RelationshipRecord>,
        index: HashMap<String, usize>,
    },
    Unordered(BTreeMap<String, Option<i64>>),
}

/// 以帳號為鍵的關係集合，同一帳號只會有一筆
#[derive(Debug, Clone)]
pub struct RelationshipSet {
    entries: Entries,
}

impl RelationshipSet {
    pub fn new(ordering: SetOrdering) -> Self {
        let entries = match ordering {
            SetOrdering::SourceOrder => Entries::Ordered {
                records: Vec::new(),
                index: HashMap::new(),
            },
            SetOrdering::Unordered => Entries::Unordered(BTreeMap::new()),
        };
        Self { entries }
    }

    pub fn source_ordered() -> Self {
        Self::new(SetOrdering::SourceOrder)
    }

    pub fn unordered() -> Self {
        Self::new(SetOrdering::Unordered)
    }

    pub fn ordering(&self) -> SetOrdering {
        match self.entries {
            Entries::Ordered { .. } => SetOrdering::SourceOrder,
            Entries::Unordered(_) => SetOrdering::Unordered,
        }
    }

    /// 已存在的帳號會被覆寫時間戳 (last write wins)
    pub fn insert(&mut self, username: impl Into<String>, timestamp: Option<i64>) {
        let username = username.into();
        match &mut self.entries {
            Entries::Ordered { records, index } => match index.get(&username) {
                Some(&pos) => records[pos].timestamp = timestamp,
                None => {
                    index.insert(username.clone(), records.len());
                    records.push(RelationshipRecord::new(username, timestamp));
                }
            },
            Entries::Unordered(map) => {
                map.insert(username, timestamp);
            }
        }
    }

    pub fn contains(&self, username: &str) -> bool {
        match &self.entries {
            Entries::Ordered { index, .. } => index.contains_key(username),
            Entries::Unordered(map) => map.contains_key(username),
        }
    }

    /// 外層 None 表示不在集合內，內層 None 表示來源沒有時間戳
    pub fn get(&self, username: &str) -> Option<Option<i64>> {
        match &self.entries {
            Entries::Ordered { records, index } => index.get(username).map(|&i| records[i].timestamp),
            Entries::Unordered(map) => map.get(username).copied(),
        }
    }

    pub fn len(&self) -> usize {
        match &self.entries {
            Entries::Ordered { records, .. } => records.len(),
            Entries::Unordered(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> Box<dyn Iterator<Item = (&str, Option<i64>)> + '_> {
        match &self.entries {
            Entries::Ordered { records, .. } => Box::new(
                records
                    .iter()
                    .map(|r| (r.username.as_str(), r.timestamp)),
            ),
            Entries::Unordered(map) => Box::new(map.iter().map(|(u, t)| (u.as_str(), *t))),
        }
    }

    pub fn usernames(&self) -> Vec<&str> {
        self.iter().map(|(u, _)| u).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffResult {
    pub not_following_back: Vec<RelationshipRecord>,
    pub not_followed_by_you: Vec<RelationshipRecord>,
}

/// 單一上傳檔案 (或壓縮檔中的成員)
#[derive(Debug, Clone)]
pub struct UploadedPart {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedPart {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// 一次請求的輸入：兩個獨立檔案，或一個 ZIP 匯出
#[derive(Debug, Clone)]
pub enum ExportInput {
    Loose {
        following: UploadedPart,
        followers: UploadedPart,
    },
    Archive(UploadedPart),
}

impl ExportInput {
    pub fn describe(&self) -> String {
        match self {
            ExportInput::Loose {
                following,
                followers,
            } => format!(
                "loose files ({}, {})",
                following.file_name, followers.file_name
            ),
            ExportInput::Archive(part) => format!("archive {}", part.file_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_ordered_set_keeps_first_position_last_value() {
        let mut set = RelationshipSet::source_ordered();
        set.insert("dave", Some(10));
        set.insert("erin", Some(15));
        set.insert("dave", Some(20));

        assert_eq!(set.len(), 2);
        assert_eq!(set.get("dave"), Some(Some(20)));
        assert_eq!(set.usernames(), vec!["dave", "erin"]);
    }

    #[test]
    fn test_unordered_set_iterates_sorted() {
        let mut set = RelationshipSet::unordered();
        set.insert("zoe", None);
        set.insert("adam", None);
        set.insert("zoe", None);

        assert_eq!(set.ordering(), SetOrdering::Unordered);
        assert_eq!(set.usernames(), vec!["adam", "zoe"]);
        assert_eq!(set.get("adam"), Some(None));
        assert_eq!(set.get("nobody"), None);
    }

    #[test]
    fn test_membership_is_case_sensitive() {
        let mut set = RelationshipSet::source_ordered();
        set.insert("Alice", None);
        assert!(set.contains("Alice"));
        assert!(!set.contains("alice"));
    }
}
