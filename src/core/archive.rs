use crate::domain::model::{Keyword, SourceFormat};
use crate::utils::error::{AuditError, Result};
use std::io::{Cursor, Read};
use zip::ZipArchive;

/// 名稱含有這些字串的成員絕不是追蹤清單
pub const ENTRY_BLACKLIST: [&str; 4] = ["recent", "pending", "requests", "block"];

/// 依序嘗試的格式層級
const TIERS: [SourceFormat; 2] = [SourceFormat::Json, SourceFormat::Html];

/// 單次關鍵字解析的結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(String),
    NotFound,
}

/// 同一層級解析出的一對成員
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPair {
    pub tier: SourceFormat,
    pub following: String,
    pub followers: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionState {
    NoAttempt,
    TryingJson,
    ResolvedJson(ResolvedPair),
    TryingHtml,
    ResolvedHtml(ResolvedPair),
    Failed,
}

fn base_name(entry: &str) -> &str {
    entry.rsplit(['/', '\\']).next().unwrap_or(entry)
}

/// macOS 壓縮時附帶的資源分支 (`__MACOSX/`、`._` 開頭) 不是真正的匯出檔
fn is_resource_fork(entry: &str) -> bool {
    entry.split(['/', '\\']).any(|part| part == "__MACOSX") || base_name(entry).starts_with("._")
}

/// 在匯出壓縮檔中找出 followers / following 成員；同一層級必須同時找到兩者才算成功
pub struct ArchiveResolver;

impl ArchiveResolver {
    /// 在單一層級中為關鍵字挑選成員。
    ///
    /// 完全等於 `<keyword><ext>` 的檔名優先；否則取壓縮檔列出順序中的第一個符合者。
    pub fn resolve(entries: &[String], keyword: Keyword, tier: SourceFormat) -> Resolution {
        let exact = format!("{}{}", keyword.as_str(), tier.extension());
        let mut first_match: Option<&String> = None;

        for entry in entries.iter().filter(|entry| !is_resource_fork(entry)) {
            let base = base_name(entry).to_lowercase();
            if !base.ends_with(tier.extension())
                || !base.contains(keyword.as_str())
                || ENTRY_BLACKLIST.iter().any(|banned| base.contains(banned))
            {
                continue;
            }

            if base == exact {
                return Resolution::Resolved(entry.clone());
            }
            first_match.get_or_insert(entry);
        }

        match first_match {
            Some(entry) => Resolution::Resolved(entry.clone()),
            None => Resolution::NotFound,
        }
    }

    fn resolve_tier(entries: &[String], tier: SourceFormat) -> Option<ResolvedPair> {
        let following = Self::resolve(entries, Keyword::Following, tier);
        let followers = Self::resolve(entries, Keyword::Followers, tier);

        match (following, followers) {
            (Resolution::Resolved(following), Resolution::Resolved(followers)) => {
                Some(ResolvedPair {
                    tier,
                    following,
                    followers,
                })
            }
            (following, followers) => {
                tracing::debug!(
                    "{} tier incomplete (following: {:?}, followers: {:?})",
                    tier,
                    following,
                    followers
                );
                None
            }
        }
    }

    /// 推進解析狀態機一步；終止狀態維持不變
    pub fn step(state: ResolutionState, entries: &[String]) -> ResolutionState {
        match state {
            ResolutionState::NoAttempt => ResolutionState::TryingJson,
            ResolutionState::TryingJson => match Self::resolve_tier(entries, TIERS[0]) {
                Some(pair) => ResolutionState::ResolvedJson(pair),
                None => ResolutionState::TryingHtml,
            },
            ResolutionState::TryingHtml => match Self::resolve_tier(entries, TIERS[1]) {
                Some(pair) => ResolutionState::ResolvedHtml(pair),
                None => ResolutionState::Failed,
            },
            terminal => terminal,
        }
    }

    /// 兩個關鍵字必須落在同一層級，絕不混用 JSON 與 HTML
    pub fn resolve_pair(entries: &[String]) -> Result<ResolvedPair> {
        let mut state = ResolutionState::NoAttempt;
        loop {
            state = Self::step(state, entries);
            tracing::debug!("Archive resolution state: {:?}", state);
            match &state {
                ResolutionState::ResolvedJson(pair) | ResolutionState::ResolvedHtml(pair) => {
                    tracing::info!(
                        "📦 Resolved {} members: following={}, followers={}",
                        pair.tier,
                        pair.following,
                        pair.followers
                    );
                    return Ok(pair.clone());
                }
                ResolutionState::Failed => return Err(Self::failure(entries)),
                _ => {}
            }
        }
    }

    fn failure(entries: &[String]) -> AuditError {
        let found = |keyword: Keyword, tier: SourceFormat| {
            Self::resolve(entries, keyword, tier) != Resolution::NotFound
        };
        let keywords = [Keyword::Following, Keyword::Followers];

        // 某一邊在任何層級都不存在：直接指出缺少的是哪一邊，方便使用者重新匯出
        if let Some(missing) = keywords
            .into_iter()
            .find(|&keyword| TIERS.iter().all(|&tier| !found(keyword, tier)))
        {
            return AuditError::ResolutionError {
                keyword: missing.to_string(),
                message: format!(
                    "no JSON or HTML entry for {missing} among {} archive entries; \
                     the export likely lacks the Followers and following content type",
                    entries.len()
                ),
            };
        }

        // 兩邊都找得到但分屬不同格式：回報最優先層級中缺少的那一邊
        let (tier, missing, present) = TIERS
            .iter()
            .find_map(|&tier| match (found(Keyword::Following, tier), found(Keyword::Followers, tier)) {
                (true, false) => Some((tier, Keyword::Followers, Keyword::Following)),
                (false, true) => Some((tier, Keyword::Following, Keyword::Followers)),
                _ => None,
            })
            .unwrap_or((TIERS[0], Keyword::Followers, Keyword::Following));

        AuditError::ResolutionError {
            keyword: missing.to_string(),
            message: format!(
                "{present} was found as {tier} but {missing} was not; the two lists are in \
                 different formats and must come from the same export format"
            ),
        }
    }
}

/// 一次請求內的 ZIP 匯出；成員名稱保留壓縮檔原始順序
pub struct ArchiveBundle {
    archive: ZipArchive<Cursor<Vec<u8>>>,
    entry_names: Vec<String>,
}

impl ArchiveBundle {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        if bytes.is_empty() {
            return Err(AuditError::input("The uploaded archive is empty."));
        }

        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| AuditError::input(format!("The uploaded archive is unreadable: {e}")))?;

        let mut entry_names = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let entry = archive
                .by_index_raw(i)
                .map_err(|e| AuditError::input(format!("Corrupt archive entry #{i}: {e}")))?;
            if !entry.is_dir() {
                entry_names.push(entry.name().to_string());
            }
        }

        if entry_names.is_empty() {
            return Err(AuditError::input("The uploaded archive contains no files."));
        }

        tracing::debug!("Archive contains {} file entries", entry_names.len());
        Ok(Self {
            archive,
            entry_names,
        })
    }

    pub fn entry_names(&self) -> &[String] {
        &self.entry_names
    }

    pub fn read_entry(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut file = self
            .archive
            .by_name(name)
            .map_err(|e| AuditError::input(format!("Cannot open archive entry '{name}': {e}")))?;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|e| AuditError::input(format!("Cannot read archive entry '{name}': {e}")))?;
        Ok(bytes)
    }
}
