use crate::core::archive::{ArchiveBundle, ArchiveResolver};
use crate::core::diff::diff;
use crate::core::normalize::FormatNormalizer;
use crate::domain::model::{DiffResult, ExportInput, SourceFormat, UploadedPart};
use crate::utils::error::Result;

/// 已決定格式、可以交給正規化或外部後端的一個成員
#[derive(Debug, Clone)]
pub struct Member {
    pub name: String,
    pub format: SourceFormat,
    pub bytes: Vec<u8>,
}

impl Member {
    fn from_part(part: &UploadedPart) -> Self {
        Self {
            name: part.file_name.clone(),
            format: FormatNormalizer::detect_format(part),
            bytes: part.bytes.clone(),
        }
    }
}

/// 一次請求所需的兩個成員
#[derive(Debug, Clone)]
pub struct MemberPair {
    pub following: Member,
    pub followers: Member,
}

/// 把輸入化為兩個成員；壓縮檔會先經過分層解析
pub fn materialize_members(input: &ExportInput) -> Result<MemberPair> {
    match input {
        ExportInput::Loose {
            following,
            followers,
        } => Ok(MemberPair {
            following: Member::from_part(following),
            followers: Member::from_part(followers),
        }),
        ExportInput::Archive(part) => {
            let mut bundle = ArchiveBundle::from_bytes(part.bytes.clone())?;
            let pair = ArchiveResolver::resolve_pair(bundle.entry_names())?;

            let following = bundle.read_entry(&pair.following)?;
            let followers = bundle.read_entry(&pair.followers)?;

            Ok(MemberPair {
                following: Member {
                    name: pair.following,
                    format: pair.tier,
                    bytes: following,
                },
                followers: Member {
                    name: pair.followers,
                    format: pair.tier,
                    bytes: followers,
                },
            })
        }
    }
}

/// 在行程內完成整個比對；任一階段失敗就整體失敗，不回傳部分結果
pub fn audit_export(input: &ExportInput) -> Result<DiffResult> {
    tracing::debug!("Auditing {}", input.describe());
    let members = materialize_members(input)?;

    let following = FormatNormalizer::normalize(
        &members.following.bytes,
        members.following.format,
        &members.following.name,
    )?;
    let followers = FormatNormalizer::normalize(
        &members.followers.bytes,
        members.followers.format,
        &members.followers.name,
    )?;

    Ok(diff(&following, &followers))
}
