use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// 一次选择结果中的单个媒体。
///
/// `uri` 始终是系统返回的原始 URI；`path` 为解析得到的本地路径，无法解析时为 None
///（单项解析失败不会中断整批结果）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetHandle {
    uri: String,
    path: Option<String>,
}

impl AssetHandle {
    pub fn new(uri: impl Into<String>, path: Option<String>) -> Self {
        Self {
            uri: uri.into(),
            path,
        }
    }

    /// 照片选择器返回的 URI 不对应文件路径，直接按 URI 引用。
    pub fn from_uri(uri: impl Into<String>) -> Self {
        Self::new(uri, None)
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// 需要本地文件时使用：路径缺失则报 ResolutionFailure。
    pub fn require_path(&self) -> Result<&str> {
        self.path()
            .ok_or_else(|| Error::ResolutionFailure(self.uri.clone()))
    }
}
