//! 运行时权限：按系统版本与媒体类型计算最小权限集合，交给宿主的权限代理申请。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::{MediaType, PickerConfig};
use crate::error::{Error, Result};
use crate::host::PlatformInfo;

pub const READ_MEDIA_IMAGES: &str = "android.permission.READ_MEDIA_IMAGES";
pub const READ_MEDIA_VIDEO: &str = "android.permission.READ_MEDIA_VIDEO";
pub const READ_EXTERNAL_STORAGE: &str = "android.permission.READ_EXTERNAL_STORAGE";

/// Android 13，细分媒体权限
const API_TIRAMISU: u32 = 33;
/// Android 6，运行时权限
const API_MARSHMALLOW: u32 = 23;

/// 单项权限及给用户看的说明
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionEntry {
    pub permission: String,
    pub rationale: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionRequest {
    pub entries: Vec<PermissionEntry>,
}

const IMAGES_RATIONALE: &str = "To pick images from your gallery";
const VIDEO_RATIONALE: &str = "To pick videos from your gallery";

impl PermissionRequest {
    /// 计算当前平台与过滤条件所需的权限；不需要申请时返回空集合。
    pub fn for_platform(config: &PickerConfig, platform: PlatformInfo) -> Self {
        let mut request = Self::default();
        if platform.sdk_int >= API_TIRAMISU && platform.target_sdk >= API_TIRAMISU {
            match config.media_type {
                MediaType::Image => request.push(READ_MEDIA_IMAGES, IMAGES_RATIONALE),
                MediaType::Video => request.push(READ_MEDIA_VIDEO, VIDEO_RATIONALE),
                MediaType::Any => {
                    request.push(READ_MEDIA_IMAGES, IMAGES_RATIONALE);
                    request.push(READ_MEDIA_VIDEO, VIDEO_RATIONALE);
                }
            }
        } else if platform.sdk_int >= API_MARSHMALLOW {
            // target < 33 的应用在 33+ 设备上也走这里，清单里的声明不能带 maxSdkVersion
            request.push(READ_EXTERNAL_STORAGE, "To pick media from your gallery");
        }
        request
    }

    fn push(&mut self, permission: &str, rationale: &str) {
        self.entries.push(PermissionEntry {
            permission: permission.to_string(),
            rationale: rationale.to_string(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn permissions(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.permission.as_str()).collect()
    }
}

/// 权限代理的申请结果：permission -> 是否授予
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionOutcome {
    pub grants: HashMap<String, bool>,
}

impl PermissionOutcome {
    /// 返回未授予的权限（代理没有回报的也算未授予）
    pub fn denied(&self, request: &PermissionRequest) -> Vec<String> {
        request
            .entries
            .iter()
            .filter(|e| !self.grants.get(&e.permission).copied().unwrap_or(false))
            .map(|e| e.permission.clone())
            .collect()
    }

    pub fn ensure_granted(&self, request: &PermissionRequest) -> Result<()> {
        let denied = self.denied(request);
        if denied.is_empty() {
            Ok(())
        } else {
            Err(Error::PermissionDenied { denied })
        }
    }
}

#[async_trait]
pub trait PermissionBroker: Send + Sync {
    async fn request_permissions(&self, request: &PermissionRequest) -> Result<PermissionOutcome>;
}
