use serde::{Deserialize, Serialize};

use crate::config::{MediaType, PickerConfig};
use crate::host::{ExtraValue, IntentRequest, PlatformInfo};

pub const ACTION_OPEN_DOCUMENT: &str = "android.intent.action.OPEN_DOCUMENT";
pub const ACTION_GET_CONTENT: &str = "android.intent.action.GET_CONTENT";
pub const CATEGORY_OPENABLE: &str = "android.intent.category.OPENABLE";
pub const EXTRA_MIME_TYPES: &str = "android.intent.extra.MIME_TYPES";
pub const EXTRA_ALLOW_MULTIPLE: &str = "android.intent.extra.ALLOW_MULTIPLE";
pub const EXTRA_SHOW_ADVANCED: &str = "android.content.extra.SHOW_ADVANCED";
pub const EXTRA_LOCAL_ONLY: &str = "android.intent.extra.LOCAL_ONLY";

pub const CHOOSER_TITLE: &str = "Select Media";

pub const REQUEST_LAUNCH_LIBRARY: i32 = 13003;
/// 多个选择器并存时需要改成按实例分配的请求码
pub const RESULT_CODE_PICKER_IMAGES: i32 = 9192;

const API_TIRAMISU: u32 = 33;
/// Android 4.4，ACTION_OPEN_DOCUMENT 与 DocumentsContract
pub(crate) const API_KITKAT: u32 = 19;

/// 选择器调用方式，每次 present 时选定一次。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PickerStrategy {
    /// 系统媒体选择器（API 33+，需配置 usePhotoPicker）。
    /// 经 chooser 打开 GET_CONTENT，返回的 URI 不做路径解析。
    ModernPicker,
    /// ACTION_OPEN_DOCUMENT 文档选择器（API 19+）
    LegacyDocumentPicker,
    /// KitKat 之前没有 OPEN_DOCUMENT，退回 GET_CONTENT 图库 Intent
    LegacyGalleryIntent,
}

impl PickerStrategy {
    pub fn select(config: &PickerConfig, platform: PlatformInfo) -> Self {
        if config.android.use_photo_picker && platform.sdk_int >= API_TIRAMISU {
            PickerStrategy::ModernPicker
        } else if platform.sdk_int >= API_KITKAT {
            PickerStrategy::LegacyDocumentPicker
        } else {
            PickerStrategy::LegacyGalleryIntent
        }
    }

    pub fn request_code(self) -> i32 {
        match self {
            PickerStrategy::ModernPicker => REQUEST_LAUNCH_LIBRARY,
            PickerStrategy::LegacyDocumentPicker | PickerStrategy::LegacyGalleryIntent => {
                RESULT_CODE_PICKER_IMAGES
            }
        }
    }

    /// 照片选择器的 URI 不映射到文件路径，其余方式需要逐个解析。
    pub fn resolves_paths(self) -> bool {
        !matches!(self, PickerStrategy::ModernPicker)
    }

    pub fn build_intent(self, config: &PickerConfig) -> IntentRequest {
        match self {
            PickerStrategy::ModernPicker => {
                let mut intent = IntentRequest::new(ACTION_GET_CONTENT)
                    .with_type(config.mime_type())
                    .with_category(CATEGORY_OPENABLE);
                if config.allows_multiple() {
                    intent = intent.with_extra(EXTRA_ALLOW_MULTIPLE, ExtraValue::Bool(true));
                }
                intent.with_chooser(CHOOSER_TITLE)
            }
            PickerStrategy::LegacyDocumentPicker => {
                let mut intent = IntentRequest::new(ACTION_OPEN_DOCUMENT)
                    .with_type(config.mime_type())
                    .with_extra(EXTRA_MIME_TYPES, ExtraValue::StringArray(config.mime_types()));
                if config.allows_multiple() {
                    intent = intent.with_extra(EXTRA_ALLOW_MULTIPLE, ExtraValue::Bool(true));
                }
                if config.show_advanced {
                    intent = intent.with_extra(EXTRA_SHOW_ADVANCED, ExtraValue::Bool(true));
                }
                intent.with_extra(EXTRA_LOCAL_ONLY, ExtraValue::Bool(true))
            }
            PickerStrategy::LegacyGalleryIntent => {
                let mut intent = IntentRequest::new(ACTION_GET_CONTENT)
                    .with_type(config.mime_type())
                    .with_category(CATEGORY_OPENABLE);
                if config.allows_multiple() {
                    intent = intent.with_extra(EXTRA_ALLOW_MULTIPLE, ExtraValue::Bool(true));
                }
                intent.with_extra(EXTRA_LOCAL_ONLY, ExtraValue::Bool(true))
            }
        }
    }
}
