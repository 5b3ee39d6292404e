use serde::{Deserialize, Serialize};

/// 单选 / 多选。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionMode {
    Single,
    #[default]
    Multiple,
}

/// 媒体类型过滤。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MediaType {
    Image,
    Video,
    #[default]
    Any,
}

impl MediaType {
    pub const IMAGE_MIME: &'static str = "image/*";
    pub const VIDEO_MIME: &'static str = "video/*";
    pub const ANY_MIME: &'static str = "*/*";

    pub fn mime_type(self) -> &'static str {
        match self {
            MediaType::Image => Self::IMAGE_MIME,
            MediaType::Video => Self::VIDEO_MIME,
            MediaType::Any => Self::ANY_MIME,
        }
    }

    /// EXTRA_MIME_TYPES 使用的列表：Any 展开为 image + video。
    pub fn mime_types(self) -> Vec<String> {
        match self {
            MediaType::Any => vec![Self::IMAGE_MIME.to_string(), Self::VIDEO_MIME.to_string()],
            other => vec![other.mime_type().to_string()],
        }
    }
}

/// Android 专属选项。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AndroidOptions {
    /// 优先使用系统照片选择器（仅 API 33+ 生效）
    pub use_photo_picker: bool,
}

/// 选择器配置，构造适配器时一次性给定，之后不可变。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PickerConfig {
    pub mode: SelectionMode,
    pub media_type: MediaType,
    /// 0 或负数表示不限制
    pub maximum_number_of_selection: i64,
    /// 文档选择器中显示高级选项（内部存储等）
    pub show_advanced: bool,
    pub android: AndroidOptions,
}

impl PickerConfig {
    pub fn mime_type(&self) -> &'static str {
        self.media_type.mime_type()
    }

    pub fn mime_types(&self) -> Vec<String> {
        self.media_type.mime_types()
    }

    /// 归一化后的最大选择数量，0 = 不限制。
    pub fn maximum_number_of_selection(&self) -> usize {
        if self.maximum_number_of_selection > 0 {
            // 32 位目标上超出 usize 的值截到 usize::MAX
            usize::try_from(self.maximum_number_of_selection).unwrap_or(usize::MAX)
        } else {
            0
        }
    }

    /// 结果数量上限：单选为 1，多选为最大选择数量（不限制时为 None）。
    pub fn selection_limit(&self) -> Option<usize> {
        match self.mode {
            SelectionMode::Single => Some(1),
            SelectionMode::Multiple => match self.maximum_number_of_selection() {
                0 => None,
                n => Some(n),
            },
        }
    }

    pub fn allows_multiple(&self) -> bool {
        self.selection_limit() != Some(1)
    }
}
