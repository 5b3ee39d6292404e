//! 宿主运行时抽象：平台版本信息、启动 Activity、Activity 结果回传。
//! 由 tauri-plugin-media-picker 通过 PluginHandle 实现，测试中由假实现替代。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::Result;
use crate::subscription::ActivityResultBus;

/// android.app.Activity.RESULT_OK
pub const RESULT_OK: i32 = -1;
/// android.app.Activity.RESULT_CANCELED
pub const RESULT_CANCELED: i32 = 0;

/// 运行平台版本信息。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformInfo {
    /// Build.VERSION.SDK_INT
    pub sdk_int: u32,
    /// ApplicationInfo.targetSdkVersion
    pub target_sdk: u32,
}

impl PlatformInfo {
    pub fn new(sdk_int: u32, target_sdk: u32) -> Self {
        Self { sdk_int, target_sdk }
    }
}

/// Intent extra 的取值，按类型打标签交给 Kotlin 侧还原。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum ExtraValue {
    Bool(bool),
    Int(i64),
    String(String),
    StringArray(Vec<String>),
}

/// 要由宿主启动的 Intent 描述。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentRequest {
    pub action: String,
    pub mime_type: Option<String>,
    pub categories: Vec<String>,
    pub extras: BTreeMap<String, ExtraValue>,
    /// 非空时用 Intent.createChooser 包一层
    pub chooser_title: Option<String>,
}

impl IntentRequest {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.push(category.into());
        self
    }

    pub fn with_extra(mut self, name: impl Into<String>, value: ExtraValue) -> Self {
        self.extras.insert(name.into(), value);
        self
    }

    pub fn with_chooser(mut self, title: impl Into<String>) -> Self {
        self.chooser_title = Some(title.into());
        self
    }

    pub fn extra(&self, name: &str) -> Option<&ExtraValue> {
        self.extras.get(name)
    }
}

/// 结果 Intent 中携带的数据：ClipData 条目（可能缺 URI）或单个 data URI。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultData {
    pub data: Option<String>,
    pub clip: Option<Vec<Option<String>>>,
}

/// onActivityResult 回调参数。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityResult {
    pub request_code: i32,
    pub result_code: i32,
    pub intent: Option<ResultData>,
}

impl ActivityResult {
    pub fn is_ok(&self) -> bool {
        self.result_code == RESULT_OK
    }
}

#[async_trait]
pub trait PickerHost: Send + Sync {
    fn platform(&self) -> PlatformInfo;

    /// Activity 结果事件总线；present 期间在其上持有一个订阅。
    fn activity_results(&self) -> Arc<ActivityResultBus>;

    /// 以 request_code 启动 Intent。结果一律经 activity_results() 总线回传，
    /// 实现可以立即返回，也可以等结果发布到总线后再返回。
    async fn start_activity_for_result(
        &self,
        intent: IntentRequest,
        request_code: i32,
    ) -> Result<()>;
}
