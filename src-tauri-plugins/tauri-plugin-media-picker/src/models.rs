use media_picker_core::{AndroidOptions, AssetHandle, MediaType, PickerConfig, SelectionMode};
use serde::{Deserialize, Serialize};

/// tauri.conf.json 中 `plugins.media-picker` 的配置。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginConfig {
  /// 命令未传的字段从这里取默认值
  #[serde(default)]
  pub default_options: PickerConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AndroidOptionsPatch {
  pub use_photo_picker: Option<bool>,
}

/// 前端传入的选项，只覆盖给出的字段。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickerOptions {
  pub mode: Option<SelectionMode>,
  pub media_type: Option<MediaType>,
  pub maximum_number_of_selection: Option<i64>,
  pub show_advanced: Option<bool>,
  pub android: Option<AndroidOptionsPatch>,
}

impl PickerOptions {
  pub fn apply(self, base: &PickerConfig) -> PickerConfig {
    let android = self.android.unwrap_or_default();
    PickerConfig {
      mode: self.mode.unwrap_or(base.mode),
      media_type: self.media_type.unwrap_or(base.media_type),
      maximum_number_of_selection: self
        .maximum_number_of_selection
        .unwrap_or(base.maximum_number_of_selection),
      show_advanced: self.show_advanced.unwrap_or(base.show_advanced),
      android: AndroidOptions {
        use_photo_picker: android
          .use_photo_picker
          .unwrap_or(base.android.use_photo_picker),
      },
    }
  }
}

/// present 结果。需 Serialize 供 command 返回前端。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentResponse {
  pub assets: Vec<AssetHandle>,
}
