use media_picker_core::{
  create, AssetHandle, MediaPickerAdapter, PickerConfig, PickerServices, PlatformInfo,
};
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};
use tauri::{plugin::PluginApi, AppHandle, Runtime};

use crate::bridge::{
  AndroidContentResolver, AndroidHost, AndroidPermissionBroker, AndroidStorage, StorageDirectories,
};
use crate::models::*;

const PLUGIN_IDENTIFIER: &str = "app.mediapicker.plugin";

// initializes the Kotlin plugin class
pub fn init<R: Runtime>(
  _app: &AppHandle<R>,
  api: PluginApi<R, Option<PluginConfig>>,
) -> crate::Result<MediaPicker<R>> {
  let defaults = api.config().clone().unwrap_or_default().default_options;
  let handle = api.register_android_plugin(PLUGIN_IDENTIFIER, "MediaPickerPlugin")?;

  // 版本与存储目录在进程内不变，setup 时取一次
  let platform: PlatformInfo =
    tauri::async_runtime::block_on(handle.run_mobile_plugin_async("platformInfo", ()))?;
  let directories: StorageDirectories =
    tauri::async_runtime::block_on(handle.run_mobile_plugin_async("storageDirectories", ()))?;
  log::debug!(
    "media-picker: sdk={}, targetSdk={}",
    platform.sdk_int,
    platform.target_sdk
  );

  let services = PickerServices {
    host: Arc::new(AndroidHost::new(handle.clone(), platform)),
    permissions: Arc::new(AndroidPermissionBroker(handle.clone())),
    content: Arc::new(AndroidContentResolver(handle.clone())),
    environment: Arc::new(AndroidStorage(directories)),
  };

  Ok(MediaPicker {
    services,
    defaults,
    current: Mutex::new(None),
    _runtime: PhantomData,
  })
}

/// Access to the media picker APIs.
pub struct MediaPicker<R: Runtime> {
  services: PickerServices,
  defaults: PickerConfig,
  /// 最近一次创建的适配器；选择器打开期间所有调用都落到它上面
  current: Mutex<Option<Arc<MediaPickerAdapter>>>,
  _runtime: PhantomData<fn() -> R>,
}

impl<R: Runtime> MediaPicker<R> {
  /// 取得本次调用使用的适配器。旧适配器仍被其他 present 持有时（引用计数 > 1）
  /// 返回同一个，使重叠的 present 以 PickerBusy 失败而不是再启动一个选择器。
  fn presenting_adapter(&self, options: PickerOptions) -> Arc<MediaPickerAdapter> {
    let config = options.apply(&self.defaults);
    let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
    match current.as_ref() {
      Some(adapter) if Arc::strong_count(adapter) > 1 || adapter.config() == &config => {
        Arc::clone(adapter)
      }
      _ => {
        let adapter = Arc::new(create(config, self.services.clone()));
        *current = Some(Arc::clone(&adapter));
        adapter
      }
    }
  }

  pub async fn authorize(&self, options: PickerOptions) -> crate::Result<()> {
    let adapter = create(options.apply(&self.defaults), self.services.clone());
    adapter.authorize().await?;
    Ok(())
  }

  pub async fn present(&self, options: PickerOptions) -> crate::Result<Vec<AssetHandle>> {
    let adapter = self.presenting_adapter(options);
    Ok(adapter.present().await?)
  }
}
