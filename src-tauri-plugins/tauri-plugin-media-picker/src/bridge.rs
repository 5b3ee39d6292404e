//! 基于 PluginHandle 的宿主能力实现：把 core 的 trait 调用转成 Kotlin 插件命令。
//! 启动 Activity 与权限申请走异步调用；ContentResolver 查询在 UriResolver 中同步执行，走 run_mobile_plugin。

#![cfg(target_os = "android")]

use async_trait::async_trait;
use media_picker_core::{
  ActivityResult, ActivityResultBus, ContentResolver, Cursor, IntentRequest, PermissionBroker,
  PermissionOutcome, PermissionRequest, PickerHost, PlatformInfo, StorageEnvironment,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tauri::{plugin::PluginHandle, Runtime};

type CoreResult<T> = media_picker_core::Result<T>;

fn platform_error(e: impl std::fmt::Display) -> media_picker_core::Error {
  media_picker_core::Error::platform(e.to_string())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StartActivityArgs {
  intent: IntentRequest,
  request_code: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryArgs<'a> {
  uri: &'a str,
  projection: &'a [&'a str],
  selection: Option<&'a str>,
  selection_args: &'a [String],
}

/// Kotlin 侧读完并关闭原生 Cursor 后返回的快照
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CursorSnapshot {
  columns: Vec<String>,
  rows: Vec<Vec<Option<String>>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
  cursor: Option<CursorSnapshot>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TakePersistableUriPermissionArgs<'a> {
  uri: &'a str,
  mode_flags: i32,
}

/// storageDirectories 的返回
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageDirectories {
  pub external_storage: String,
  pub downloads: String,
  pub external_media_dirs: Vec<String>,
}

pub struct AndroidHost<R: Runtime> {
  handle: PluginHandle<R>,
  platform: PlatformInfo,
  bus: Arc<ActivityResultBus>,
}

impl<R: Runtime> AndroidHost<R> {
  pub fn new(handle: PluginHandle<R>, platform: PlatformInfo) -> Self {
    Self {
      handle,
      platform,
      bus: ActivityResultBus::new(),
    }
  }
}

#[async_trait]
impl<R: Runtime> PickerHost for AndroidHost<R> {
  fn platform(&self) -> PlatformInfo {
    self.platform
  }

  fn activity_results(&self) -> Arc<ActivityResultBus> {
    Arc::clone(&self.bus)
  }

  /// Kotlin 侧在 onActivityResult 后才 resolve，这里把结果转发到总线
  async fn start_activity_for_result(
    &self,
    intent: IntentRequest,
    request_code: i32,
  ) -> CoreResult<()> {
    let result: ActivityResult = self
      .handle
      .run_mobile_plugin_async(
        "startActivityForResult",
        StartActivityArgs {
          intent,
          request_code,
        },
      )
      .await
      .map_err(platform_error)?;
    let delivered = self.bus.publish(result);
    log::debug!("startActivityForResult request_code={} 送达 {} 个监听器", request_code, delivered);
    Ok(())
  }
}

pub struct AndroidPermissionBroker<R: Runtime>(pub PluginHandle<R>);

#[async_trait]
impl<R: Runtime> PermissionBroker for AndroidPermissionBroker<R> {
  async fn request_permissions(
    &self,
    request: &PermissionRequest,
  ) -> CoreResult<PermissionOutcome> {
    self
      .0
      .run_mobile_plugin_async("requestPermissions", request)
      .await
      .map_err(platform_error)
  }
}

/// 内存快照游标
struct SnapshotCursor {
  snapshot: CursorSnapshot,
  position: Option<usize>,
}

impl Cursor for SnapshotCursor {
  fn move_to_first(&mut self) -> bool {
    self.position = (!self.snapshot.rows.is_empty()).then_some(0);
    self.position.is_some()
  }

  fn column_index_or_throw(&self, column: &str) -> CoreResult<usize> {
    self
      .snapshot
      .columns
      .iter()
      .position(|c| c == column)
      .ok_or_else(|| platform_error(format!("column '{}' does not exist", column)))
  }

  fn get_string(&self, column_index: usize) -> Option<String> {
    let row = self.snapshot.rows.get(self.position?)?;
    row.get(column_index).cloned().flatten()
  }

  fn close(&mut self) {
    self.position = None;
    self.snapshot.rows.clear();
  }
}

pub struct AndroidContentResolver<R: Runtime>(pub PluginHandle<R>);

impl<R: Runtime> ContentResolver for AndroidContentResolver<R> {
  fn query(
    &self,
    uri: &str,
    projection: &[&str],
    selection: Option<&str>,
    selection_args: &[String],
  ) -> CoreResult<Option<Box<dyn Cursor>>> {
    let response: QueryResponse = self
      .0
      .run_mobile_plugin(
        "queryContentResolver",
        QueryArgs {
          uri,
          projection,
          selection,
          selection_args,
        },
      )
      .map_err(platform_error)?;
    Ok(response.cursor.map(|snapshot| {
      Box::new(SnapshotCursor {
        snapshot,
        position: None,
      }) as Box<dyn Cursor>
    }))
  }

  fn take_persistable_uri_permission(&self, uri: &str, mode_flags: i32) -> CoreResult<()> {
    self
      .0
      .run_mobile_plugin::<()>(
        "takePersistableUriPermission",
        TakePersistableUriPermissionArgs { uri, mode_flags },
      )
      .map_err(platform_error)
  }
}

pub struct AndroidStorage(pub StorageDirectories);

impl StorageEnvironment for AndroidStorage {
  fn external_storage_directory(&self) -> String {
    self.0.external_storage.clone()
  }

  fn downloads_directory(&self) -> String {
    self.0.downloads.clone()
  }

  fn external_media_dirs(&self) -> Vec<String> {
    self.0.external_media_dirs.clone()
  }
}
