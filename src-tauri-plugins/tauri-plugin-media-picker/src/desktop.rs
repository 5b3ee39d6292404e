use media_picker_core::{
  host::RESULT_CANCELED, AssetHandle, Error as PickerError, MediaType, PickerConfig,
};
use std::sync::atomic::{AtomicBool, Ordering};
use tauri::{plugin::PluginApi, AppHandle, Runtime};
use tauri_plugin_dialog::{DialogExt, FilePath};
use tokio::sync::oneshot;

use crate::models::*;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp", "heic", "heif"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "m4v", "mkv", "webm", "avi", "3gp"];

pub fn init<R: Runtime>(
  app: &AppHandle<R>,
  api: PluginApi<R, Option<PluginConfig>>,
) -> crate::Result<MediaPicker<R>> {
  let defaults = api.config().clone().unwrap_or_default().default_options;
  Ok(MediaPicker {
    app: app.clone(),
    defaults,
    presenting: AtomicBool::new(false),
  })
}

/// 桌面端：用系统文件对话框代替相册，不需要运行时权限。
pub struct MediaPicker<R: Runtime> {
  app: AppHandle<R>,
  defaults: PickerConfig,
  presenting: AtomicBool,
}

struct Presenting<'a>(&'a AtomicBool);

impl<'a> Presenting<'a> {
  /// 同一时间只允许一个文件对话框
  fn acquire(flag: &'a AtomicBool) -> crate::Result<Self> {
    flag
      .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
      .map_err(|_| PickerError::PickerBusy)?;
    Ok(Presenting(flag))
  }
}

impl Drop for Presenting<'_> {
  fn drop(&mut self) {
    self.0.store(false, Ordering::Release);
  }
}

fn filters(media_type: MediaType) -> Vec<(&'static str, &'static [&'static str])> {
  match media_type {
    MediaType::Image => vec![("Images", IMAGE_EXTENSIONS)],
    MediaType::Video => vec![("Videos", VIDEO_EXTENSIONS)],
    MediaType::Any => vec![("Images", IMAGE_EXTENSIONS), ("Videos", VIDEO_EXTENSIONS)],
  }
}

/// 对话框结果转成 AssetHandle：取消为 PickerCancelled，超过上限按顺序截断。
fn collect_assets(
  files: Option<Vec<FilePath>>,
  limit: Option<usize>,
) -> crate::Result<Vec<AssetHandle>> {
  let files = files.ok_or(PickerError::PickerCancelled(RESULT_CANCELED))?;
  let mut assets: Vec<AssetHandle> = files.into_iter().map(to_asset).collect();
  if let Some(limit) = limit {
    if assets.len() > limit {
      log::warn!("文件对话框返回 {} 项，超过上限 {}，已截断", assets.len(), limit);
      assets.truncate(limit);
    }
  }
  Ok(assets)
}

fn to_asset(file: FilePath) -> AssetHandle {
  match file.as_path() {
    Some(path) => {
      let uri = url::Url::from_file_path(path)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| path.display().to_string());
      AssetHandle::new(uri, Some(path.to_string_lossy().into_owned()))
    }
    None => AssetHandle::from_uri(file.to_string()),
  }
}

impl<R: Runtime> MediaPicker<R> {
  pub async fn authorize(&self, _options: PickerOptions) -> crate::Result<()> {
    Ok(())
  }

  pub async fn present(&self, options: PickerOptions) -> crate::Result<Vec<AssetHandle>> {
    let _presenting = Presenting::acquire(&self.presenting)?;

    let config = options.apply(&self.defaults);
    let mut dialog = self.app.dialog().file();
    for (name, extensions) in filters(config.media_type) {
      dialog = dialog.add_filter(name, extensions);
    }

    let (tx, rx) = oneshot::channel::<Option<Vec<FilePath>>>();
    if config.allows_multiple() {
      dialog.pick_files(move |files| {
        let _ = tx.send(files);
      });
    } else {
      dialog.pick_file(move |file| {
        let _ = tx.send(file.map(|f| vec![f]));
      });
    }

    let files = rx.await.map_err(|_| PickerError::HostClosed)?;
    collect_assets(files, config.selection_limit())
  }
}
