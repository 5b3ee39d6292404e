use tauri::{
  plugin::{Builder, TauriPlugin},
  Manager, Runtime,
};

pub use media_picker_core::{AssetHandle, MediaType, PickerConfig, SelectionMode};
pub use models::*;

#[cfg(target_os = "android")]
mod bridge;
#[cfg(not(target_os = "android"))]
mod desktop;
#[cfg(target_os = "android")]
mod mobile;

mod commands;
mod error;
mod models;

pub use error::{Error, Result};

#[cfg(not(target_os = "android"))]
use desktop::MediaPicker;
#[cfg(target_os = "android")]
use mobile::MediaPicker;

/// Extensions to [`tauri::App`], [`tauri::AppHandle`] and [`tauri::Window`] to access the media picker APIs.
pub trait MediaPickerExt<R: Runtime> {
  fn media_picker(&self) -> &MediaPicker<R>;
}

impl<R: Runtime, T: Manager<R>> crate::MediaPickerExt<R> for T {
  fn media_picker(&self) -> &MediaPicker<R> {
    self.state::<MediaPicker<R>>().inner()
  }
}

/// Initializes the plugin.
pub fn init<R: Runtime>() -> TauriPlugin<R, Option<PluginConfig>> {
  Builder::<R, Option<PluginConfig>>::new("media-picker")
    .invoke_handler(tauri::generate_handler![commands::authorize, commands::present])
    .setup(|app, api| {
      #[cfg(target_os = "android")]
      let media_picker = mobile::init(app, api)?;
      #[cfg(not(target_os = "android"))]
      let media_picker = desktop::init(app, api)?;
      app.manage(media_picker);
      Ok(())
    })
    .build()
}
