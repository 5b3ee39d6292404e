use tauri::{command, AppHandle, Runtime};

use crate::models::*;
use crate::MediaPickerExt;

#[command]
pub(crate) async fn authorize<R: Runtime>(
  app: AppHandle<R>,
  options: Option<PickerOptions>,
) -> Result<(), String> {
  app
    .media_picker()
    .authorize(options.unwrap_or_default())
    .await
    .map_err(|e| e.to_string())
}

#[command]
pub(crate) async fn present<R: Runtime>(
  app: AppHandle<R>,
  options: Option<PickerOptions>,
) -> Result<PresentResponse, String> {
  let assets = app
    .media_picker()
    .present(options.unwrap_or_default())
    .await
    .map_err(|e| e.to_string())?;
  Ok(PresentResponse { assets })
}
