//! 原生媒体选择器的平台无关核心：
//! 按系统版本选择照片选择器 / 文档选择器 / 图库 Intent，申请运行时权限，
//! 等待 Activity 结果并把 content URI 解析为本地路径。
//! 宿主能力（启动 Activity、权限申请、ContentResolver）以 trait 注入。

pub mod adapter;
pub mod asset;
pub mod config;
pub mod content;
pub mod error;
pub mod host;
pub mod permission;
pub mod strategy;
pub mod subscription;
pub mod uri;

#[cfg(test)]
mod testing;

pub use adapter::{create, MediaPickerAdapter, PickerServices};
pub use asset::AssetHandle;
pub use config::{AndroidOptions, MediaType, PickerConfig, SelectionMode};
pub use content::{ContentResolver, Cursor, StorageEnvironment};
pub use error::{Error, Result};
pub use host::{ActivityResult, ExtraValue, IntentRequest, PickerHost, PlatformInfo, ResultData};
pub use permission::{PermissionBroker, PermissionOutcome, PermissionRequest};
pub use strategy::PickerStrategy;
pub use subscription::{ActivityResultBus, ActivityResultSubscription};
pub use uri::{classify, UriCategory, UriResolver};
