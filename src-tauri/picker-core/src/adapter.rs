//! MediaPickerAdapter：权限协商、按平台选择选择器、等待结果并解析为 AssetHandle。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::asset::AssetHandle;
use crate::config::PickerConfig;
use crate::content::{ContentResolver, StorageEnvironment};
use crate::error::{Error, Result};
use crate::host::{PickerHost, PlatformInfo, ResultData};
use crate::permission::{PermissionBroker, PermissionRequest};
use crate::strategy::PickerStrategy;
use crate::uri::UriResolver;

/// 适配器依赖的宿主能力
#[derive(Clone)]
pub struct PickerServices {
    pub host: Arc<dyn PickerHost>,
    pub permissions: Arc<dyn PermissionBroker>,
    pub content: Arc<dyn ContentResolver>,
    pub environment: Arc<dyn StorageEnvironment>,
}

pub struct MediaPickerAdapter {
    config: PickerConfig,
    services: PickerServices,
    presenting: AtomicBool,
}

/// 创建适配器
pub fn create(config: PickerConfig, services: PickerServices) -> MediaPickerAdapter {
    MediaPickerAdapter {
        config,
        services,
        presenting: AtomicBool::new(false),
    }
}

/// present 进行中的标记，离开作用域（包括 future 被丢弃）时清除
struct PresentingGuard<'a>(&'a AtomicBool);

impl<'a> PresentingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::PickerBusy)?;
        Ok(Self(flag))
    }
}

impl Drop for PresentingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// 从结果 Intent 中取出 URI：优先 ClipData（跳过没有 URI 的条目），否则取单个 data。
fn extract_uris(intent: Option<ResultData>) -> Result<Vec<String>> {
    let data = intent.ok_or(Error::MissingResultData)?;
    match data.clip {
        Some(items) => Ok(items.into_iter().flatten().collect()),
        None => data
            .data
            .map(|uri| vec![uri])
            .ok_or(Error::MissingResultData),
    }
}

impl MediaPickerAdapter {
    pub fn config(&self) -> &PickerConfig {
        &self.config
    }

    /// 是否有 present 正在等待系统结果
    pub fn is_presenting(&self) -> bool {
        self.presenting.load(Ordering::Acquire)
    }

    pub fn platform(&self) -> PlatformInfo {
        self.services.host.platform()
    }

    pub fn strategy(&self) -> PickerStrategy {
        PickerStrategy::select(&self.config, self.platform())
    }

    /// authorize 将要申请的权限；照片选择器不需要任何权限
    pub fn permission_request(&self) -> PermissionRequest {
        match self.strategy() {
            PickerStrategy::ModernPicker => PermissionRequest::default(),
            _ => PermissionRequest::for_platform(&self.config, self.platform()),
        }
    }

    pub async fn authorize(&self) -> Result<()> {
        let request = self.permission_request();
        if request.is_empty() {
            log::debug!("authorize: 无需申请权限 ({:?})", self.strategy());
            return Ok(());
        }

        log::debug!("authorize: 申请权限 {:?}", request.permissions());
        let outcome = self.services.permissions.request_permissions(&request).await?;
        outcome.ensure_granted(&request)
    }

    pub async fn present(&self) -> Result<Vec<AssetHandle>> {
        let _presenting = PresentingGuard::acquire(&self.presenting)?;

        let platform = self.platform();
        let strategy = PickerStrategy::select(&self.config, platform);
        let request_code = strategy.request_code();
        let intent = strategy.build_intent(&self.config);
        log::debug!(
            "present: strategy={:?}, sdk={}, request_code={}, action={}",
            strategy,
            platform.sdk_int,
            request_code,
            intent.action
        );

        // 先订阅再启动，保证结果不会在订阅前发布
        let mut subscription = self.services.host.activity_results().subscribe();
        self.services
            .host
            .start_activity_for_result(intent, request_code)
            .await?;
        let result = subscription.recv_for(request_code).await;
        subscription.release();

        let result = result.ok_or(Error::HostClosed)?;
        if !result.is_ok() {
            return Err(Error::PickerCancelled(result.result_code));
        }

        let uris = extract_uris(result.intent)?;
        let mut assets = if strategy.resolves_paths() {
            let resolver = UriResolver::new(
                Arc::clone(&self.services.content),
                Arc::clone(&self.services.environment),
                platform.sdk_int,
            );
            uris.into_iter()
                .map(|uri| -> Result<AssetHandle> {
                    let path = resolver.resolve(&uri)?;
                    if path.is_none() {
                        log::debug!("无法解析本地路径: {}", uri);
                    }
                    Ok(AssetHandle::new(uri, path))
                })
                .collect::<Result<Vec<_>>>()?
        } else {
            uris.into_iter().map(AssetHandle::from_uri).collect()
        };

        if let Some(limit) = self.config.selection_limit() {
            if assets.len() > limit {
                log::warn!(
                    "选择器返回 {} 项，超过上限 {}，已截断",
                    assets.len(),
                    limit
                );
                assets.truncate(limit);
            }
        }

        Ok(assets)
    }
}
