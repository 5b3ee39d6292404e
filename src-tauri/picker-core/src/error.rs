use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// 权限代理拒绝了至少一项权限
    #[error("Permission denied: {}", .denied.join(", "))]
    PermissionDenied { denied: Vec<String> },
    /// 系统返回了非 RESULT_OK 的结果码（通常是用户取消）
    #[error("Image picker activity result code {0}")]
    PickerCancelled(i32),
    #[error("Unable to resolve a file path for {0}")]
    ResolutionFailure(String),
    #[error("A picker is already being presented by this adapter")]
    PickerBusy,
    #[error("Picker result carried neither clip data nor a data uri")]
    MissingResultData,
    #[error("Activity result channel closed before the picker returned")]
    HostClosed,
    /// 平台侧异常，原样透传
    #[error("{0}")]
    Platform(String),
}

impl Error {
    pub fn platform(message: impl Into<String>) -> Self {
        Error::Platform(message.into())
    }
}
