//! 端口操作的统一返回值

use serde::{Deserialize, Serialize};

/// 端口操作结果
///
/// 底层协作方的失败不会以 `Err` 穿过端口边界，而是作为 `Error` 变体返回，
/// 调用方只需要根据 `status` 区分成功与失败。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PortResult<T> {
    Success { value: T },
    Error { message: String },
}

impl<T> PortResult<T> {
    pub fn success(value: T) -> Self {
        PortResult::Success { value }
    }

    pub fn error(message: impl Into<String>) -> Self {
        PortResult::Error {
            message: message.into(),
        }
    }

    /// 从协作方的 `anyhow::Result` 转换，错误链被压平成一条消息
    pub fn from_anyhow(result: anyhow::Result<T>) -> Self {
        match result {
            Ok(value) => PortResult::success(value),
            Err(err) => PortResult::error(format!("{err:#}")),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PortResult::Success { .. })
    }

    pub fn is_error(&self) -> bool {
        !self.is_success()
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            PortResult::Success { value } => Some(value),
            PortResult::Error { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            PortResult::Success { .. } => None,
            PortResult::Error { message } => Some(message),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> PortResult<U> {
        match self {
            PortResult::Success { value } => PortResult::Success { value: f(value) },
            PortResult::Error { message } => PortResult::Error { message },
        }
    }

    pub fn into_result(self) -> Result<T, String> {
        match self {
            PortResult::Success { value } => Ok(value),
            PortResult::Error { message } => Err(message),
        }
    }
}

impl<T> From<anyhow::Result<T>> for PortResult<T> {
    fn from(result: anyhow::Result<T>) -> Self {
        PortResult::from_anyhow(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let ok: PortResult<()> = PortResult::success(());
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            serde_json::json!({ "status": "success", "value": null })
        );

        let err: PortResult<bool> = PortResult::error("session expired");
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            serde_json::json!({ "status": "error", "message": "session expired" })
        );
    }

    #[test]
    fn test_from_anyhow_flattens_context() {
        let result: anyhow::Result<String> =
            Err(anyhow::anyhow!("timeout").context("calling auth provider"));
        let port: PortResult<String> = result.into();

        assert_eq!(
            port.error_message(),
            Some("calling auth provider: timeout")
        );
    }

    #[test]
    fn test_map_keeps_error() {
        let err: PortResult<u32> = PortResult::error("boom");
        assert_eq!(err.map(|v| v + 1), PortResult::error("boom"));
        assert_eq!(PortResult::success(1).map(|v| v + 1).into_result(), Ok(2));
    }
}
