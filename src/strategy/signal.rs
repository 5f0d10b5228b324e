//! 条件信号：策略在 analyze / plan 中“抛出”的预期异常情况（目标丢失、电量告急等）
//!
//! 信号只有类型标识（SignalKind）和可选消息；触发器按类型匹配，同一周期内“同一信号”也只比较类型。

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// 信号类型标识，通常声明为常量：`const FISH_LOST: SignalKind = SignalKind::from_static("fish_lost");`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignalKind(Cow<'static, str>);

impl SignalKind {
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 构造该类型的信号（无消息）
    pub fn raise(&self) -> ConditionSignal {
        ConditionSignal::new(self.clone())
    }

    /// 构造该类型的信号并附带消息
    pub fn raise_with(&self, message: impl Into<String>) -> ConditionSignal {
        ConditionSignal::new(self.clone()).with_message(message)
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for SignalKind {
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionSignal {
    kind: SignalKind,
    message: Option<String>,
}

impl ConditionSignal {
    pub fn new(kind: impl Into<SignalKind>) -> Self {
        Self {
            kind: kind.into(),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn kind(&self) -> &SignalKind {
        &self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// 同类型即视为同一信号（消息不参与比较）
    pub fn same_kind(&self, other: &ConditionSignal) -> bool {
        self.kind == other.kind
    }
}

impl fmt::Display for ConditionSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(msg) => write!(f, "{}: {}", self.kind, msg),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for ConditionSignal {}

#[cfg(test)]
mod tests {
    use super::*;

    const LOST: SignalKind = SignalKind::from_static("lost");

    #[test]
    fn test_same_kind_ignores_message() {
        let a = LOST.raise_with("target left sonar range");
        let b = LOST.raise();
        assert!(a.same_kind(&b));
        assert_ne!(a, b);
        assert!(!a.same_kind(&SignalKind::new("low_battery").raise()));
    }

    #[test]
    fn test_display() {
        assert_eq!(LOST.raise().to_string(), "lost");
        assert_eq!(LOST.raise_with("gone").to_string(), "lost: gone");
    }

    #[test]
    fn test_static_and_owned_kinds_compare_equal() {
        assert_eq!(LOST, SignalKind::new("lost"));
    }
}
