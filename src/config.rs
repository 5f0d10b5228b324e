//! 引擎配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `ARBITER__*` 覆盖（双下划线表示嵌套，如 `ARBITER__ARBITRATION__POLICY=last_writer`）。

use std::path::PathBuf;

use serde::Deserialize;

use crate::arbitration::PolicyKind;

/// 配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub cycle: CycleSection,
    pub arbitration: ArbitrationSection,
    pub collaborators: CollaboratorsSection,
    pub logging: LoggingSection,
}

/// [cycle] 段：重评估上限、空计划是否下发
#[derive(Debug, Clone, Deserialize)]
pub struct CycleSection {
    /// 单个周期内允许的重评估次数（同一信号连续出现两次仍立即失败）
    #[serde(default = "default_max_reassessments")]
    pub max_reassessments: usize,
    /// 策略声称需要执行但仲裁后计划为空时，是否仍调用 execute
    #[serde(default)]
    pub execute_on_empty_plan: bool,
}

fn default_max_reassessments() -> usize {
    8
}

impl Default for CycleSection {
    fn default() -> Self {
        Self {
            max_reassessments: default_max_reassessments(),
            execute_on_empty_plan: false,
        }
    }
}

/// [arbitration] 段：内置冲突解决策略
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArbitrationSection {
    #[serde(default)]
    pub policy: PolicyKind,
}

/// [collaborators] 段：monitor / execute 调用超时（秒）
#[derive(Debug, Clone, Deserialize)]
pub struct CollaboratorsSection {
    #[serde(default = "default_call_timeout_secs")]
    pub monitor_timeout_secs: u64,
    #[serde(default = "default_call_timeout_secs")]
    pub execute_timeout_secs: u64,
}

fn default_call_timeout_secs() -> u64 {
    30
}

impl Default for CollaboratorsSection {
    fn default() -> Self {
        Self {
            monitor_timeout_secs: default_call_timeout_secs(),
            execute_timeout_secs: default_call_timeout_secs(),
        }
    }
}

/// [logging] 段：默认日志过滤指令（RUST_LOG 优先）
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_directive")]
    pub default_directive: String,
}

fn default_directive() -> String {
    "info".to_string()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            default_directive: default_directive(),
        }
    }
}

/// 从 config 目录加载配置，环境变量 ARBITER__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 ARBITER__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    for name in ["config/default", "../config/default"] {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("ARBITER")
            .separator("__")
            .try_parsing(true),
    );

    builder.build()?.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.cycle.max_reassessments, 8);
        assert!(!cfg.cycle.execute_on_empty_plan);
        assert_eq!(cfg.arbitration.policy, PolicyKind::HighestPriority);
        assert_eq!(cfg.collaborators.execute_timeout_secs, 30);
        assert_eq!(cfg.logging.default_directive, "info");
    }

    #[test]
    fn test_load_from_explicit_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[cycle]\nmax_reassessments = 3\n\n[arbitration]\npolicy = \"last_writer\"\n\n[collaborators]\nmonitor_timeout_secs = 5"
        )
        .unwrap();

        let cfg = load_config(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(cfg.cycle.max_reassessments, 3);
        assert_eq!(cfg.arbitration.policy, PolicyKind::LastWriter);
        assert_eq!(cfg.collaborators.monitor_timeout_secs, 5);
        assert_eq!(cfg.collaborators.execute_timeout_secs, 30);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let cfg = load_config(Some(PathBuf::from("/nonexistent/arbiter.toml"))).unwrap();
        assert_eq!(cfg.cycle.max_reassessments, 8);
    }
}
