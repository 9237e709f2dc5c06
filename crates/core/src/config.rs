//! 설정 관리 — ovaldict.toml 파싱 및 런타임 설정
//!
//! [`OvalDictConfig`]는 서버의 모든 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선, 서버 바이너리에서 적용)
//! 2. 환경변수 (`OVALDICT_SERVER_PORT=1325` 형식)
//! 3. 설정 파일 (`ovaldict.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), ovaldict_core::error::OvalDictError> {
//! use ovaldict_core::config::OvalDictConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = OvalDictConfig::load("ovaldict.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = OvalDictConfig::parse("[server]\nport = 1325")?;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, OvalDictError};

/// ovaldict 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OvalDictConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// HTTP 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 정의 저장소 설정
    #[serde(default)]
    pub store: StoreConfig,
    /// Prometheus 메트릭 설정
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl OvalDictConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, OvalDictError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, OvalDictError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                OvalDictError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                OvalDictError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, OvalDictError> {
        toml::from_str(toml_str).map_err(|e| {
            OvalDictError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `OVALDICT_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "OVALDICT_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "OVALDICT_GENERAL_LOG_FORMAT");
        override_string(&mut self.general.log_dir, "OVALDICT_GENERAL_LOG_DIR");

        // Server
        override_string(&mut self.server.bind, "OVALDICT_SERVER_BIND");
        override_parsed(&mut self.server.port, "OVALDICT_SERVER_PORT");

        // Store
        override_string(&mut self.store.db_path, "OVALDICT_STORE_DB_PATH");
        override_parsed(&mut self.store.error_policy, "OVALDICT_STORE_ERROR_POLICY");

        // Metrics
        override_parsed(&mut self.metrics.enabled, "OVALDICT_METRICS_ENABLED");
        override_string(&mut self.metrics.listen_addr, "OVALDICT_METRICS_LISTEN_ADDR");
        override_parsed(&mut self.metrics.port, "OVALDICT_METRICS_PORT");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), OvalDictError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        if self.general.log_dir.is_empty() {
            return Err(invalid("general.log_dir", "must not be empty".to_owned()));
        }

        if self.server.bind.is_empty() {
            return Err(invalid("server.bind", "must not be empty".to_owned()));
        }

        if self.server.port == 0 {
            return Err(invalid("server.port", "must be greater than 0".to_owned()));
        }

        if self.store.db_path.is_empty() {
            return Err(invalid("store.db_path", "must not be empty".to_owned()));
        }

        if self.metrics.enabled {
            if self.metrics.endpoint != "/metrics" {
                return Err(invalid(
                    "metrics.endpoint",
                    "only '/metrics' is supported".to_owned(),
                ));
            }
            if self.metrics.port == 0 {
                return Err(invalid("metrics.port", "must be greater than 0".to_owned()));
            }
            if self.metrics.port == self.server.port {
                return Err(invalid(
                    "metrics.port",
                    "must differ from server.port".to_owned(),
                ));
            }
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: String) -> OvalDictError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason,
    }
    .into()
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
    /// 액세스 로그 디렉토리 (`access.log`가 생성됨)
    pub log_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
            log_dir: "/var/log/ovaldict".to_owned(),
        }
    }
}

/// HTTP 서버 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인드 주소
    pub bind: String,
    /// 포트
    pub port: u16,
}

impl ServerConfig {
    /// `bind:port` 형식의 리스너 주소
    pub fn bind_url(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_owned(),
            port: 1324,
        }
    }
}

/// 정의 저장소 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// 정의 DB 디렉토리 (`{family}/{release}.json`)
    pub db_path: String,
    /// 저장소 에러 응답 정책
    pub error_policy: StoreErrorPolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: "/var/lib/ovaldict/oval-db".to_owned(),
            error_policy: StoreErrorPolicy::default(),
        }
    }
}

/// 저장소 에러를 HTTP 응답으로 옮기는 정책
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreErrorPolicy {
    /// 로그만 남기고 200 + 빈 배열로 응답
    #[default]
    Swallow,
    /// 502 + 에러 메시지로 응답
    BadGateway,
}

impl FromStr for StoreErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "swallow" => Ok(Self::Swallow),
            "bad_gateway" => Ok(Self::BadGateway),
            other => Err(format!(
                "unknown store error policy '{other}', expected 'swallow' or 'bad_gateway'"
            )),
        }
    }
}

impl fmt::Display for StoreErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Swallow => f.write_str("swallow"),
            Self::BadGateway => f.write_str("bad_gateway"),
        }
    }
}

/// Prometheus 메트릭 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// 리스너 주소
    pub listen_addr: String,
    /// 리스너 포트
    pub port: u16,
    /// 스크레이프 경로 (현재 `/metrics`만 지원)
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: "127.0.0.1".to_owned(),
            port: 9100,
            endpoint: "/metrics".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_parsed<T: FromStr>(target: &mut T, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<T>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse env var, ignoring"
            ),
        }
    }
}
