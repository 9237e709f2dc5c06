//! 에러 타입 — 도메인별 에러 정의

/// ovaldict 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum OvalDictError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 정의 저장소 조회 에러
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// 정의 DB 로딩 에러
    #[error("definition db error: {0}")]
    Database(String),

    /// 서버 시작 에러
    #[error("startup error: {0}")]
    Startup(#[from] StartupError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 정의 저장소 조회 에러
///
/// 조회 결과가 없는 경우는 에러가 아닙니다 (빈 `Vec` 반환).
/// 이 에러는 저장소 자체가 신뢰할 수 있는 결과를 내지 못한 경우만 나타냅니다.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// 저장소가 알지 못하는 OS 패밀리
    #[error("unsupported family: {family}")]
    UnsupportedFamily { family: String },

    /// 저장소에 접근할 수 없음
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// 쿼리 실패
    #[error("query failed: {0}")]
    Query(String),
}

/// 서버 시작 에러
///
/// 모두 치명적이며 시작 루틴 호출자에게 전파됩니다.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// 액세스 로그 파일 생성/열기 실패
    #[error("failed to open access log {path}: {source}")]
    AccessLog {
        path: String,
        source: std::io::Error,
    },

    /// 리스너 바인딩 실패
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },
}
