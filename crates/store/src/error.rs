//! 정의 DB 에러 타입
//!
//! [`DefinitionDbError`]는 정의 DB 로딩 중 발생할 수 있는 에러를 나타냅니다.
//! `From<DefinitionDbError> for OvalDictError` 구현을 통해 `?` 연산자로
//! 상위 에러 타입으로 전파됩니다.
//!
//! 조회 시점의 에러는 [`ovaldict_core::StoreError`]를 사용합니다.

use ovaldict_core::error::OvalDictError;

/// 정의 DB 로딩 에러
#[derive(Debug, thiserror::Error)]
pub enum DefinitionDbError {
    /// 디렉토리 또는 파일을 읽을 수 없음
    #[error("definition db load error: {path}: {reason}")]
    Load {
        /// 대상 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// JSON 파싱 실패
    #[error("definition db parse error: {path}: {reason}")]
    Parse {
        /// 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 파일 크기 초과
    #[error("file too large: {path}: {size} bytes (max: {max})")]
    FileTooBig {
        /// 파일 경로
        path: String,
        /// 실제 파일 크기 (바이트)
        size: u64,
        /// 최대 허용 크기 (바이트)
        max: u64,
    },
}

impl From<DefinitionDbError> for OvalDictError {
    fn from(err: DefinitionDbError) -> Self {
        OvalDictError::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_error_display() {
        let err = DefinitionDbError::Load {
            path: "/var/lib/ovaldict/oval-db".to_owned(),
            reason: "permission denied".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("oval-db"));
        assert!(msg.contains("permission denied"));
    }

    #[test]
    fn file_too_big_display() {
        let err = DefinitionDbError::FileTooBig {
            path: "ubuntu/16.json".to_owned(),
            size: 200,
            max: 100,
        };
        let msg = err.to_string();
        assert!(msg.contains("200"));
        assert!(msg.contains("100"));
    }

    #[test]
    fn converts_to_top_level_database_error() {
        let err = DefinitionDbError::Parse {
            path: "centos/7.json".to_owned(),
            reason: "expected value".to_owned(),
        };
        let top: OvalDictError = err.into();
        match top {
            OvalDictError::Database(msg) => assert!(msg.contains("centos/7.json")),
            other => panic!("expected Database error, got: {other:?}"),
        }
    }
}
