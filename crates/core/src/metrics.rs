//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 서버와 저장소는 이 상수를 사용하여 `metrics::counter!()`,
//! `metrics::gauge!()`, `metrics::histogram!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `ovaldict_`
//! - 접미어: `_total` (counter), `_seconds` (histogram/latency), 없음 (gauge)

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 라우트 레이블 키 (매칭된 경로 템플릿, 예: `/cves/{family}/{release}/{id}`; 미매칭은 `not_found`)
pub const LABEL_ROUTE: &str = "route";

/// HTTP 상태 코드 레이블 키
pub const LABEL_STATUS: &str = "status";

/// 선택자 레이블 키 (cve, pack)
pub const LABEL_SELECTOR: &str = "selector";

/// 결과 레이블 키 (hit, miss, error)
pub const LABEL_RESULT: &str = "result";

// ─── HTTP 메트릭 ────────────────────────────────────────────────────

/// HTTP: 처리된 전체 요청 수 (counter, label: route, status)
pub const HTTP_REQUESTS_TOTAL: &str = "ovaldict_http_requests_total";

/// HTTP: 요청 처리 지연 시간 (histogram, 초)
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "ovaldict_http_request_duration_seconds";

// ─── 조회 메트릭 ────────────────────────────────────────────────────

/// 조회: 저장소 조회 수 (counter, label: selector, result)
pub const LOOKUPS_TOTAL: &str = "ovaldict_lookups_total";

/// 저장소: 로드된 정의 수 (gauge)
pub const STORE_DEFINITIONS: &str = "ovaldict_store_definitions";

/// 모든 메트릭의 설명을 등록합니다.
///
/// 레코더 설치 직후 한 번 호출합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge, describe_histogram};

    describe_counter!(
        HTTP_REQUESTS_TOTAL,
        "Total number of HTTP requests served, by route and status"
    );
    describe_histogram!(
        HTTP_REQUEST_DURATION_SECONDS,
        "HTTP request latency in seconds"
    );
    describe_counter!(
        LOOKUPS_TOTAL,
        "Total number of definition store lookups, by selector and result"
    );
    describe_gauge!(
        STORE_DEFINITIONS,
        "Number of OVAL definitions loaded into the store"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_names_share_prefix() {
        for name in [
            HTTP_REQUESTS_TOTAL,
            HTTP_REQUEST_DURATION_SECONDS,
            LOOKUPS_TOTAL,
            STORE_DEFINITIONS,
        ] {
            assert!(name.starts_with("ovaldict_"), "{name}");
        }
    }

    #[test]
    fn describe_all_without_recorder_is_noop() {
        describe_all();
    }
}
