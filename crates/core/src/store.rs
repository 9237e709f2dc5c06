//! 정의 저장소 trait — 조회 계층이 소비하는 외부 경계
//!
//! 새로운 저장소 백엔드를 붙이려면 [`DefinitionStore`]를 구현합니다.
//!
//! # 계약
//!
//! - 두 조회 연산은 동기, 읽기 전용이며 동시 호출에 안전해야 합니다.
//! - 일치하는 정의가 없으면 빈 `Vec`을 반환합니다 (에러 아님).
//! - `Err`는 저장소 자체의 실패만 의미합니다.
//! - 결과 순서는 저장소가 정하며, 호출자는 재정렬/중복 제거를 하지 않습니다.

use crate::error::StoreError;
use crate::types::{Definition, LookupKey, Selector};

/// OVAL 정의 저장소
pub trait DefinitionStore: Send + Sync {
    /// CVE ID로 정의를 조회합니다.
    fn get_by_cve_id(
        &self,
        family: &str,
        release: &str,
        cve_id: &str,
    ) -> Result<Vec<Definition>, StoreError>;

    /// 패키지 이름으로 정의를 조회합니다.
    fn get_by_pack_name(
        &self,
        family: &str,
        release: &str,
        pack: &str,
    ) -> Result<Vec<Definition>, StoreError>;

    /// 조회 키의 선택자에 따라 해당 연산으로 분기합니다.
    fn lookup(&self, key: &LookupKey) -> Result<Vec<Definition>, StoreError> {
        match &key.selector {
            Selector::ByCveId(cve_id) => self.get_by_cve_id(&key.family, &key.release, cve_id),
            Selector::ByPackageName(pack) => {
                self.get_by_pack_name(&key.family, &key.release, pack)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 호출된 연산 이름을 ID에 담아 돌려주는 저장소
    struct EchoStore;

    impl DefinitionStore for EchoStore {
        fn get_by_cve_id(
            &self,
            family: &str,
            release: &str,
            cve_id: &str,
        ) -> Result<Vec<Definition>, StoreError> {
            Ok(vec![Definition {
                id: format!("cve:{family}:{release}:{cve_id}"),
                ..Definition::default()
            }])
        }

        fn get_by_pack_name(
            &self,
            family: &str,
            release: &str,
            pack: &str,
        ) -> Result<Vec<Definition>, StoreError> {
            Ok(vec![Definition {
                id: format!("pack:{family}:{release}:{pack}"),
                ..Definition::default()
            }])
        }
    }

    #[test]
    fn lookup_dispatches_by_cve_id() {
        let defs = EchoStore
            .lookup(&LookupKey::by_cve_id("ubuntu", "16", "CVE-2020-1234"))
            .unwrap();
        assert_eq!(defs[0].id, "cve:ubuntu:16:CVE-2020-1234");
    }

    #[test]
    fn lookup_dispatches_by_package_name() {
        let defs = EchoStore
            .lookup(&LookupKey::by_package_name("centos", "7", "openssl"))
            .unwrap();
        assert_eq!(defs[0].id, "pack:centos:7:openssl");
    }
}
