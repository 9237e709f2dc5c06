//! 도메인 타입 — OVAL 정의 레코드와 조회 키
//!
//! [`Definition`]은 하나의 취약점 권고(advisory)를 나타내며,
//! JSON 필드명은 OVAL 사전의 PascalCase 형식을 그대로 따릅니다.
//! 저장소와 서버가 같은 타입을 공유합니다.

use std::fmt;

use serde::{Deserialize, Serialize};

/// OVAL 취약점 정의
///
/// 하나의 OS 패밀리/릴리스 범위에 속하는 권고 레코드입니다.
/// 알 수 없는 필드는 로딩 시 무시되고, 누락된 필드는 기본값을 사용합니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Definition {
    /// 정의 식별자
    #[serde(rename = "ID")]
    pub id: String,
    /// OVAL 정의 ID (예: oval:com.redhat.rhsa:def:20160176)
    #[serde(rename = "DefinitionID")]
    pub definition_id: String,
    /// 제목
    #[serde(rename = "Title")]
    pub title: String,
    /// 상세 설명
    #[serde(rename = "Description")]
    pub description: String,
    /// 권고 정보
    #[serde(rename = "Advisory")]
    pub advisory: Advisory,
    /// Debian 계열 전용 정보
    #[serde(rename = "Debian", skip_serializing_if = "Option::is_none")]
    pub debian: Option<Debian>,
    /// 영향받는 패키지 목록
    #[serde(rename = "AffectedPacks")]
    pub affected_packs: Vec<Package>,
    /// 참조 목록
    #[serde(rename = "References")]
    pub references: Vec<Reference>,
}

impl Definition {
    /// 이 정의가 다루는 CVE ID 목록 (중복 제거, 등장 순서 유지)
    pub fn cve_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        let advisory_ids = self.advisory.cves.iter().map(|c| c.cve_id.as_str());
        let debian_id = self.debian.iter().map(|d| d.cve_id.as_str());
        for id in advisory_ids.chain(debian_id) {
            if !id.is_empty() && !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }

    /// 영향받는 패키지 이름 목록 (중복 제거, 등장 순서 유지)
    pub fn package_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for pack in &self.affected_packs {
            let name = pack.name.as_str();
            if !name.is_empty() && !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

/// 권고 정보
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Advisory {
    /// 심각도 (배포판 표기 그대로, 예: Important, Moderate)
    #[serde(rename = "Severity")]
    pub severity: String,
    /// 관련 CVE 목록
    #[serde(rename = "Cves")]
    pub cves: Vec<Cve>,
    /// 관련 Bugzilla 항목
    #[serde(rename = "Bugzillas")]
    pub bugzillas: Vec<Bugzilla>,
    /// 영향받는 CPE 목록
    #[serde(rename = "AffectedCPEList")]
    pub affected_cpe_list: Vec<String>,
}

/// CVE 항목
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cve {
    #[serde(rename = "CveID")]
    pub cve_id: String,
    #[serde(rename = "Cvss2")]
    pub cvss2: String,
    #[serde(rename = "Cvss3")]
    pub cvss3: String,
    #[serde(rename = "Cwe")]
    pub cwe: String,
    #[serde(rename = "Impact")]
    pub impact: String,
    #[serde(rename = "Href")]
    pub href: String,
    /// 공개 일자
    #[serde(rename = "Public")]
    pub public: String,
}

/// Bugzilla 항목
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bugzilla {
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "Title")]
    pub title: String,
}

/// Debian 계열 정의의 추가 정보
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Debian {
    #[serde(rename = "CveID")]
    pub cve_id: String,
    #[serde(rename = "MoreInfo")]
    pub more_info: String,
    #[serde(rename = "Date")]
    pub date: String,
}

/// 영향받는 패키지
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Package {
    #[serde(rename = "Name")]
    pub name: String,
    /// 수정된 버전
    #[serde(rename = "Version")]
    pub version: String,
    /// 아직 수정되지 않음
    #[serde(rename = "NotFixedYet")]
    pub not_fixed_yet: bool,
}

/// 참조 링크
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reference {
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "RefID")]
    pub ref_id: String,
    #[serde(rename = "RefURL")]
    pub ref_url: String,
}

/// 조회 대상 선택자
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// CVE ID로 조회
    ByCveId(String),
    /// 패키지 이름으로 조회
    ByPackageName(String),
}

impl Selector {
    /// 메트릭 레이블 등에 쓰이는 선택자 종류 이름
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ByCveId(_) => "cve",
            Self::ByPackageName(_) => "pack",
        }
    }

    /// 선택자 값 (CVE ID 또는 패키지 이름)
    pub fn value(&self) -> &str {
        match self {
            Self::ByCveId(v) | Self::ByPackageName(v) => v,
        }
    }
}

/// 조회 키
///
/// 요청 경로에서 추출한 값을 정규화 없이 그대로 담습니다.
/// 요청마다 생성되고 조회가 끝나면 버려집니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LookupKey {
    /// OS 패밀리 (예: ubuntu, centos)
    pub family: String,
    /// 릴리스 (예: 16, 7)
    pub release: String,
    /// 조회 선택자
    pub selector: Selector,
}

impl LookupKey {
    /// CVE ID 조회 키를 생성합니다.
    pub fn by_cve_id(
        family: impl Into<String>,
        release: impl Into<String>,
        cve_id: impl Into<String>,
    ) -> Self {
        Self {
            family: family.into(),
            release: release.into(),
            selector: Selector::ByCveId(cve_id.into()),
        }
    }

    /// 패키지 이름 조회 키를 생성합니다.
    pub fn by_package_name(
        family: impl Into<String>,
        release: impl Into<String>,
        pack: impl Into<String>,
    ) -> Self {
        Self {
            family: family.into(),
            release: release.into(),
            selector: Selector::ByPackageName(pack.into()),
        }
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.family,
            self.release,
            self.selector.value()
        )
    }
}
