//! 정의 데이터베이스 -- 로컬 JSON DB 로딩 및 조회
//!
//! [`DefinitionDb`]는 로컬 파일시스템의 JSON 파일에서 OVAL 정의를 로드하고
//! [`DefinitionStore`] trait을 구현합니다. 로드 이후에는 읽기 전용이므로
//! 잠금 없이 여러 요청에서 동시에 조회할 수 있습니다.
//!
//! # DB 디렉토리 구조
//!
//! ```text
//! /var/lib/ovaldict/oval-db/
//!   ubuntu/
//!     16.json      # Ubuntu 16 정의
//!     18.json
//!   centos/
//!     7.json
//! ```
//!
//! 패밀리는 디렉토리 이름, 릴리스는 파일 이름(확장자 제외)을 그대로 사용합니다.
//! 대소문자를 구분합니다.
//!
//! # JSON 형식
//!
//! ```json
//! [
//!   {
//!     "ID": "CVE-2016-0800",
//!     "Title": "CVE-2016-0800 on Ubuntu 16.04 LTS (xenial) - high.",
//!     "Advisory": { "Severity": "High", "Cves": [{ "CveID": "CVE-2016-0800" }] },
//!     "AffectedPacks": [{ "Name": "openssl", "Version": "1.0.2g-1ubuntu1", "NotFixedYet": false }]
//!   }
//! ]
//! ```

use std::collections::HashMap;
use std::path::Path;

use ovaldict_core::error::StoreError;
use ovaldict_core::metrics::STORE_DEFINITIONS;
use ovaldict_core::store::DefinitionStore;
use ovaldict_core::types::Definition;

use crate::error::DefinitionDbError;

/// 정의 DB 파일 최대 크기 (100 MB)
const MAX_DB_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// 전체 정의 최대 개수 (2,000,000개)
const MAX_DB_DEFINITIONS: usize = 2_000_000;

/// 디렉토리 로딩 제한
#[derive(Debug, Clone, Copy)]
struct LoadLimits {
    max_file_size: u64,
    max_definitions: usize,
}

impl Default for LoadLimits {
    fn default() -> Self {
        Self {
            max_file_size: MAX_DB_FILE_SIZE,
            max_definitions: MAX_DB_DEFINITIONS,
        }
    }
}

/// 한 (패밀리, 릴리스)의 정의와 조회 인덱스
#[derive(Debug, Default)]
struct ReleaseIndex {
    /// 로드 순서대로 저장된 정의
    definitions: Vec<Definition>,
    /// CVE ID -> 정의 인덱스
    by_cve: HashMap<String, Vec<usize>>,
    /// 패키지 이름 -> 정의 인덱스
    by_pack: HashMap<String, Vec<usize>>,
}

impl ReleaseIndex {
    fn push(&mut self, definition: Definition) {
        let idx = self.definitions.len();
        for cve_id in definition.cve_ids() {
            self.by_cve.entry(cve_id.to_owned()).or_default().push(idx);
        }
        for name in definition.package_names() {
            self.by_pack.entry(name.to_owned()).or_default().push(idx);
        }
        self.definitions.push(definition);
    }

    fn collect(&self, indices: Option<&Vec<usize>>) -> Vec<Definition> {
        indices
            .map(|indices| {
                indices
                    .iter()
                    .filter_map(|&idx| self.definitions.get(idx))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// OVAL 정의 데이터베이스
///
/// 패밀리 -> 릴리스 -> [`ReleaseIndex`] 2단계 맵으로 O(1) 조회합니다.
///
/// # 조회 규칙
///
/// - DB에 없는 패밀리: `StoreError::UnsupportedFamily`
/// - 알려진 패밀리의 없는 릴리스, 또는 일치 없음: 빈 `Vec`
/// - 결과는 로드 순서를 유지하며, 한 정의는 키마다 최대 한 번 나타납니다.
#[derive(Debug, Default)]
pub struct DefinitionDb {
    families: HashMap<String, HashMap<String, ReleaseIndex>>,
    total: usize,
}

impl DefinitionDb {
    /// 빈 데이터베이스를 생성합니다.
    pub fn empty() -> Self {
        Self::default()
    }

    /// 단일 (패밀리, 릴리스)의 정의 목록으로 데이터베이스를 생성합니다 (테스트용).
    pub fn from_definitions(
        family: impl Into<String>,
        release: impl Into<String>,
        definitions: Vec<Definition>,
    ) -> Self {
        let mut db = Self::empty();
        db.insert_release(family, release, definitions);
        db
    }

    /// JSON 문자열에서 단일 (패밀리, 릴리스)를 파싱합니다.
    ///
    /// JSON 형식: `Definition` 배열
    pub fn from_json(
        family: impl Into<String>,
        release: impl Into<String>,
        json: &str,
    ) -> Result<Self, DefinitionDbError> {
        let family = family.into();
        let release = release.into();
        let definitions: Vec<Definition> =
            serde_json::from_str(json).map_err(|e| DefinitionDbError::Parse {
                path: format!("{family}/{release}"),
                reason: e.to_string(),
            })?;
        Ok(Self::from_definitions(family, release, definitions))
    }

    /// 패밀리를 정의 없이 등록합니다.
    pub fn insert_family(&mut self, family: impl Into<String>) {
        self.families.entry(family.into()).or_default();
    }

    /// (패밀리, 릴리스)에 정의를 추가합니다. 기존 정의 뒤에 이어 붙입니다.
    pub fn insert_release(
        &mut self,
        family: impl Into<String>,
        release: impl Into<String>,
        definitions: Vec<Definition>,
    ) {
        let index = self
            .families
            .entry(family.into())
            .or_default()
            .entry(release.into())
            .or_default();
        self.total += definitions.len();
        for definition in definitions {
            index.push(definition);
        }
    }

    /// 디렉토리에서 모든 패밀리/릴리스의 정의 DB를 로드합니다.
    ///
    /// `{dir}/{family}/{release}.json` 파일만 읽고, 그 외 파일은 건너뜁니다.
    /// 디렉토리 자체를 읽을 수 없으면 에러를 반환합니다.
    ///
    /// # 보안 제한
    ///
    /// - 파일당 최대 100MB (`MAX_DB_FILE_SIZE`)
    /// - 전체 정의 최대 2,000,000개 (`MAX_DB_DEFINITIONS`)
    ///
    /// 정의 수 제한에 도달하면 남은 파일의 정의는 버리지만, 이후 패밀리도
    /// 등록은 하므로 조회 시 `UnsupportedFamily`가 아닌 빈 결과가 됩니다.
    ///
    /// # Note
    ///
    /// 이 함수는 동기 I/O를 수행합니다. async 컨텍스트에서 호출할 때는
    /// `tokio::task::spawn_blocking`으로 감싸세요.
    pub fn load_from_dir(dir_path: &Path) -> Result<Self, DefinitionDbError> {
        Self::load_with_limits(dir_path, LoadLimits::default())
    }

    fn load_with_limits(dir_path: &Path, limits: LoadLimits) -> Result<Self, DefinitionDbError> {
        let mut db = Self::empty();

        'families: for family_dir in sorted_entries(dir_path)? {
            if !family_dir.is_dir() {
                continue;
            }
            let Some(family) = file_name(&family_dir) else {
                continue;
            };
            db.insert_family(family.clone());

            if db.total >= limits.max_definitions {
                tracing::debug!(family = %family, "definition limit reached, skipping family data");
                continue;
            }

            for file_path in sorted_entries(&family_dir)? {
                if !file_path.is_file()
                    || file_path.extension().and_then(|e| e.to_str()) != Some("json")
                {
                    tracing::debug!(path = %file_path.display(), "skipping non-json entry");
                    continue;
                }
                let Some(release) = file_path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .map(str::to_owned)
                else {
                    continue;
                };

                let definitions = read_definitions(&file_path, limits.max_file_size)?;

                if db.total + definitions.len() > limits.max_definitions {
                    tracing::warn!(
                        current = db.total,
                        new = definitions.len(),
                        max = limits.max_definitions,
                        "definition database limit reached, truncating"
                    );
                    let remaining = limits.max_definitions.saturating_sub(db.total);
                    db.insert_release(
                        family.clone(),
                        release,
                        definitions.into_iter().take(remaining).collect(),
                    );
                    continue 'families;
                }

                tracing::info!(
                    path = %file_path.display(),
                    family = %family,
                    release = %release,
                    definitions = definitions.len(),
                    "loaded definition db file"
                );
                db.insert_release(family.clone(), release, definitions);
            }
        }

        metrics::gauge!(STORE_DEFINITIONS).set(db.total as f64);
        Ok(db)
    }

    /// 데이터베이스 내 전체 정의 수를 반환합니다.
    pub fn definition_count(&self) -> usize {
        self.total
    }

    /// 로드된 패밀리 이름 목록 (정렬됨)
    pub fn families(&self) -> Vec<&str> {
        let mut families: Vec<&str> = self.families.keys().map(String::as_str).collect();
        families.sort_unstable();
        families
    }

    fn release(&self, family: &str, release: &str) -> Result<Option<&ReleaseIndex>, StoreError> {
        let releases =
            self.families
                .get(family)
                .ok_or_else(|| StoreError::UnsupportedFamily {
                    family: family.to_owned(),
                })?;
        Ok(releases.get(release))
    }
}

impl DefinitionStore for DefinitionDb {
    fn get_by_cve_id(
        &self,
        family: &str,
        release: &str,
        cve_id: &str,
    ) -> Result<Vec<Definition>, StoreError> {
        Ok(self
            .release(family, release)?
            .map(|index| index.collect(index.by_cve.get(cve_id)))
            .unwrap_or_default())
    }

    fn get_by_pack_name(
        &self,
        family: &str,
        release: &str,
        pack: &str,
    ) -> Result<Vec<Definition>, StoreError> {
        Ok(self
            .release(family, release)?
            .map(|index| index.collect(index.by_pack.get(pack)))
            .unwrap_or_default())
    }
}

fn sorted_entries(dir: &Path) -> Result<Vec<std::path::PathBuf>, DefinitionDbError> {
    let read_dir = std::fs::read_dir(dir).map_err(|e| DefinitionDbError::Load {
        path: dir.display().to_string(),
        reason: e.to_string(),
    })?;

    let mut paths = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|e| DefinitionDbError::Load {
            path: dir.display().to_string(),
            reason: e.to_string(),
        })?;
        paths.push(entry.path());
    }
    paths.sort();
    Ok(paths)
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_owned)
}

fn read_definitions(file_path: &Path, max_size: u64) -> Result<Vec<Definition>, DefinitionDbError> {
    let metadata = std::fs::metadata(file_path).map_err(|e| DefinitionDbError::Load {
        path: file_path.display().to_string(),
        reason: e.to_string(),
    })?;

    let file_size = metadata.len();
    if file_size > max_size {
        return Err(DefinitionDbError::FileTooBig {
            path: file_path.display().to_string(),
            size: file_size,
            max: max_size,
        });
    }

    let content = std::fs::read_to_string(file_path).map_err(|e| DefinitionDbError::Load {
        path: file_path.display().to_string(),
        reason: e.to_string(),
    })?;

    serde_json::from_str(&content).map_err(|e| DefinitionDbError::Parse {
        path: file_path.display().to_string(),
        reason: e.to_string(),
    })
}
