//! ovaldict 정의 저장소
//!
//! # Module Structure
//!
//! - [`error`]: 로딩 에러 타입 (`DefinitionDbError`)
//! - [`db`]: JSON 파일 기반 인메모리 정의 DB (`DefinitionDb`)
//!
//! # Architecture
//!
//! ```text
//! {db_path}/{family}/{release}.json --> DefinitionDb::load_from_dir
//!                                              |
//!                           family -> release -> ReleaseIndex
//!                                              |
//!                    DefinitionStore::get_by_cve_id / get_by_pack_name
//! ```

pub mod db;
pub mod error;

pub use db::DefinitionDb;
pub use error::DefinitionDbError;
