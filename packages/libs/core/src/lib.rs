//! sift-core: sift 공통 핵심 라이브러리
//!
//! 조건 객체에서 SQL을 만들기 위한 타입 분석과 설정을 제공합니다.
//! 실제 문장 조립은 `sift-sql`이 담당합니다.
//!
//! # 모듈 구조
//!
//! - `config`: 프로세스 전역 설정 (camelCase 변환, 방언, 이름 포맷)
//! - `criteria`: 조건/엔티티/식별자 트레이트
//! - `dialect`: 페이징 방언
//! - `error`: 공통 에러 타입
//! - `metadata`: 어노테이션, 도메인 경로, 타입별 디스크립터 캐시
//! - `naming`: 컬럼 이름 변환 및 문자열 유틸리티
//! - `page`: 페이지/정렬 정보
//! - `reflect`: serde 기반 필드 읽기
//! - `suffix`: 필드 이름 접미사 해석

pub mod config;
pub mod criteria;
pub mod dialect;
pub mod error;
pub mod metadata;
pub mod naming;
pub mod page;
pub mod reflect;
pub mod suffix;

pub use config::SqlConfig;
pub use criteria::{Criteria, Entity, IdWrapper};
pub use dialect::Dialect;
pub use error::{Error, Result};
pub use page::PageQuery;
