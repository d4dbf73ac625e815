//! sift-sql: 동적 SQL 생성 라이브러리
//!
//! 조건/엔티티 객체를 분석해 런타임에 SQL과 바인딩 인자를 생성합니다.
//! 값은 항상 `?` 자리표시자로 바인딩하고, 식별자는 타입 선언과
//! 검증된 정렬 구문에서만 가져옵니다.
//!
//! # 모듈 구조
//!
//! - `builder`: SELECT / COUNT / DELETE 빌더
//! - `condition`: 필드별 WHERE 조각 컴파일
//! - `crud`: INSERT / UPDATE / PATCH / by-id 빌더
//! - `domain`: 관계 필드를 조인 테이블 서브쿼리로 펼치기
//! - `pipeline`: 관계 필드를 `$lookup` 파이프라인으로 펼치기
//! - `statement`: 생성 결과 (SQL + 인자)

pub mod builder;
pub mod condition;
pub mod crud;
pub mod domain;
pub mod pipeline;
pub mod statement;

#[cfg(test)]
mod fixtures;

pub use builder::QueryBuilder;
pub use crud::CrudBuilder;
pub use domain::DomainPathResolver;
pub use pipeline::LookupBuilder;
pub use sift_core::{Error, Result};
pub use statement::{Fragment, Statement};
