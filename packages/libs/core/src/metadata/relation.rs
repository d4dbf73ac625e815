//! 도메인 경로 / 관계 정의
//!
//! 엔티티 사이의 경로(`["user", "role", "perm"]`)와 중첩 서브쿼리 단계를 정의합니다.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::SqlConfig;
use crate::error::{Error, Result};
use crate::naming::apply_format;

static PTN_DOMAIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_]\w*$").expect("valid domain pattern"));

/// 도메인 경로
///
/// 원천 도메인에서 대상 도메인까지의 순서 있는 도메인 이름 목록입니다.
/// 중간 조인 테이블/외래키 이름은 설정의 포맷으로 계산합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainPath {
    pub domains: Vec<String>,

    /// 길이 1 경로에서 사용하는 외래키 컬럼
    pub last_domain_id_column: Option<String>,

    /// 길이 1 중첩 lookup에서 사용하는 로컬 필드
    pub local_field: Option<String>,
}

impl DomainPath {
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            domains: domains.into_iter().map(Into::into).collect(),
            last_domain_id_column: None,
            local_field: None,
        }
    }

    pub fn with_last_domain_id_column(mut self, column: impl Into<String>) -> Self {
        self.last_domain_id_column = Some(column.into());
        self
    }

    pub fn with_local_field(mut self, field: impl Into<String>) -> Self {
        self.local_field = Some(field.into());
        self
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// 경로 검증
    pub fn validate(&self, field: &str, min_len: usize) -> Result<()> {
        if self.domains.len() < min_len {
            return Err(Error::InvalidDomainPath {
                field: field.to_string(),
                reason: format!("expected at least {} domain(s), got {}", min_len, self.domains.len()),
            });
        }
        if let Some(bad) = self.domains.iter().find(|d| !PTN_DOMAIN.is_match(d)) {
            return Err(Error::InvalidDomainPath {
                field: field.to_string(),
                reason: format!("`{}` is not a valid domain name", bad),
            });
        }
        if self.domains.len() == 1
            && self.last_domain_id_column.is_none()
            && self.local_field.is_none()
        {
            return Err(Error::InvalidDomainPath {
                field: field.to_string(),
                reason: "single-domain path needs a foreign key column".to_string(),
            });
        }
        Ok(())
    }

    /// 경로를 조인 단계로 펼치기
    ///
    /// `reverse`이면 도메인과 조인 테이블 순서를 뒤집어 마지막 도메인이
    /// 항상 대상이 되도록 합니다.
    pub fn expand(&self, config: &SqlConfig, reverse: bool) -> ExpandedPath {
        let n = self.domains.len().saturating_sub(1);
        let mut join_tables: Vec<String> = (0..n)
            .map(|i| {
                apply_format(
                    &config.join_table_format,
                    &[&self.domains[i], &self.domains[i + 1]],
                )
            })
            .collect();
        let mut domains = self.domains.clone();
        if reverse {
            domains.reverse();
            join_tables.reverse();
        }

        let tables = domains
            .iter()
            .map(|d| apply_format(&config.table_format, &[d]))
            .collect();
        let join_ids = domains
            .iter()
            .map(|d| apply_format(&config.join_id_format, &[d]))
            .collect();

        ExpandedPath {
            tables,
            join_tables,
            join_ids,
        }
    }
}

/// 펼쳐진 도메인 경로
///
/// `join_tables[i]`는 `tables[i]`와 `tables[i + 1]`을 잇고,
/// `join_ids[i]`는 `tables[i]`를 가리키는 외래키 컬럼입니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedPath {
    pub tables: Vec<String>,
    pub join_tables: Vec<String>,
    pub join_ids: Vec<String>,
}

/// 관계의 다중성 (선언 필드가 단일 값인지 컬렉션인지)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    One,
    Many,
}

/// 엔티티 관계 필드
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub path: DomainPath,
    pub cardinality: Cardinality,
}

impl Relation {
    /// 컬렉션 필드 (one-to-many, many-to-many)
    pub fn to_many(path: DomainPath) -> Self {
        Self {
            path,
            cardinality: Cardinality::Many,
        }
    }

    /// 단일 값 필드 (many-to-one)
    pub fn to_one(path: DomainPath) -> Self {
        Self {
            path,
            cardinality: Cardinality::One,
        }
    }

    /// 필드 이름이 첫 도메인 이름을 포함하면 경로를 역방향으로 탐색
    pub fn is_reverse(&self, field: &str) -> bool {
        self.path.len() > 1
            && self
                .path
                .domains
                .first()
                .map(|first| field.contains(first.as_str()))
                .unwrap_or(false)
    }
}

/// 중첩 서브쿼리의 한 단계
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedQuery {
    pub select: String,
    pub from: String,
    /// 다음 단계와 비교할 컬럼 (생략 시 다음 단계의 select 컬럼)
    pub r#where: Option<String>,
    /// `from` 뒤에 그대로 붙는 조인 절
    pub extra: Option<String>,
}

impl NestedQuery {
    pub fn new(select: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            select: select.into(),
            from: from.into(),
            r#where: None,
            extra: None,
        }
    }

    pub fn with_where(mut self, column: impl Into<String>) -> Self {
        self.r#where = Some(column.into());
        self
    }

    pub fn with_extra(mut self, extra: impl Into<String>) -> Self {
        self.extra = Some(extra.into());
        self
    }
}

/// 중첩 서브쿼리 정의
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedQueries {
    /// 바깥 쿼리에서 비교할 컬럼
    pub column: String,
    pub levels: Vec<NestedQuery>,
    /// `false`이면 값은 게이트 역할만 하고 마지막 WHERE를 붙이지 않음
    pub append_where: bool,
}

impl NestedQueries {
    pub fn new(levels: Vec<NestedQuery>) -> Self {
        Self {
            column: "id".to_string(),
            levels,
            append_where: true,
        }
    }

    pub fn without_where(mut self) -> Self {
        self.append_where = false;
        self
    }

    pub fn on_column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    pub fn validate(&self, field: &str) -> Result<()> {
        if self.levels.is_empty() {
            return Err(Error::InvalidDomainPath {
                field: field.to_string(),
                reason: "nested queries need at least one level".to_string(),
            });
        }
        if self
            .levels
            .iter()
            .any(|l| l.extra.as_deref().map(|e| e.contains('?')).unwrap_or(false))
        {
            return Err(Error::InvalidDomainPath {
                field: field.to_string(),
                reason: "nested join clauses cannot contain placeholders".to_string(),
            });
        }
        Ok(())
    }
}
