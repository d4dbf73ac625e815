//! 페이징 방언
//!
//! 완성된 SQL에 데이터베이스별 페이징 구문을 붙이는 전략 객체입니다.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::Error;

/// 페이징 방언
pub trait Dialect: Send + Sync {
    /// 페이징 SQL 생성
    ///
    /// # Arguments
    /// * `sql` - 조립이 끝난 SQL
    /// * `limit` - 페이지 크기
    /// * `offset` - `page_number * page_size`
    fn build_page_sql(&self, sql: &str, limit: u32, offset: u64) -> String;
}

/// 클로저도 방언으로 사용할 수 있습니다.
impl<F> Dialect for F
where
    F: Fn(&str, u32, u64) -> String + Send + Sync,
{
    fn build_page_sql(&self, sql: &str, limit: u32, offset: u64) -> String {
        self(sql, limit, offset)
    }
}

/// `LIMIT n OFFSET m` (기본값)
///
/// SELECT가 아닌 문장(DELETE 등)에는 `LIMIT`만 붙입니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct LimitOffsetDialect;

impl Dialect for LimitOffsetDialect {
    fn build_page_sql(&self, sql: &str, limit: u32, offset: u64) -> String {
        if sql.starts_with("SELECT") {
            format!("{} LIMIT {} OFFSET {}", sql, limit, offset)
        } else {
            format!("{} LIMIT {}", sql, limit)
        }
    }
}

/// `OFFSET m ROWS FETCH NEXT n ROWS ONLY` (SQL:2008, SQL Server, Oracle 12c+)
///
/// SELECT가 아닌 문장에는 `FETCH FIRST n ROWS ONLY`만 붙입니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct OffsetFetchDialect;

impl Dialect for OffsetFetchDialect {
    fn build_page_sql(&self, sql: &str, limit: u32, offset: u64) -> String {
        if sql.starts_with("SELECT") {
            format!("{} OFFSET {} ROWS FETCH NEXT {} ROWS ONLY", sql, offset, limit)
        } else {
            format!("{} FETCH FIRST {} ROWS ONLY", sql, limit)
        }
    }
}

/// 설정에서 사용하는 방언 이름
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialectKind {
    #[default]
    LimitOffset,
    OffsetFetch,
}

impl DialectKind {
    pub fn build(&self) -> Arc<dyn Dialect> {
        match self {
            DialectKind::LimitOffset => Arc::new(LimitOffsetDialect),
            DialectKind::OffsetFetch => Arc::new(OffsetFetchDialect),
        }
    }
}

/// `limit_offset`, `offset_fetch` 또는 데이터베이스 이름
impl FromStr for DialectKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "limit_offset" | "mysql" | "postgres" | "sqlite" => Ok(DialectKind::LimitOffset),
            "offset_fetch" | "sqlserver" | "oracle" => Ok(DialectKind::OffsetFetch),
            _ => Err(Error::UnknownDialect {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialectKind::LimitOffset => f.write_str("limit_offset"),
            DialectKind::OffsetFetch => f.write_str("offset_fetch"),
        }
    }
}
