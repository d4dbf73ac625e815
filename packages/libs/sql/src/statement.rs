//! 생성된 SQL 문장

use serde_json::Value;

/// SQL 문자열 + 순서대로 바인딩할 인자
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub args: Vec<Value>,
}

impl Statement {
    pub fn new(sql: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            args,
        }
    }

    /// `(sql, args)`로 분해
    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.args)
    }

    /// SQL 안의 `?` 개수
    pub fn placeholder_count(&self) -> usize {
        self.sql.matches('?').count()
    }
}

/// 조건 하나의 SQL 조각과 인자
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    pub sql: String,
    pub args: Vec<Value>,
}

impl Fragment {
    pub fn new(sql: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            args,
        }
    }

    /// 인자 없는 조각
    pub fn bare(sql: impl Into<String>) -> Self {
        Self::new(sql, Vec::new())
    }
}
