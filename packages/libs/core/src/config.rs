//! sift 설정
//!
//! 프로세스 전역 설정입니다. 빌더는 생성 시점에 `Arc<SqlConfig>`를 주입받고,
//! 기본 생성자는 한 번만 설치되는 전역 설정을 사용합니다.

use std::env;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::dialect::{Dialect, DialectKind, LimitOffsetDialect};
use crate::error::{Error, Result};

static GLOBAL: OnceLock<Arc<SqlConfig>> = OnceLock::new();

/// sift 설정
#[derive(Clone)]
pub struct SqlConfig {
    /// camelCase 프로퍼티 → snake_case 컬럼 변환 여부
    pub map_camel_case: bool,

    /// 페이징 방언
    pub dialect: Arc<dyn Dialect>,

    /// 도메인 → 테이블 이름 (`t_{}`)
    pub table_format: String,

    /// 두 도메인 사이의 조인 테이블 이름 (`t_{}_and_{}`)
    pub join_table_format: String,

    /// 도메인 → 외래키 컬럼 이름 (`{}Id`)
    pub join_id_format: String,
}

impl Default for SqlConfig {
    fn default() -> Self {
        Self {
            map_camel_case: false,
            dialect: Arc::new(LimitOffsetDialect),
            table_format: "t_{}".to_string(),
            join_table_format: "t_{}_and_{}".to_string(),
            join_id_format: "{}Id".to_string(),
        }
    }
}

impl fmt::Debug for SqlConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlConfig")
            .field("map_camel_case", &self.map_camel_case)
            .field("table_format", &self.table_format)
            .field("join_table_format", &self.join_table_format)
            .field("join_id_format", &self.join_id_format)
            .finish_non_exhaustive()
    }
}

impl SqlConfig {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let dialect = env::var("SIFT_DIALECT")
            .ok()
            .and_then(|v| v.parse::<DialectKind>().ok())
            .unwrap_or_default();

        let config = Self {
            map_camel_case: env::var("SIFT_MAP_CAMEL_CASE")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),

            dialect: dialect.build(),

            table_format: env::var("SIFT_TABLE_FORMAT").unwrap_or(defaults.table_format),

            join_table_format: env::var("SIFT_JOIN_TABLE_FORMAT")
                .unwrap_or(defaults.join_table_format),

            join_id_format: env::var("SIFT_JOIN_ID_FORMAT").unwrap_or(defaults.join_id_format),
        };

        config.validate()?;
        tracing::debug!(dialect = %dialect, ?config, "loaded sql config from env");
        Ok(config)
    }

    /// camelCase 매핑 설정
    pub fn with_map_camel_case(mut self, enabled: bool) -> Self {
        self.map_camel_case = enabled;
        self
    }

    /// 방언 설정
    pub fn with_dialect(mut self, dialect: impl Dialect + 'static) -> Self {
        self.dialect = Arc::new(dialect);
        self
    }

    /// 이름 포맷 검증
    pub fn validate(&self) -> Result<()> {
        check_format(&self.table_format, 1)?;
        check_format(&self.join_table_format, 2)?;
        check_format(&self.join_id_format, 1)?;
        Ok(())
    }

    /// 전역 설정 설치 (프로세스당 한 번)
    pub fn install(config: SqlConfig) -> Result<Arc<SqlConfig>> {
        config.validate()?;
        let config = Arc::new(config);
        GLOBAL
            .set(config.clone())
            .map_err(|_| Error::ConfigAlreadyInstalled)?;
        Ok(config)
    }

    /// 전역 설정 (설치 전이면 기본값)
    pub fn global() -> Arc<SqlConfig> {
        GLOBAL.get_or_init(|| Arc::new(SqlConfig::default())).clone()
    }
}

fn check_format(format: &str, expected: usize) -> Result<()> {
    if format.matches("{}").count() != expected {
        return Err(Error::InvalidFormat {
            format: format.to_string(),
            expected,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SqlConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.map_camel_case);
        assert_eq!(
            config.dialect.build_page_sql("SELECT * FROM t", 10, 0),
            "SELECT * FROM t LIMIT 10 OFFSET 0"
        );
    }

    #[test]
    fn test_invalid_format_rejected() {
        let config = SqlConfig {
            join_table_format: "t_{}".to_string(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.code(), "INVALID_FORMAT");
    }

    #[test]
    fn test_builder_style_overrides() {
        let config = SqlConfig::default()
            .with_map_camel_case(true)
            .with_dialect(|sql: &str, limit: u32, _offset: u64| format!("{} TOP {}", sql, limit));
        assert!(config.map_camel_case);
        assert_eq!(config.dialect.build_page_sql("SELECT 1", 3, 0), "SELECT 1 TOP 3");
    }

    #[test]
    fn test_from_env_defaults() {
        let config = SqlConfig::from_env().unwrap();
        assert!(config.validate().is_ok());
    }
}
