//! 공통 에러 타입
//!
//! sift 전체에서 사용되는 에러 타입을 정의합니다.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// sift 공통 에러
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────────
    // Configuration Errors (타입 최초 사용 시 감지)
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("type `{type_name}` is not a plain struct and cannot be described")]
    NotAStruct { type_name: &'static str },

    #[error("annotation on `{type_name}` references unknown field `{field}`")]
    UnknownField {
        type_name: &'static str,
        field: String,
    },

    #[error("invalid domain path on field `{field}`: {reason}")]
    InvalidDomainPath { field: String, reason: String },

    #[error("invalid id declaration on `{type_name}`: {reason}")]
    InvalidId {
        type_name: &'static str,
        reason: String,
    },

    #[error("invalid table template `{template}`: {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("invalid naming format `{format}`: expected {expected} `{{}}` placeholder(s)")]
    InvalidFormat { format: String, expected: usize },

    #[error("global configuration is already installed")]
    ConfigAlreadyInstalled,

    #[error("unknown dialect `{name}`")]
    UnknownDialect { name: String },

    // ─────────────────────────────────────────────────────────────────────────────
    // Value Errors (호출 시 감지, 호출자에게 전파)
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("field `{field}` with operator {operator} expects {expected}")]
    ValueShape {
        field: String,
        operator: String,
        expected: &'static str,
    },

    #[error("table template `{template}` needs a value for `{field}`")]
    MissingTemplateValue { template: String, field: String },

    #[error("table template `{template}` got a non-identifier value for `{field}`")]
    InvalidTemplateValue { template: String, field: String },

    #[error("entity `{type_name}` has no id value")]
    MissingId { type_name: &'static str },

    #[error("patch of `{type_name}` has no present field")]
    EmptyPatch { type_name: &'static str },

    #[error("invalid sort segment: {segment}")]
    InvalidSort { segment: String },

    #[error("relation field `{field}` is not declared on `{type_name}`")]
    UnknownRelation {
        type_name: &'static str,
        field: String,
    },

    // ─────────────────────────────────────────────────────────────────────────────
    // Read Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("failed to read `{type_name}`: {message}")]
    Read {
        type_name: &'static str,
        message: String,
    },
}

impl Error {
    /// 설정 에러 여부 (타입 정의 자체의 결함)
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::NotAStruct { .. }
                | Error::UnknownField { .. }
                | Error::InvalidDomainPath { .. }
                | Error::InvalidId { .. }
                | Error::InvalidTemplate { .. }
                | Error::InvalidFormat { .. }
                | Error::ConfigAlreadyInstalled
                | Error::UnknownDialect { .. }
        )
    }

    /// 에러 코드 (호출자용)
    pub fn code(&self) -> &'static str {
        match self {
            Error::NotAStruct { .. } => "NOT_A_STRUCT",
            Error::UnknownField { .. } => "UNKNOWN_FIELD",
            Error::InvalidDomainPath { .. } => "INVALID_DOMAIN_PATH",
            Error::InvalidId { .. } => "INVALID_ID",
            Error::InvalidTemplate { .. } => "INVALID_TEMPLATE",
            Error::InvalidFormat { .. } => "INVALID_FORMAT",
            Error::ConfigAlreadyInstalled => "CONFIG_ALREADY_INSTALLED",
            Error::UnknownDialect { .. } => "UNKNOWN_DIALECT",
            Error::ValueShape { .. } => "VALUE_SHAPE",
            Error::MissingTemplateValue { .. } => "MISSING_TEMPLATE_VALUE",
            Error::InvalidTemplateValue { .. } => "INVALID_TEMPLATE_VALUE",
            Error::MissingId { .. } => "MISSING_ID",
            Error::EmptyPatch { .. } => "EMPTY_PATCH",
            Error::InvalidSort { .. } => "INVALID_SORT",
            Error::UnknownRelation { .. } => "UNKNOWN_RELATION",
            Error::Read { .. } => "READ_ERROR",
        }
    }
}
