//! 필드 이름 접미사 해석
//!
//! 필드 이름 끝의 연산자 접미사(`Like`, `In`, `NotIn`, `Gt` ...)를 인식하여
//! 기본 프로퍼티 이름과 연산자로 분리합니다.

use std::fmt;

use crate::naming::split_by_or;

/// 조건 연산자 접미사
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Suffix {
    /// 접미사 없음 (`=`)
    Eq,
    /// `Not` (`!=`)
    Not,
    /// `NotIn` (`NOT IN`)
    NotIn,
    /// `In` (`IN`)
    In,
    /// `NotNull` (`IS NOT NULL`)
    NotNull,
    /// `Null` (`IS NULL`)
    Null,
    /// `Like` (`LIKE`, 값 이스케이프)
    Like,
    /// `Gt` (`>`)
    Gt,
    /// `Ge` (`>=`)
    Ge,
    /// `Lt` (`<`)
    Lt,
    /// `Le` (`<=`)
    Le,
}

/// 매칭 순서: 길고 구체적인 접미사가 먼저, `Not`은 마지막
const MATCH_ORDER: [Suffix; 10] = [
    Suffix::NotNull,
    Suffix::NotIn,
    Suffix::Null,
    Suffix::Like,
    Suffix::In,
    Suffix::Gt,
    Suffix::Ge,
    Suffix::Lt,
    Suffix::Le,
    Suffix::Not,
];

impl Suffix {
    /// 필드 이름에 붙는 접미사 문자열
    pub fn token(&self) -> &'static str {
        match self {
            Suffix::Eq => "",
            Suffix::Not => "Not",
            Suffix::NotIn => "NotIn",
            Suffix::In => "In",
            Suffix::NotNull => "NotNull",
            Suffix::Null => "Null",
            Suffix::Like => "Like",
            Suffix::Gt => "Gt",
            Suffix::Ge => "Ge",
            Suffix::Lt => "Lt",
            Suffix::Le => "Le",
        }
    }

    /// SQL 비교 연산자
    pub fn sql_op(&self) -> &'static str {
        match self {
            Suffix::Eq => " = ",
            Suffix::Not => " != ",
            Suffix::NotIn => " NOT IN ",
            Suffix::In => " IN ",
            Suffix::NotNull => " IS NOT NULL",
            Suffix::Null => " IS NULL",
            Suffix::Like => " LIKE ",
            Suffix::Gt => " > ",
            Suffix::Ge => " >= ",
            Suffix::Lt => " < ",
            Suffix::Le => " <= ",
        }
    }

    /// 컬렉션 값을 받는 연산자
    pub fn takes_collection(&self) -> bool {
        matches!(self, Suffix::In | Suffix::NotIn)
    }

    /// 값은 게이트 역할만 하고 바인딩되지 않는 연산자
    pub fn is_null_check(&self) -> bool {
        matches!(self, Suffix::Null | Suffix::NotNull)
    }
}

impl fmt::Display for Suffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Suffix::Eq => f.write_str("Eq"),
            other => f.write_str(other.token()),
        }
    }
}

/// 단일 이름의 접미사 해석
///
/// 매칭되는 접미사가 없거나 접미사를 떼면 이름이 비는 경우 `Eq`입니다.
pub fn resolve_suffix(name: &str) -> (&str, Suffix) {
    for suffix in MATCH_ORDER {
        if let Some(base) = name.strip_suffix(suffix.token()) {
            if !base.is_empty() {
                return (base, suffix);
            }
        }
    }
    (name, Suffix::Eq)
}

/// 해석된 필드 이름
///
/// OR 그룹이 아니면 멤버가 하나입니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
    pub members: Vec<(String, Suffix)>,
}

impl ResolvedName {
    pub fn is_or_group(&self) -> bool {
        self.members.len() > 1
    }

    /// 그룹 전체의 대표 연산자 (마지막 멤버)
    pub fn suffix(&self) -> Suffix {
        self.members.last().map(|(_, s)| *s).unwrap_or(Suffix::Eq)
    }
}

/// 필드 이름 해석 (OR 분리 + 접미사)
///
/// 접미사가 없는 앞쪽 멤버는 마지막 멤버의 접미사를 따릅니다.
/// `usernameOrEmailLike` → `[(username, Like), (email, Like)]`
pub fn resolve_name(name: &str) -> ResolvedName {
    let parts = split_by_or(name);
    let resolved: Vec<(String, Suffix)> = parts
        .iter()
        .map(|part| {
            let (base, suffix) = resolve_suffix(part);
            (base.to_string(), suffix)
        })
        .collect();

    let group_suffix = resolved.last().map(|(_, s)| *s).unwrap_or(Suffix::Eq);
    let members = resolved
        .into_iter()
        .map(|(base, suffix)| {
            if suffix == Suffix::Eq {
                (base, group_suffix)
            } else {
                (base, suffix)
            }
        })
        .collect();

    ResolvedName { members }
}
