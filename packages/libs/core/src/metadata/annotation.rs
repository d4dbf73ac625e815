//! 필드 어노테이션
//!
//! 이름 규칙만으로 표현할 수 없는 필드 의미를 타입별로 등록합니다.

use super::relation::{DomainPath, NestedQueries, Relation};

/// 필드 어노테이션
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    /// 조건/컬럼에서 제외
    Ignore,
    /// enum을 순번 대신 이름으로 바인딩
    EnumAsString,
    /// `id IN (SELECT select FROM from WHERE <field> ...)`
    SubQuery { select: String, from: String },
    /// 사용자 정의 SQL 조각 (값은 `?` 순서대로 바인딩)
    QueryField { template: String },
    /// 다단계 중첩 서브쿼리
    Nested(NestedQueries),
    /// 조인 테이블을 거치는 도메인 경로 필터
    DomainPath(DomainPath),
    /// 엔티티 식별자
    Id,
    /// DB가 생성하는 식별자
    Generated,
    /// 엔티티 관계 필드
    Relation(Relation),
}

/// 타입별 어노테이션 목록
#[derive(Debug, Clone, Default)]
pub struct Annotations {
    entries: Vec<(&'static str, Annotation)>,
}

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, field: &'static str, annotation: Annotation) -> &mut Self {
        self.entries.push((field, annotation));
        self
    }

    pub fn ignore(&mut self, field: &'static str) -> &mut Self {
        self.push(field, Annotation::Ignore)
    }

    pub fn enum_as_string(&mut self, field: &'static str) -> &mut Self {
        self.push(field, Annotation::EnumAsString)
    }

    pub fn sub_query(
        &mut self,
        field: &'static str,
        select: impl Into<String>,
        from: impl Into<String>,
    ) -> &mut Self {
        self.push(
            field,
            Annotation::SubQuery {
                select: select.into(),
                from: from.into(),
            },
        )
    }

    pub fn query_field(&mut self, field: &'static str, template: impl Into<String>) -> &mut Self {
        self.push(
            field,
            Annotation::QueryField {
                template: template.into(),
            },
        )
    }

    pub fn nested(&mut self, field: &'static str, queries: NestedQueries) -> &mut Self {
        self.push(field, Annotation::Nested(queries))
    }

    pub fn domain_path(&mut self, field: &'static str, path: DomainPath) -> &mut Self {
        self.push(field, Annotation::DomainPath(path))
    }

    pub fn id(&mut self, field: &'static str) -> &mut Self {
        self.push(field, Annotation::Id)
    }

    pub fn generated(&mut self, field: &'static str) -> &mut Self {
        self.push(field, Annotation::Generated)
    }

    pub fn relation(&mut self, field: &'static str, relation: Relation) -> &mut Self {
        self.push(field, Annotation::Relation(relation))
    }

    /// 특정 필드의 어노테이션
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a Annotation> + 'a {
        self.entries
            .iter()
            .filter(move |(name, _)| *name == field)
            .map(|(_, a)| a)
    }

    pub fn has(&self, field: &str, annotation: &Annotation) -> bool {
        self.for_field(field).any(|a| a == annotation)
    }

    /// 어노테이션이 붙은 필드 이름 (중복 포함)
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }
}
