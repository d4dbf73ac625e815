//! 타입 디스크립터
//!
//! 조건/엔티티 타입을 한 번 분석해 필드별 컴파일 계획을 만듭니다.

use std::any::type_name;

use crate::criteria::{Criteria, Entity};
use crate::error::{Error, Result};
use crate::naming::to_column;
use crate::reflect::{field_names, EnumEncoding};
use crate::suffix::{resolve_name, resolve_suffix, Suffix};

use super::annotation::{Annotation, Annotations};
use super::relation::{DomainPath, NestedQueries, Relation};
use super::template::Template;

/// 디스크립터 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorKind {
    Criteria,
    Entity,
}

/// 필드 컴파일 방식
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// `column <op> ?`
    Simple(Suffix),
    /// `(a <op> ? OR b <op> ?)`
    OrGroup(Vec<(String, Suffix)>),
    /// 사용자 정의 SQL 조각
    Custom(String),
    /// `id IN (SELECT select FROM from WHERE column <op>)`
    SubQuery {
        select: String,
        from: String,
        suffix: Suffix,
    },
    Nested {
        queries: NestedQueries,
        suffix: Suffix,
    },
    /// 조인 테이블 경로 필터
    DomainPath { path: DomainPath, suffix: Suffix },
    /// 엔티티 컬럼
    Column,
    /// 엔티티 관계 필드 (컬럼 아님)
    Relation(Relation),
}

/// 필드 계획
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPlan {
    pub name: &'static str,
    pub column: String,
    pub kind: FieldKind,
    pub encoding: EnumEncoding,
}

impl FieldPlan {
    pub fn is_column(&self) -> bool {
        matches!(self.kind, FieldKind::Column)
    }

    /// SELECT 목록용 컬럼 (`column AS name`)
    pub fn select_as(&self) -> String {
        if self.column == self.name {
            self.column.clone()
        } else {
            format!("{} AS {}", self.column, self.name)
        }
    }
}

/// 엔티티 식별자
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdPlan {
    pub name: &'static str,
    pub column: String,
    pub generated: bool,
}

/// 타입 디스크립터
#[derive(Debug)]
pub struct Descriptor {
    pub type_name: &'static str,
    pub kind: DescriptorKind,
    pub table: Template,
    pub join: Option<Template>,
    pub group_by: Option<String>,
    pub fields: Vec<FieldPlan>,
    pub id: Option<IdPlan>,
}

impl Descriptor {
    /// 컬럼 계획만 (엔티티)
    pub fn columns(&self) -> impl Iterator<Item = &FieldPlan> {
        self.fields.iter().filter(|f| f.is_column())
    }

    pub fn field(&self, name: &str) -> Option<&FieldPlan> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// 조인 템플릿에서 소비되는 필드인지
    pub fn consumed_by_join(&self, field: &str) -> bool {
        self.join
            .as_ref()
            .map(|join| join.references(field))
            .unwrap_or(false)
    }

    pub(crate) fn build_criteria<Q: Criteria>(map_camel_case: bool) -> Result<Self> {
        let type_name = type_name::<Q>();
        let names = field_names::<Q>().ok_or(Error::NotAStruct { type_name })?;

        let mut annotations = Annotations::new();
        Q::annotate(&mut annotations);
        check_annotations(type_name, names, &annotations)?;

        let table = Template::table(Q::table())?;
        check_template(names, &table)?;
        let join = Q::join().map(Template::join).transpose()?;
        if let Some(join) = &join {
            check_template(names, join)?;
        }

        let mut fields = Vec::with_capacity(names.len());
        for &name in names {
            if annotations.has(name, &Annotation::Ignore)
                || table.references(name)
                || join.as_ref().map(|j| j.references(name)).unwrap_or(false)
            {
                continue;
            }
            fields.push(criteria_plan(name, &annotations, map_camel_case)?);
        }

        Ok(Self {
            type_name,
            kind: DescriptorKind::Criteria,
            table,
            join,
            group_by: Q::group_by()
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .map(str::to_string),
            fields,
            id: None,
        })
    }

    pub(crate) fn build_entity<E: Entity>(map_camel_case: bool) -> Result<Self> {
        let type_name = type_name::<E>();
        let names = field_names::<E>().ok_or(Error::NotAStruct { type_name })?;

        let mut annotations = Annotations::new();
        E::annotate(&mut annotations);
        check_annotations(type_name, names, &annotations)?;

        let table = Template::table(E::table())?;
        check_template(names, &table)?;

        let mut fields = Vec::with_capacity(names.len());
        for &name in names {
            if annotations.has(name, &Annotation::Ignore) || table.references(name) {
                continue;
            }
            let relation = annotations.for_field(name).find_map(|a| match a {
                Annotation::Relation(r) => Some(r.clone()),
                _ => None,
            });
            let kind = match relation {
                Some(relation) => {
                    relation.path.validate(name, 1)?;
                    FieldKind::Relation(relation)
                }
                None => FieldKind::Column,
            };
            fields.push(FieldPlan {
                name,
                column: to_column(name, map_camel_case),
                kind,
                encoding: encoding_of(name, &annotations),
            });
        }

        let id = resolve_id(type_name, names, &annotations, map_camel_case)?;

        Ok(Self {
            type_name,
            kind: DescriptorKind::Entity,
            table,
            join: None,
            group_by: None,
            fields,
            id,
        })
    }
}

fn check_annotations(
    type_name: &'static str,
    names: &[&'static str],
    annotations: &Annotations,
) -> Result<()> {
    match annotations.fields().find(|f| !names.contains(f)) {
        Some(field) => Err(Error::UnknownField {
            type_name,
            field: field.to_string(),
        }),
        None => Ok(()),
    }
}

fn check_template(names: &[&'static str], template: &Template) -> Result<()> {
    match template
        .field_names()
        .find(|f| !names.iter().any(|n| n == f))
    {
        Some(field) => Err(Error::InvalidTemplate {
            template: template.source().to_string(),
            reason: format!("unknown field `{}`", field),
        }),
        None => Ok(()),
    }
}

fn encoding_of(name: &str, annotations: &Annotations) -> EnumEncoding {
    if annotations.has(name, &Annotation::EnumAsString) {
        EnumEncoding::Name
    } else {
        EnumEncoding::Ordinal
    }
}

fn criteria_plan(
    name: &'static str,
    annotations: &Annotations,
    map_camel_case: bool,
) -> Result<FieldPlan> {
    let encoding = encoding_of(name, annotations);
    let (base, suffix) = resolve_suffix(name);
    let column = to_column(base, map_camel_case);

    let special = annotations.for_field(name).find(|a| {
        matches!(
            a,
            Annotation::QueryField { .. }
                | Annotation::SubQuery { .. }
                | Annotation::Nested(_)
                | Annotation::DomainPath(_)
        )
    });

    let kind = match special {
        Some(Annotation::QueryField { template }) => FieldKind::Custom(template.clone()),
        Some(Annotation::SubQuery { select, from }) => FieldKind::SubQuery {
            select: select.clone(),
            from: from.clone(),
            suffix,
        },
        Some(Annotation::Nested(queries)) => {
            queries.validate(name)?;
            FieldKind::Nested {
                queries: queries.clone(),
                suffix,
            }
        }
        Some(Annotation::DomainPath(path)) => {
            path.validate(name, 2)?;
            FieldKind::DomainPath {
                path: path.clone(),
                suffix,
            }
        }
        _ => {
            let resolved = resolve_name(name);
            if resolved.is_or_group() {
                FieldKind::OrGroup(
                    resolved
                        .members
                        .into_iter()
                        .map(|(member, suffix)| (to_column(&member, map_camel_case), suffix))
                        .collect(),
                )
            } else {
                FieldKind::Simple(suffix)
            }
        }
    };

    Ok(FieldPlan {
        name,
        column,
        kind,
        encoding,
    })
}

/// 식별자 결정
///
/// `id` 어노테이션이 정확히 하나이고 `generated`가 함께 붙은 경우에만
/// 생성형입니다. 어노테이션이 없으면 `id` 필드를 식별자로 사용합니다.
fn resolve_id(
    type_name: &'static str,
    names: &[&'static str],
    annotations: &Annotations,
    map_camel_case: bool,
) -> Result<Option<IdPlan>> {
    let ids: Vec<&'static str> = names
        .iter()
        .copied()
        .filter(|n| annotations.has(n, &Annotation::Id))
        .collect();

    if let Some(stray) = names
        .iter()
        .find(|n| annotations.has(n, &Annotation::Generated) && !ids.contains(*n))
    {
        return Err(Error::InvalidId {
            type_name,
            reason: format!("`{}` is marked generated but is not an id", stray),
        });
    }

    let generated = ids.len() == 1 && annotations.has(ids[0], &Annotation::Generated);
    if ids.len() > 1 {
        tracing::debug!(
            type_name,
            ids = ids.len(),
            "multiple id fields, treating id as caller supplied"
        );
    }

    let name = match ids.first() {
        Some(name) => *name,
        None => match names.iter().find(|n| **n == "id") {
            Some(name) => *name,
            None => return Ok(None),
        },
    };

    Ok(Some(IdPlan {
        name,
        column: to_column(name, map_camel_case),
        generated,
    }))
}
