//! 도메인 경로 조인 (문서 저장소)
//!
//! 관계 필드를 `$lookup` 파이프라인 문서로 펼칩니다. 조인 테이블/외래키
//! 이름은 관계형 빌더와 같은 설정 포맷을 사용합니다.

use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::debug;

use sift_core::metadata::{Cardinality, Descriptor, DomainPath, FieldKind, FieldPlan};
use sift_core::naming::apply_format;
use sift_core::reflect::{read_fields, FieldValue, Fields};
use sift_core::suffix::Suffix;
use sift_core::{Criteria, Entity, Error, Result, SqlConfig};

use crate::domain::relation_of;

/// 문서 식별자 필드
pub const MONGO_ID: &str = "_id";

/// `$lookup` 파이프라인 빌더
#[derive(Debug, Clone)]
pub struct LookupBuilder {
    config: Arc<SqlConfig>,
}

impl Default for LookupBuilder {
    fn default() -> Self {
        Self::new(SqlConfig::global())
    }
}

impl LookupBuilder {
    pub fn new(config: Arc<SqlConfig>) -> Self {
        Self { config }
    }

    /// 소유자 `O`의 관계 필드를 뷰 `V` 목록으로 조회하는 `$lookup`
    pub fn build_lookup_for_sub_domain<O: Entity, V: Entity, Q: Criteria>(
        &self,
        query: &Q,
        field: &str,
    ) -> Result<Value> {
        let owner = Descriptor::for_entity::<O>(&self.config)?;
        let relation = relation_of(&owner, field)?;
        let view = Descriptor::for_entity::<V>(&self.config)?;

        let mut project = Map::new();
        for plan in view.columns() {
            project.insert(plan.name.to_string(), json!(1));
        }
        let project = json!({ "$project": project });

        let path = &relation.path;
        if path.len() == 1 {
            let table = apply_format(&self.config.table_format, &[&path.domains[0]]);
            let fk = foreign_key(field, path.last_domain_id_column.as_deref())?;
            return Ok(match relation.cardinality {
                Cardinality::Many => lookup(&table, MONGO_ID, fk, vec![project], field),
                Cardinality::One => lookup(&table, fk, MONGO_ID, vec![project], field),
            });
        }

        let filter = self.build_filter(query)?;
        let expanded = path.expand(&self.config, relation.is_reverse(field));
        let n = expanded.join_tables.len();
        let view_ref = format!("${}", field);

        let mut pipeline = vec![
            lookup(&expanded.tables[n], &expanded.join_ids[n], MONGO_ID, vec![], field),
            json!({ "$unwind": view_ref }),
            json!({ "$replaceRoot": { "newRoot": view_ref } }),
            json!({ "$match": filter }),
            project,
        ];
        for i in (1..n).rev() {
            pipeline = vec![
                lookup(
                    &expanded.join_tables[i],
                    &expanded.join_ids[i],
                    &expanded.join_ids[i],
                    pipeline,
                    field,
                ),
                json!({ "$unwind": view_ref }),
                json!({ "$replaceRoot": { "newRoot": view_ref } }),
            ];
        }
        Ok(lookup(
            &expanded.join_tables[0],
            MONGO_ID,
            &expanded.join_ids[0],
            pipeline,
            field,
        ))
    }

    /// 중첩 조회용 `$lookup` (대상 문서 하나)
    pub fn build_lookup_for_nested(&self, view_name: &str, path: &DomainPath) -> Result<Value> {
        path.validate(view_name, 1)?;
        if path.len() == 1 {
            let table = apply_format(&self.config.table_format, &[&path.domains[0]]);
            let local = path.local_field.as_deref().ok_or_else(|| Error::InvalidDomainPath {
                field: view_name.to_string(),
                reason: "single-domain lookup needs a local field".to_string(),
            })?;
            return Ok(lookup(&table, local, MONGO_ID, vec![], view_name));
        }

        let reverse = path
            .domains
            .first()
            .map(|first| view_name.contains(first.as_str()))
            .unwrap_or(false);
        let expanded = path.expand(&self.config, reverse);
        let n = expanded.join_tables.len();
        let first_of_view = json!({
            "$replaceRoot": { "newRoot": { "$arrayElemAt": [format!("${}", view_name), 0] } }
        });

        let mut pipeline = vec![
            lookup(&expanded.tables[n], &expanded.join_ids[n], MONGO_ID, vec![], view_name),
            first_of_view.clone(),
        ];
        for i in (1..n).rev() {
            pipeline = vec![
                lookup(
                    &expanded.join_tables[i],
                    &expanded.join_ids[i],
                    &expanded.join_ids[i],
                    pipeline,
                    view_name,
                ),
                first_of_view.clone(),
            ];
        }
        Ok(lookup(
            &expanded.join_tables[0],
            MONGO_ID,
            &expanded.join_ids[0],
            pipeline,
            view_name,
        ))
    }

    /// 조건 객체를 `$match` 필터 문서로 변환
    ///
    /// 서브쿼리/사용자 정의 SQL 조각 같은 관계형 전용 조건은 값이 있으면 에러입니다.
    pub fn build_filter<Q: Criteria>(&self, query: &Q) -> Result<Value> {
        let descriptor = Descriptor::for_criteria::<Q>(&self.config)?;
        let fields = read_fields(query)?;
        filter_document(&descriptor, &fields)
    }
}

fn foreign_key<'a>(field: &str, column: Option<&'a str>) -> Result<&'a str> {
    column.ok_or_else(|| Error::InvalidDomainPath {
        field: field.to_string(),
        reason: "single-domain relation needs a foreign key column".to_string(),
    })
}

fn lookup(from: &str, local_field: &str, foreign_field: &str, pipeline: Vec<Value>, as_name: &str) -> Value {
    let mut doc = Map::new();
    doc.insert("from".to_string(), json!(from));
    doc.insert("localField".to_string(), json!(local_field));
    doc.insert("foreignField".to_string(), json!(foreign_field));
    if !pipeline.is_empty() {
        doc.insert("pipeline".to_string(), Value::Array(pipeline));
    }
    doc.insert("as".to_string(), json!(as_name));
    json!({ "$lookup": doc })
}

fn keyed(key: &str, value: Value) -> Value {
    let mut doc = Map::new();
    doc.insert(key.to_string(), value);
    Value::Object(doc)
}

fn filter_document(descriptor: &Descriptor, fields: &Fields) -> Result<Value> {
    let mut clauses = Vec::new();
    for plan in &descriptor.fields {
        let value = fields.get(plan.name);
        if value.is_absent() || matches!(value, FieldValue::Flag(false)) {
            continue;
        }
        match &plan.kind {
            FieldKind::Simple(suffix) => {
                clauses.extend(condition(&plan.column, *suffix, plan, value)?);
            }
            FieldKind::OrGroup(members) => {
                let mut any = Vec::with_capacity(members.len());
                for (column, suffix) in members {
                    any.extend(condition(column, *suffix, plan, value)?);
                }
                if !any.is_empty() {
                    clauses.push(json!({ "$or": any }));
                }
            }
            FieldKind::Column | FieldKind::Relation(_) => {}
            _ => {
                debug!(field = plan.name, "condition has no document filter form");
                return Err(Error::ValueShape {
                    field: plan.name.to_string(),
                    operator: "lookup".to_string(),
                    expected: "a condition expressible as a document filter",
                });
            }
        }
    }

    Ok(match clauses.len() {
        0 => json!({}),
        1 => clauses.remove(0),
        _ => json!({ "$and": clauses }),
    })
}

fn condition(
    column: &str,
    suffix: Suffix,
    plan: &FieldPlan,
    value: &FieldValue,
) -> Result<Option<Value>> {
    let shape = |expected: &'static str| Error::ValueShape {
        field: plan.name.to_string(),
        operator: suffix.to_string(),
        expected,
    };

    let doc = match suffix {
        Suffix::Null => Some(keyed(column, Value::Null)),
        Suffix::NotNull => Some(keyed(column, json!({ "$ne": null }))),
        Suffix::In | Suffix::NotIn => {
            let FieldValue::List(items) = value else {
                return Err(shape("a collection"));
            };
            if suffix == Suffix::NotIn && items.is_empty() {
                return Ok(None);
            }
            let op = if suffix == Suffix::In { "$in" } else { "$nin" };
            Some(keyed(
                column,
                keyed(op, value.to_json(plan.name, plan.encoding)?),
            ))
        }
        Suffix::Like => {
            let FieldValue::Scalar(Value::String(text)) = value else {
                return Err(shape("a string"));
            };
            Some(keyed(column, json!({ "$regex": regex::escape(text) })))
        }
        _ => {
            if matches!(value, FieldValue::List(_) | FieldValue::Struct(_)) {
                return Err(shape("a single value"));
            }
            let arg = value.to_json(plan.name, plan.encoding)?;
            Some(match suffix {
                Suffix::Not => keyed(column, keyed("$ne", arg)),
                Suffix::Gt => keyed(column, keyed("$gt", arg)),
                Suffix::Ge => keyed(column, keyed("$gte", arg)),
                Suffix::Lt => keyed(column, keyed("$lt", arg)),
                Suffix::Le => keyed(column, keyed("$lte", arg)),
                _ => keyed(column, arg),
            })
        }
    };
    Ok(doc)
}
