//! CRUD SQL 빌더
//!
//! 엔티티 객체로 INSERT / UPDATE / PATCH / by-id 문장을 생성합니다.

use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;

use sift_core::metadata::{Descriptor, FieldPlan};
use sift_core::naming::placeholders;
use sift_core::reflect::{read_fields, Fields};
use sift_core::{Criteria, Entity, Error, IdWrapper, Result, SqlConfig};

use crate::builder::{append_where, finish, QueryBuilder};
use crate::statement::Statement;

/// 엔티티 CRUD 빌더
#[derive(Debug, Clone)]
pub struct CrudBuilder<E: Entity> {
    config: Arc<SqlConfig>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Default for CrudBuilder<E> {
    fn default() -> Self {
        Self::new(SqlConfig::global())
    }
}

impl<E: Entity> CrudBuilder<E> {
    pub fn new(config: Arc<SqlConfig>) -> Self {
        Self {
            config,
            _entity: PhantomData,
        }
    }

    fn descriptor(&self) -> Result<Arc<Descriptor>> {
        Descriptor::for_entity::<E>(&self.config)
    }

    /// DB 생성 식별자 여부 (생성 키를 읽어야 하는지)
    pub fn is_generated_id(&self) -> Result<bool> {
        Ok(self
            .descriptor()?
            .id
            .as_ref()
            .map(|id| id.generated)
            .unwrap_or(false))
    }

    /// INSERT
    ///
    /// 생성형 식별자에 값이 없으면 컬럼에서 제외합니다.
    pub fn build_create(&self, entity: &E) -> Result<Statement> {
        let descriptor = self.descriptor()?;
        let fields = read_fields(entity)?;

        let plans: Vec<&FieldPlan> = descriptor
            .columns()
            .filter(|plan| !skip_generated_id(&descriptor, plan, &fields))
            .collect();

        let mut args = Vec::with_capacity(plans.len());
        for plan in &plans {
            args.push(fields.get(plan.name).to_arg(plan.name, plan.encoding)?);
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES {}",
            descriptor.table.render(&fields)?,
            column_list(&plans),
            placeholders(plans.len())
        );
        Ok(finish(sql, args))
    }

    /// 다건 INSERT
    ///
    /// 생성형 식별자는 항상 제외합니다. `update_columns`가 있으면
    /// `ON DUPLICATE KEY UPDATE`를 붙입니다. 입력이 비어 있으면 `None`입니다.
    pub fn build_create_batch(
        &self,
        entities: &[E],
        update_columns: &[&str],
    ) -> Result<Option<Statement>> {
        let Some(first) = entities.first() else {
            return Ok(None);
        };
        let descriptor = self.descriptor()?;
        let plans: Vec<&FieldPlan> = descriptor
            .columns()
            .filter(|plan| !is_generated_id(&descriptor, plan))
            .collect();

        let table = descriptor.table.render(&read_fields(first)?)?;
        let row = placeholders(plans.len());

        let mut args = Vec::with_capacity(plans.len() * entities.len());
        let mut rows = Vec::with_capacity(entities.len());
        for entity in entities {
            let fields = read_fields(entity)?;
            for plan in &plans {
                args.push(fields.get(plan.name).to_arg(plan.name, plan.encoding)?);
            }
            rows.push(row.as_str());
        }

        let mut sql = format!(
            "INSERT INTO {} ({}) VALUES {}",
            table,
            column_list(&plans),
            rows.join(", ")
        );

        if !update_columns.is_empty() {
            let updates = update_columns
                .iter()
                .map(|name| -> Result<String> {
                    let plan = descriptor.field(name).filter(|p| p.is_column()).ok_or_else(|| {
                        Error::UnknownField {
                            type_name: descriptor.type_name,
                            field: name.to_string(),
                        }
                    })?;
                    Ok(format!("{} = VALUES ({})", plan.column, plan.column))
                })
                .collect::<Result<Vec<_>>>()?;
            sql.push_str(" ON DUPLICATE KEY UPDATE ");
            sql.push_str(&updates.join(", "));
        }

        Ok(Some(finish(sql, args)))
    }

    /// UPDATE: 식별자 외 모든 컬럼
    pub fn build_update(&self, entity: &E) -> Result<Statement> {
        let descriptor = self.descriptor()?;
        let fields = read_fields(entity)?;
        let mut args = Vec::new();

        let sets = set_clause(&descriptor, &fields, false, &mut args)?;
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?",
            descriptor.table.render(&fields)?,
            sets.join(", "),
            id_column(&descriptor)
        );
        args.push(id_value(&descriptor, &fields)?);
        Ok(finish(sql, args))
    }

    /// PATCH by id: 값이 있는 컬럼만
    pub fn build_patch_by_id(&self, entity: &E) -> Result<Statement> {
        let descriptor = self.descriptor()?;
        let fields = read_fields(entity)?;
        let mut args = Vec::new();

        let sets = set_clause(&descriptor, &fields, true, &mut args)?;
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?",
            descriptor.table.render(&fields)?,
            sets.join(", "),
            id_column(&descriptor)
        );
        args.push(id_value(&descriptor, &fields)?);
        Ok(finish(sql, args))
    }

    /// PATCH by query: 값이 있는 컬럼만, WHERE는 조건 객체
    pub fn build_patch_by_query<Q: Criteria>(&self, entity: &E, query: &Q) -> Result<Statement> {
        let descriptor = self.descriptor()?;
        let fields = read_fields(entity)?;
        let mut args = Vec::new();

        let sets = set_clause(&descriptor, &fields, true, &mut args)?;
        let mut sql = format!(
            "UPDATE {} SET {}",
            descriptor.table.render(&fields)?,
            sets.join(", ")
        );

        // WHERE
        let query_builder = QueryBuilder::new(Arc::clone(&self.config));
        let criteria = Descriptor::for_criteria::<Q>(&self.config)?;
        let conditions = query_builder.conditions(&criteria, &read_fields(query)?, None, &mut args)?;
        append_where(&mut sql, &conditions);

        Ok(finish(sql, args))
    }

    /// DELETE by id
    pub fn build_delete_by_id<I: IdWrapper + ?Sized>(&self, id: &I) -> Result<Statement> {
        let descriptor = self.descriptor()?;
        let fields = wrapper_fields(id)?;
        let sql = format!(
            "DELETE FROM {} WHERE {} = ?",
            descriptor.table.render(&fields)?,
            id_column(&descriptor)
        );
        Ok(finish(sql, vec![id.id()]))
    }

    /// SELECT by id (컬럼이 비어 있으면 엔티티 컬럼)
    pub fn build_select_by_id<I: IdWrapper + ?Sized>(
        &self,
        id: &I,
        columns: &[&str],
    ) -> Result<Statement> {
        let descriptor = self.descriptor()?;
        let fields = wrapper_fields(id)?;
        let columns = if columns.is_empty() {
            descriptor
                .columns()
                .map(|plan| plan.select_as())
                .collect::<Vec<_>>()
                .join(", ")
        } else {
            columns.join(", ")
        };
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?",
            columns,
            descriptor.table.render(&fields)?,
            id_column(&descriptor)
        );
        Ok(finish(sql, vec![id.id()]))
    }
}

fn is_generated_id(descriptor: &Descriptor, plan: &FieldPlan) -> bool {
    descriptor
        .id
        .as_ref()
        .map(|id| id.generated && id.name == plan.name)
        .unwrap_or(false)
}

fn skip_generated_id(descriptor: &Descriptor, plan: &FieldPlan, fields: &Fields) -> bool {
    is_generated_id(descriptor, plan) && fields.get(plan.name).is_absent()
}

fn is_id(descriptor: &Descriptor, plan: &FieldPlan) -> bool {
    descriptor
        .id
        .as_ref()
        .map(|id| id.name == plan.name)
        .unwrap_or(false)
}

fn id_column(descriptor: &Descriptor) -> &str {
    descriptor
        .id
        .as_ref()
        .map(|id| id.column.as_str())
        .unwrap_or("id")
}

fn id_value(descriptor: &Descriptor, fields: &Fields) -> Result<Value> {
    let missing = || Error::MissingId {
        type_name: descriptor.type_name,
    };
    let id = descriptor.id.as_ref().ok_or_else(missing)?;
    let value = fields.get(id.name);
    if value.is_absent() {
        return Err(missing());
    }
    value.to_arg(id.name, Default::default())
}

fn column_list(plans: &[&FieldPlan]) -> String {
    plans
        .iter()
        .map(|plan| plan.column.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// SET 절 (`only_present`이면 값이 있는 컬럼만)
fn set_clause(
    descriptor: &Descriptor,
    fields: &Fields,
    only_present: bool,
    args: &mut Vec<Value>,
) -> Result<Vec<String>> {
    let mut sets = Vec::new();
    for plan in descriptor.columns().filter(|plan| !is_id(descriptor, plan)) {
        let value = fields.get(plan.name);
        if only_present && value.is_absent() {
            continue;
        }
        sets.push(format!("{} = ?", plan.column));
        args.push(value.to_arg(plan.name, plan.encoding)?);
    }
    if sets.is_empty() {
        return Err(Error::EmptyPatch {
            type_name: descriptor.type_name,
        });
    }
    Ok(sets)
}

/// 식별자 래퍼의 필드 (원시 타입이면 비어 있음)
fn wrapper_fields<I: IdWrapper + ?Sized>(id: &I) -> Result<Fields> {
    match read_fields(id) {
        Ok(fields) => Ok(fields),
        Err(Error::NotAStruct { .. }) => Ok(Fields::default()),
        Err(err) => Err(err),
    }
}
