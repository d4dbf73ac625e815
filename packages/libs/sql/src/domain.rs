//! 도메인 경로 조인 (관계형)
//!
//! 엔티티의 관계 필드를 조인 테이블을 거치는 중첩 서브쿼리로 펼칩니다.
//! 여러 소유자 id는 같은 형태의 절을 id마다 만들어 `UNION ALL`로 잇고,
//! `PK_FOR_JOIN` 컬럼으로 결과를 소유자에게 되돌립니다.

use std::sync::Arc;

use serde_json::Value;

use sift_core::metadata::{
    Cardinality, Descriptor, DomainPath, FieldKind, Relation,
};
use sift_core::naming::apply_format;
use sift_core::reflect::{read_fields, Fields};
use sift_core::{Criteria, Entity, Error, IdWrapper, PageQuery, Result, SqlConfig};

use crate::builder::{finish, QueryBuilder};
use crate::statement::Statement;

/// 소유자 id 컬럼 별칭
pub const KEY_COLUMN: &str = "PK_FOR_JOIN";

/// 관계 필드 조회에 덧붙이는 조건
struct Filter<'a> {
    descriptor: &'a Descriptor,
    fields: &'a Fields,
    page: &'a PageQuery,
}

/// 도메인 경로 조인 빌더
#[derive(Debug, Clone)]
pub struct DomainPathResolver {
    config: Arc<SqlConfig>,
}

impl Default for DomainPathResolver {
    fn default() -> Self {
        Self::new(SqlConfig::global())
    }
}

impl DomainPathResolver {
    pub fn new(config: Arc<SqlConfig>) -> Self {
        Self { config }
    }

    /// 소유자 `O`의 관계 필드 `field`에 연결된 `R` 목록 조회
    ///
    /// `ids`가 비어 있으면 `None`입니다.
    pub fn build_sub_domain<O: Entity, R: Entity, I: IdWrapper>(
        &self,
        field: &str,
        ids: &[I],
    ) -> Result<Option<Statement>> {
        self.sub_domain::<O, R, I>(field, ids, None)
    }

    /// 조건/정렬/페이징을 덧붙인 관계 필드 조회
    ///
    /// 정렬/페이징은 소유자 id마다 적용되고 그때 각 절은 괄호로 감쌉니다.
    pub fn build_sub_domain_with<O: Entity, R: Entity, Q: Criteria, I: IdWrapper>(
        &self,
        query: &Q,
        field: &str,
        ids: &[I],
    ) -> Result<Option<Statement>> {
        let descriptor = Descriptor::for_criteria::<Q>(&self.config)?;
        let fields = read_fields(query)?;
        let filter = Filter {
            descriptor: &descriptor,
            fields: &fields,
            page: query.page(),
        };
        self.sub_domain::<O, R, I>(field, ids, Some(filter))
    }

    fn sub_domain<O: Entity, R: Entity, I: IdWrapper>(
        &self,
        field: &str,
        ids: &[I],
        filter: Option<Filter<'_>>,
    ) -> Result<Option<Statement>> {
        if ids.is_empty() {
            return Ok(None);
        }

        let owner = Descriptor::for_entity::<O>(&self.config)?;
        let relation = relation_of(&owner, field)?;
        let joined = Descriptor::for_entity::<R>(&self.config)?;
        let columns = joined
            .columns()
            .map(|plan| plan.select_as())
            .collect::<Vec<_>>()
            .join(", ");
        let owner_table = owner.table.render(&Fields::default())?;

        let mut query_args = Vec::new();
        let clause = self.clause(
            field,
            &owner_table,
            relation,
            &columns,
            filter.as_ref(),
            &mut query_args,
        )?;

        let mut args = Vec::with_capacity(ids.len() * (2 + query_args.len()));
        let mut clauses = Vec::with_capacity(ids.len());
        for id in ids {
            let id = id.id();
            args.push(id.clone());
            args.push(id);
            args.extend(query_args.iter().cloned());
            clauses.push(clause.as_str());
        }

        Ok(Some(finish(clauses.join(" UNION ALL "), args)))
    }

    fn clause(
        &self,
        field: &str,
        owner_table: &str,
        relation: &Relation,
        columns: &str,
        filter: Option<&Filter<'_>>,
        query_args: &mut Vec<Value>,
    ) -> Result<String> {
        let path = &relation.path;
        let head = format!("SELECT ? AS {}, {}", KEY_COLUMN, columns);

        let mut sql = if path.len() == 1 {
            let sub_table = apply_format(&self.config.table_format, &[&path.domains[0]]);
            let fk = path
                .last_domain_id_column
                .as_deref()
                .ok_or_else(|| Error::InvalidDomainPath {
                    field: field.to_string(),
                    reason: "single-domain relation needs a foreign key column".to_string(),
                })?;
            match relation.cardinality {
                Cardinality::One => format!(
                    "{} FROM {} WHERE id = (SELECT {} FROM {} WHERE id = ?)",
                    head, sub_table, fk, owner_table
                ),
                Cardinality::Many => format!("{} FROM {} WHERE {} = ?", head, sub_table, fk),
            }
        } else {
            let (target, nested) = self.nested_ids(path, owner_table);
            format!("{} FROM {} WHERE id IN ({})", head, target, nested)
        };

        let Some(filter) = filter else {
            return Ok(sql);
        };

        // AND 조건
        let query_builder = QueryBuilder::new(Arc::clone(&self.config));
        for condition in
            query_builder.conditions(filter.descriptor, filter.fields, None, query_args)?
        {
            sql.push_str(" AND ");
            sql.push_str(&condition);
        }

        // ORDER BY
        let order_by = filter.page.order_by(self.config.map_camel_case)?;
        if let Some(order_by) = &order_by {
            sql.push_str(" ORDER BY ");
            sql.push_str(order_by);
        }

        // LIMIT / OFFSET
        let paging = filter.page.need_paging();
        if paging {
            sql = self.config.dialect.build_page_sql(
                &sql,
                filter.page.effective_page_size(),
                filter.page.calc_offset(),
            );
        }

        // UNION ALL 멤버의 ORDER BY / LIMIT는 괄호 안에서만 허용
        if paging || order_by.is_some() {
            sql = format!("({})", sql);
        }
        Ok(sql)
    }

    /// 대상 테이블과 소유자 id에 묶인 중첩 서브쿼리
    ///
    /// 소유자 테이블이 첫 도메인이 아니면 경로를 뒤집습니다.
    fn nested_ids(&self, path: &DomainPath, owner_table: &str) -> (String, String) {
        let first_table = apply_format(&self.config.table_format, &[&path.domains[0]]);
        let reverse = owner_table != first_table;
        let expanded = path.expand(&self.config, reverse);
        let n = expanded.join_tables.len();

        let mut inner = format!(
            "SELECT {} FROM {} WHERE {} = ?",
            expanded.join_ids[1], expanded.join_tables[0], expanded.join_ids[0]
        );
        for i in 1..n {
            inner = format!(
                "SELECT {} FROM {} WHERE {} IN ({})",
                expanded.join_ids[i + 1],
                expanded.join_tables[i],
                expanded.join_ids[i],
                inner
            );
        }
        (expanded.tables[n].clone(), inner)
    }
}

/// 소유자 디스크립터에서 관계 정의 찾기
pub(crate) fn relation_of<'a>(owner: &'a Descriptor, field: &str) -> Result<&'a Relation> {
    match owner.field(field).map(|plan| &plan.kind) {
        Some(FieldKind::Relation(relation)) => Ok(relation),
        _ => Err(Error::UnknownRelation {
            type_name: owner.type_name,
            field: field.to_string(),
        }),
    }
}
