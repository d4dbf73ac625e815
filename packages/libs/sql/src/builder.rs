//! 조회 SQL 빌더
//!
//! 조건 객체를 받아 SELECT / COUNT / DELETE 문장을 생성합니다.

use std::sync::Arc;

use tracing::trace;

use sift_core::metadata::{Descriptor, Template};
use sift_core::reflect::{read_fields, Fields};
use sift_core::{Criteria, Result, SqlConfig};

use crate::condition::compile;
use crate::statement::Statement;

/// SELECT / COUNT / DELETE 빌더
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    config: Arc<SqlConfig>,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new(SqlConfig::global())
    }
}

impl QueryBuilder {
    /// 새 빌더 생성
    pub fn new(config: Arc<SqlConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SqlConfig {
        &self.config
    }

    /// `SELECT * FROM ...`
    pub fn build_select<Q: Criteria>(&self, query: &Q) -> Result<Statement> {
        self.select(query, &[], None)
    }

    /// 지정 컬럼 조회 (비어 있으면 `*`)
    pub fn build_select_columns<Q: Criteria>(
        &self,
        query: &Q,
        columns: &[&str],
    ) -> Result<Statement> {
        self.select(query, columns, None)
    }

    /// `SELECT id FROM ...`
    pub fn build_select_id<Q: Criteria>(&self, query: &Q) -> Result<Statement> {
        self.select(query, &["id"], None)
    }

    /// 조인 절을 붙인 조회
    ///
    /// 조인 절의 `#{field}`는 `?`로 바뀌고 그 필드는 WHERE에서 제외됩니다.
    pub fn build_select_columns_and_join<Q: Criteria>(
        &self,
        query: &Q,
        join: &str,
        columns: &[&str],
    ) -> Result<Statement> {
        let join = Template::join(join)?;
        self.select(query, columns, Some(&join))
    }

    /// 건수 조회
    ///
    /// GROUP BY가 선언된 타입은 `COUNT(DISTINCT(<group columns>))`를 사용합니다.
    pub fn build_count<Q: Criteria>(&self, query: &Q) -> Result<Statement> {
        let descriptor = Descriptor::for_criteria::<Q>(&self.config)?;
        let fields = read_fields(query)?;
        let mut args = Vec::new();

        // SELECT COUNT
        let count = match &descriptor.group_by {
            Some(group_by) => format!("COUNT(DISTINCT({}))", group_by),
            None => "COUNT(*)".to_string(),
        };
        let mut sql = format!("SELECT {} FROM {}", count, descriptor.table.render(&fields)?);

        // JOIN
        if let Some(join) = &descriptor.join {
            sql.push(' ');
            sql.push_str(&join.bind(&fields, &mut args)?);
        }

        // WHERE
        let conditions = self.conditions(&descriptor, &fields, None, &mut args)?;
        append_where(&mut sql, &conditions);

        Ok(finish(sql, args))
    }

    /// 조건 삭제
    ///
    /// 페이징이 요청되면 방언이 `LIMIT`만 붙입니다.
    pub fn build_delete<Q: Criteria>(&self, query: &Q) -> Result<Statement> {
        let descriptor = Descriptor::for_criteria::<Q>(&self.config)?;
        let fields = read_fields(query)?;
        let mut args = Vec::new();

        let mut sql = format!("DELETE FROM {}", descriptor.table.render(&fields)?);

        // WHERE
        let conditions = self.conditions(&descriptor, &fields, None, &mut args)?;
        append_where(&mut sql, &conditions);

        // LIMIT
        let page = query.page();
        if page.need_paging() {
            sql = self
                .config
                .dialect
                .build_page_sql(&sql, page.effective_page_size(), page.calc_offset());
        }

        Ok(finish(sql, args))
    }

    fn select<Q: Criteria>(
        &self,
        query: &Q,
        columns: &[&str],
        extra_join: Option<&Template>,
    ) -> Result<Statement> {
        let descriptor = Descriptor::for_criteria::<Q>(&self.config)?;
        let fields = read_fields(query)?;
        let mut args = Vec::new();

        // SELECT columns FROM table
        let columns = if columns.is_empty() {
            "*".to_string()
        } else {
            columns.join(", ")
        };
        let mut sql = format!("SELECT {} FROM {}", columns, descriptor.table.render(&fields)?);

        // JOIN
        for join in descriptor.join.iter().chain(extra_join) {
            sql.push(' ');
            sql.push_str(&join.bind(&fields, &mut args)?);
        }

        // WHERE
        let conditions = self.conditions(&descriptor, &fields, extra_join, &mut args)?;
        append_where(&mut sql, &conditions);

        // GROUP BY
        if let Some(group_by) = &descriptor.group_by {
            sql.push_str(" GROUP BY ");
            sql.push_str(group_by);
        }

        // ORDER BY
        let page = query.page();
        if let Some(order_by) = page.order_by(self.config.map_camel_case)? {
            sql.push_str(" ORDER BY ");
            sql.push_str(&order_by);
        }

        // LIMIT / OFFSET
        if page.need_paging() {
            sql = self
                .config
                .dialect
                .build_page_sql(&sql, page.effective_page_size(), page.calc_offset());
        }

        Ok(finish(sql, args))
    }

    /// WHERE 조건 목록 (선언 순서)
    pub(crate) fn conditions(
        &self,
        descriptor: &Descriptor,
        fields: &Fields,
        consumed: Option<&Template>,
        args: &mut Vec<serde_json::Value>,
    ) -> Result<Vec<String>> {
        let mut conditions = Vec::new();
        for plan in &descriptor.fields {
            if consumed.map(|t| t.references(plan.name)).unwrap_or(false) {
                continue;
            }
            if let Some(fragment) = compile(plan, fields.get(plan.name), &self.config)? {
                conditions.push(fragment.sql);
                args.extend(fragment.args);
            }
        }
        Ok(conditions)
    }
}

pub(crate) fn append_where(sql: &mut String, conditions: &[String]) {
    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
}

pub(crate) fn finish(sql: String, args: Vec<serde_json::Value>) -> Statement {
    let statement = Statement::new(sql, args);
    trace!(sql = %statement.sql, args = statement.args.len(), "statement built");
    statement
}
