//! 조건 컴파일러
//!
//! 필드 계획과 런타임 값으로 WHERE 조각을 만듭니다.
//! 값이 없거나 기본값이면 `None`(생략)을 돌려줍니다.

use serde_json::Value;

use sift_core::config::SqlConfig;
use sift_core::metadata::{DomainPath, FieldKind, FieldPlan, NestedQueries};
use sift_core::naming::{escape_like, placeholders};
use sift_core::reflect::FieldValue;
use sift_core::suffix::Suffix;
use sift_core::{Error, Result};

use crate::statement::Fragment;

/// 필드 하나 컴파일
pub fn compile(plan: &FieldPlan, value: &FieldValue, config: &SqlConfig) -> Result<Option<Fragment>> {
    // 값 없음, primitive bool false
    if value.is_absent() || matches!(value, FieldValue::Flag(false)) {
        return Ok(None);
    }

    match &plan.kind {
        FieldKind::Simple(suffix) => single(&plan.column, *suffix, plan, value),
        FieldKind::OrGroup(members) => or_group(members, plan, value),
        FieldKind::Custom(template) => custom(template, plan, value),
        FieldKind::SubQuery {
            select,
            from,
            suffix,
        } => Ok(single(&plan.column, *suffix, plan, value)?.map(|inner| {
            Fragment::new(
                format!("id IN (SELECT {} FROM {} WHERE {})", select, from, inner.sql),
                inner.args,
            )
        })),
        FieldKind::Nested { queries, suffix } => nested(queries, *suffix, plan, value),
        FieldKind::DomainPath { path, suffix } => domain_path(path, *suffix, plan, value, config),
        FieldKind::Column | FieldKind::Relation(_) => Ok(None),
    }
}

/// 단일 컬럼 조건
fn single(
    column: &str,
    suffix: Suffix,
    plan: &FieldPlan,
    value: &FieldValue,
) -> Result<Option<Fragment>> {
    // 필드 값과 무관하게 IS NULL / IS NOT NULL
    if suffix.is_null_check() {
        return Ok(Some(Fragment::bare(format!("{}{}", column, suffix.sql_op()))));
    }

    match suffix {
        Suffix::In | Suffix::NotIn => {
            let FieldValue::List(items) = value else {
                return Err(shape(plan, suffix, "a collection"));
            };
            if items.is_empty() {
                // IN (null): 항상 거짓, NOT IN (): 조건 없음
                return Ok((suffix == Suffix::In)
                    .then(|| Fragment::bare(format!("{}{}(null)", column, suffix.sql_op()))));
            }
            let args = items
                .iter()
                .map(|item| item.to_arg(plan.name, plan.encoding))
                .collect::<Result<Vec<_>>>()?;
            Ok(Some(Fragment::new(
                format!("{}{}{}", column, suffix.sql_op(), placeholders(args.len())),
                args,
            )))
        }
        Suffix::Like => {
            let FieldValue::Scalar(Value::String(text)) = value else {
                return Err(shape(plan, suffix, "a string"));
            };
            Ok(Some(Fragment::new(
                format!("{}{}?", column, suffix.sql_op()),
                vec![Value::String(escape_like(text))],
            )))
        }
        _ => {
            if matches!(value, FieldValue::List(_) | FieldValue::Struct(_)) {
                return Err(shape(plan, suffix, "a single value"));
            }
            Ok(Some(Fragment::new(
                format!("{}{}?", column, suffix.sql_op()),
                vec![value.to_arg(plan.name, plan.encoding)?],
            )))
        }
    }
}

/// `(a = ? OR b = ?)`: 같은 값을 멤버마다 반복 바인딩
fn or_group(
    members: &[(String, Suffix)],
    plan: &FieldPlan,
    value: &FieldValue,
) -> Result<Option<Fragment>> {
    let mut parts = Vec::with_capacity(members.len());
    let mut args = Vec::new();
    for (column, suffix) in members {
        if let Some(fragment) = single(column, *suffix, plan, value)? {
            parts.push(fragment.sql);
            args.extend(fragment.args);
        }
    }
    Ok(match parts.len() {
        0 => None,
        1 => Some(Fragment::new(parts.remove(0), args)),
        _ => Some(Fragment::new(format!("({})", parts.join(" OR ")), args)),
    })
}

/// 사용자 정의 조각
///
/// 자리표시자 수와 길이가 같은 컬렉션은 원소를 순서대로, 그 외에는
/// 같은 값을 자리표시자마다 반복해서 바인딩합니다.
fn custom(template: &str, plan: &FieldPlan, value: &FieldValue) -> Result<Option<Fragment>> {
    let count = template.matches('?').count();
    if count == 0 {
        return Ok(Some(Fragment::bare(template)));
    }

    let args = match value {
        FieldValue::List(items) if items.len() == count => items
            .iter()
            .map(|item| item.to_arg(plan.name, plan.encoding))
            .collect::<Result<Vec<_>>>()?,
        _ => {
            let arg = value.to_arg(plan.name, plan.encoding)?;
            vec![arg; count]
        }
    };
    Ok(Some(Fragment::new(template, args)))
}

/// 중첩 서브쿼리
///
/// `column IN (SELECT s0 FROM f0 WHERE w0 IN (SELECT s1 FROM f1 WHERE w1 <op>))`
fn nested(
    queries: &NestedQueries,
    suffix: Suffix,
    plan: &FieldPlan,
    value: &FieldValue,
) -> Result<Option<Fragment>> {
    let Some(last) = queries.levels.last() else {
        return Ok(None);
    };

    let mut args = Vec::new();
    let mut inner = level_head(last.select.as_str(), &last.from, last.extra.as_deref());
    if queries.append_where {
        let column = last.r#where.as_deref().unwrap_or(&plan.column);
        let Some(tail) = single(column, suffix, plan, value)? else {
            return Ok(None);
        };
        inner = format!("{} WHERE {}", inner, tail.sql);
        args = tail.args;
    }

    let count = queries.levels.len();
    for i in (0..count - 1).rev() {
        let level = &queries.levels[i];
        let next = &queries.levels[i + 1];
        let column = level.r#where.as_deref().unwrap_or(&next.select);
        inner = format!(
            "{} WHERE {} IN ({})",
            level_head(&level.select, &level.from, level.extra.as_deref()),
            column,
            inner
        );
    }

    Ok(Some(Fragment::new(
        format!("{} IN ({})", queries.column, inner),
        args,
    )))
}

fn level_head(select: &str, from: &str, extra: Option<&str>) -> String {
    match extra {
        Some(extra) => format!("SELECT {} FROM {} {}", select, from, extra),
        None => format!("SELECT {} FROM {}", select, from),
    }
}

/// 조인 테이블 경로 필터
///
/// 값은 필드 이름이 가리키는 끝 도메인의 식별자입니다. 필드 이름이 마지막
/// 도메인만 포함하면 경로를 뒤집습니다.
fn domain_path(
    path: &DomainPath,
    suffix: Suffix,
    plan: &FieldPlan,
    value: &FieldValue,
    config: &SqlConfig,
) -> Result<Option<Fragment>> {
    let (Some(first), Some(last)) = (path.domains.first(), path.domains.last()) else {
        return Ok(None);
    };
    let reverse = !plan.name.contains(first.as_str()) && plan.name.contains(last.as_str());
    let expanded = path.expand(config, reverse);
    let n = expanded.join_tables.len();

    let Some(tail) = single(&expanded.join_ids[0], suffix, plan, value)? else {
        return Ok(None);
    };

    let mut inner = format!(
        "SELECT {} FROM {} WHERE {}",
        expanded.join_ids[1], expanded.join_tables[0], tail.sql
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

    Ok(Some(Fragment::new(format!("id IN ({})", inner), tail.args)))
}

fn shape(plan: &FieldPlan, suffix: Suffix, expected: &'static str) -> Error {
    Error::ValueShape {
        field: plan.name.to_string(),
        operator: suffix.to_string(),
        expected,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use sift_core::metadata::NestedQuery;
    use sift_core::reflect::EnumEncoding;

    use super::*;

    fn plan(name: &'static str, column: &str, kind: FieldKind) -> FieldPlan {
        FieldPlan {
            name,
            column: column.to_string(),
            kind,
            encoding: EnumEncoding::Ordinal,
        }
    }

    fn scalar(value: impl Into<Value>) -> FieldValue {
        FieldValue::Scalar(value.into())
    }

    fn compile_default(plan: &FieldPlan, value: &FieldValue) -> Option<Fragment> {
        compile(plan, value, &SqlConfig::default()).unwrap()
    }

    #[rstest]
    #[case(Suffix::Eq, "age = ?")]
    #[case(Suffix::Not, "age != ?")]
    #[case(Suffix::Gt, "age > ?")]
    #[case(Suffix::Ge, "age >= ?")]
    #[case(Suffix::Lt, "age < ?")]
    #[case(Suffix::Le, "age <= ?")]
    fn test_comparison_operators(#[case] suffix: Suffix, #[case] expected: &str) {
        let fragment = compile_default(&plan("age", "age", FieldKind::Simple(suffix)), &scalar(30))
            .unwrap();
        assert_eq!(fragment.sql, expected);
        assert_eq!(fragment.args, vec![Value::from(30)]);
    }

    #[test]
    fn test_absent_and_false_flag_are_omitted() {
        let p = plan("valid", "valid", FieldKind::Simple(Suffix::Eq));
        assert!(compile_default(&p, &FieldValue::Absent).is_none());
        assert!(compile_default(&p, &FieldValue::Flag(false)).is_none());
        assert_eq!(
            compile_default(&p, &scalar(false)).unwrap().args,
            vec![Value::Bool(false)]
        );
    }

    #[test]
    fn test_null_checks_ignore_field_value() {
        let p = plan("memoNull", "memo", FieldKind::Simple(Suffix::Null));
        assert_eq!(
            compile_default(&p, &FieldValue::Flag(true)).unwrap(),
            Fragment::bare("memo IS NULL")
        );
        assert_eq!(
            compile_default(&p, &scalar(false)).unwrap(),
            Fragment::bare("memo IS NULL")
        );
        assert!(compile_default(&p, &FieldValue::Flag(false)).is_none());

        let p = plan("memoNotNull", "memo", FieldKind::Simple(Suffix::NotNull));
        assert_eq!(
            compile_default(&p, &scalar(true)).unwrap(),
            Fragment::bare("memo IS NOT NULL")
        );
    }

    #[test]
    fn test_in_and_not_in() {
        let list = FieldValue::List(vec![scalar(1), scalar(2), scalar(3)]);
        let p = plan("idIn", "id", FieldKind::Simple(Suffix::In));
        let fragment = compile_default(&p, &list).unwrap();
        assert_eq!(fragment.sql, "id IN (?, ?, ?)");
        assert_eq!(fragment.args.len(), 3);

        let empty = FieldValue::List(vec![]);
        assert_eq!(compile_default(&p, &empty).unwrap(), Fragment::bare("id IN (null)"));

        let p = plan("idNotIn", "id", FieldKind::Simple(Suffix::NotIn));
        assert!(compile_default(&p, &empty).is_none());
        assert_eq!(compile_default(&p, &list).unwrap().sql, "id NOT IN (?, ?, ?)");
    }

    #[test]
    fn test_in_requires_collection() {
        let p = plan("idIn", "id", FieldKind::Simple(Suffix::In));
        let err = compile(&p, &scalar(1), &SqlConfig::default()).unwrap_err();
        assert_eq!(err.code(), "VALUE_SHAPE");
        assert_eq!(
            err.to_string(),
            "field `idIn` with operator In expects a collection"
        );

        let p = plan("id", "id", FieldKind::Simple(Suffix::Eq));
        let err = compile(&p, &FieldValue::List(vec![scalar(1)]), &SqlConfig::default())
            .unwrap_err();
        assert_eq!(err.code(), "VALUE_SHAPE");
    }

    #[test]
    fn test_like_escapes_wildcards() {
        let p = plan("nameLike", "name", FieldKind::Simple(Suffix::Like));
        let fragment = compile_default(&p, &scalar("_x%")).unwrap();
        assert_eq!(fragment.sql, "name LIKE ?");
        assert_eq!(fragment.args, vec![Value::from("%\\_x\\%%")]);
    }

    #[test]
    fn test_enum_encoding() {
        let level = FieldValue::Variant {
            index: 1,
            name: "Vip",
        };
        let mut p = plan("userLevel", "userLevel", FieldKind::Simple(Suffix::Eq));
        assert_eq!(compile_default(&p, &level).unwrap().args, vec![Value::from(1)]);
        p.encoding = EnumEncoding::Name;
        assert_eq!(compile_default(&p, &level).unwrap().args, vec![Value::from("Vip")]);
    }

    #[test]
    fn test_or_group_repeats_value() {
        let p = plan(
            "usernameOrEmailOrMobile",
            "usernameOrEmailOrMobile",
            FieldKind::OrGroup(vec![
                ("username".to_string(), Suffix::Eq),
                ("email".to_string(), Suffix::Eq),
                ("mobile".to_string(), Suffix::Eq),
            ]),
        );
        let fragment = compile_default(&p, &scalar("test")).unwrap();
        assert_eq!(fragment.sql, "(username = ? OR email = ? OR mobile = ?)");
        assert_eq!(fragment.args, vec![Value::from("test"); 3]);
    }

    #[test]
    fn test_custom_fragment() {
        let p = plan(
            "account",
            "account",
            FieldKind::Custom("(username = ? OR email = ? OR mobile = ?)".to_string()),
        );
        let fragment = compile_default(&p, &scalar("f0rb")).unwrap();
        assert_eq!(fragment.sql, "(username = ? OR email = ? OR mobile = ?)");
        assert_eq!(fragment.args, vec![Value::from("f0rb"); 3]);

        let p = plan(
            "scoreBetween",
            "scoreBetween",
            FieldKind::Custom("score BETWEEN ? AND ?".to_string()),
        );
        let fragment =
            compile_default(&p, &FieldValue::List(vec![scalar(60), scalar(90)])).unwrap();
        assert_eq!(fragment.args, vec![Value::from(60), Value::from(90)]);

        let p = plan(
            "deleted",
            "deleted",
            FieldKind::Custom("deleteTime IS NOT NULL".to_string()),
        );
        assert_eq!(
            compile_default(&p, &scalar(false)).unwrap(),
            Fragment::bare("deleteTime IS NOT NULL")
        );
        assert!(compile_default(&p, &FieldValue::Flag(false)).is_none());
    }

    #[test]
    fn test_sub_query() {
        let p = plan(
            "roleId",
            "roleId",
            FieldKind::SubQuery {
                select: "userId".to_string(),
                from: "t_user_and_role".to_string(),
                suffix: Suffix::Eq,
            },
        );
        let fragment = compile_default(&p, &scalar(1)).unwrap();
        assert_eq!(
            fragment.sql,
            "id IN (SELECT userId FROM t_user_and_role WHERE roleId = ?)"
        );
        assert_eq!(fragment.args, vec![Value::from(1)]);
    }

    #[test]
    fn test_nested_levels() {
        let queries = NestedQueries::new(vec![
            NestedQuery::new("permId", "t_role_and_perm"),
            NestedQuery::new("roleId", "t_user_and_role"),
        ]);
        let p = plan(
            "userId",
            "userId",
            FieldKind::Nested {
                queries: queries.clone(),
                suffix: Suffix::Eq,
            },
        );
        let fragment = compile_default(&p, &scalar(1)).unwrap();
        assert_eq!(
            fragment.sql,
            "id IN (SELECT permId FROM t_role_and_perm WHERE roleId IN \
             (SELECT roleId FROM t_user_and_role WHERE userId = ?))"
        );

        let gate = plan(
            "validUser",
            "validUser",
            FieldKind::Nested {
                queries: queries.without_where(),
                suffix: Suffix::Eq,
            },
        );
        let fragment = compile_default(&gate, &FieldValue::Flag(true)).unwrap();
        assert_eq!(
            fragment.sql,
            "id IN (SELECT permId FROM t_role_and_perm WHERE roleId IN \
             (SELECT roleId FROM t_user_and_role))"
        );
        assert!(fragment.args.is_empty());
        assert!(compile_default(&gate, &FieldValue::Flag(false)).is_none());
        assert_eq!(compile_default(&gate, &scalar(false)).unwrap().sql, fragment.sql);
    }

    #[test]
    fn test_domain_path_filter() {
        let p = plan(
            "userIdIn",
            "userId",
            FieldKind::DomainPath {
                path: DomainPath::new(["user", "role", "perm"]),
                suffix: Suffix::In,
            },
        );
        let fragment =
            compile_default(&p, &FieldValue::List(vec![scalar(1), scalar(2)])).unwrap();
        assert_eq!(
            fragment.sql,
            "id IN (SELECT permId FROM t_role_and_perm WHERE roleId IN \
             (SELECT roleId FROM t_user_and_role WHERE userId IN (?, ?)))"
        );
        assert_eq!(fragment.args, vec![Value::from(1), Value::from(2)]);
    }

    #[test]
    fn test_domain_path_filter_reversed() {
        let p = plan(
            "permId",
            "permId",
            FieldKind::DomainPath {
                path: DomainPath::new(["user", "role", "perm"]),
                suffix: Suffix::Eq,
            },
        );
        let fragment = compile_default(&p, &scalar(7)).unwrap();
        assert_eq!(
            fragment.sql,
            "id IN (SELECT userId FROM t_user_and_role WHERE roleId IN \
             (SELECT roleId FROM t_role_and_perm WHERE permId = ?))"
        );
    }
}
