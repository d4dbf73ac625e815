//! 테이블/조인 템플릿
//!
//! - 테이블: `user${tenant}` → 필드 값으로 치환된 테이블 이름
//! - 조인: `LEFT JOIN user_and_role ur ON ur.roleId = #{roleId}` → `?` + 바인딩 인자

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::reflect::{EnumEncoding, FieldValue, Fields};

static PTN_TABLE_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{(\w+)\}").expect("valid table template pattern"));
static PTN_JOIN_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\{(\w+)\}").expect("valid join template pattern"));

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(String),
}

/// 파싱된 템플릿
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    /// `${field}` 테이블 템플릿
    pub fn table(source: &str) -> Result<Self> {
        Self::parse(source, &PTN_TABLE_FIELD, "${")
    }

    /// `#{field}` 조인 템플릿
    pub fn join(source: &str) -> Result<Self> {
        Self::parse(source, &PTN_JOIN_FIELD, "#{")
    }

    fn parse(source: &str, pattern: &Regex, opener: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut last = 0;
        for caps in pattern.captures_iter(source) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if whole.start() > last {
                segments.push(Segment::Literal(source[last..whole.start()].to_string()));
            }
            segments.push(Segment::Field(name.as_str().to_string()));
            last = whole.end();
        }
        if last < source.len() {
            segments.push(Segment::Literal(source[last..].to_string()));
        }

        let unclosed = segments.iter().any(|s| match s {
            Segment::Literal(text) => text.contains(opener),
            Segment::Field(_) => false,
        });
        if unclosed {
            return Err(Error::InvalidTemplate {
                template: source.to_string(),
                reason: format!("unterminated `{}` placeholder", opener),
            });
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_dynamic(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::Field(_)))
    }

    /// 템플릿이 참조하는 필드 이름
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Field(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    pub fn references(&self, field: &str) -> bool {
        self.field_names().any(|name| name == field)
    }

    /// 필드 값을 문자열로 치환 (공백 제거)
    ///
    /// 치환 값은 SQL 텍스트에 그대로 들어가므로 `[A-Za-z0-9_]`만 허용합니다.
    pub fn render(&self, fields: &Fields) -> Result<String> {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(name) => {
                    let text = self.text_value(name, fields.get(name))?;
                    let text: String = text.chars().filter(|c| !c.is_whitespace()).collect();
                    if !text.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                        return Err(Error::InvalidTemplateValue {
                            template: self.source.clone(),
                            field: name.clone(),
                        });
                    }
                    out.push_str(&text);
                }
            }
        }
        Ok(out)
    }

    /// 필드 자리를 `?`로 바꾸고 값을 순서대로 바인딩
    pub fn bind(&self, fields: &Fields, args: &mut Vec<Value>) -> Result<String> {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(name) => {
                    let value = fields.get(name);
                    if value.is_absent() {
                        return Err(self.missing(name));
                    }
                    args.push(value.to_arg(name, EnumEncoding::Ordinal)?);
                    out.push('?');
                }
            }
        }
        Ok(out)
    }

    fn text_value(&self, name: &str, value: &FieldValue) -> Result<String> {
        match value.to_json(name, EnumEncoding::Name)? {
            Value::Null => Err(self.missing(name)),
            Value::String(s) => Ok(s),
            other => Ok(other.to_string()),
        }
    }

    fn missing(&self, field: &str) -> Error {
        Error::MissingTemplateValue {
            template: self.source.clone(),
            field: field.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::*;
    use crate::reflect::read_fields;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Tenant {
        tenant_id: Option<String>,
        role_id: Option<i64>,
    }

    #[test]
    fn test_static_table() {
        let template = Template::table("t_user").unwrap();
        assert!(!template.is_dynamic());
        let fields = read_fields(&Tenant {
            tenant_id: None,
            role_id: None,
        })
        .unwrap();
        assert_eq!(template.render(&fields).unwrap(), "t_user");
    }

    #[test]
    fn test_dynamic_table_strips_spaces() {
        let template = Template::table("t_user_${tenantId}").unwrap();
        assert!(template.references("tenantId"));
        let fields = read_fields(&Tenant {
            tenant_id: Some(" acme co ".to_string()),
            role_id: None,
        })
        .unwrap();
        assert_eq!(template.render(&fields).unwrap(), "t_user_acmeco");
    }

    #[test]
    fn test_missing_table_value() {
        let template = Template::table("t_user_${tenantId}").unwrap();
        let fields = read_fields(&Tenant {
            tenant_id: None,
            role_id: None,
        })
        .unwrap();
        let err = template.render(&fields).unwrap_err();
        assert_eq!(err.code(), "MISSING_TEMPLATE_VALUE");
    }

    #[test]
    fn test_dynamic_table_rejects_non_identifier() {
        let template = Template::table("t_user_${tenantId}").unwrap();
        for value in ["x;DROP/**/TABLE/**/y", "a-b", "a.b", "x'--"] {
            let fields = read_fields(&Tenant {
                tenant_id: Some(value.to_string()),
                role_id: None,
            })
            .unwrap();
            let err = template.render(&fields).unwrap_err();
            assert_eq!(err.code(), "INVALID_TEMPLATE_VALUE");
        }

        let fields = read_fields(&Tenant {
            tenant_id: Some("acme_01".to_string()),
            role_id: None,
        })
        .unwrap();
        assert_eq!(template.render(&fields).unwrap(), "t_user_acme_01");
    }

    #[test]
    fn test_unterminated_placeholder() {
        assert!(Template::table("t_user_${tenantId").is_err());
        assert!(Template::join("JOIN r ON r.id = #{roleId").is_err());
    }

    #[test]
    fn test_join_binding() {
        let template = Template::join("LEFT JOIN user_and_role ur ON ur.roleId = #{roleId}").unwrap();
        let fields = read_fields(&Tenant {
            tenant_id: None,
            role_id: Some(2),
        })
        .unwrap();
        let mut args = Vec::new();
        let sql = template.bind(&fields, &mut args).unwrap();
        assert_eq!(sql, "LEFT JOIN user_and_role ur ON ur.roleId = ?");
        assert_eq!(args, vec![Value::from(2)]);
    }
}
