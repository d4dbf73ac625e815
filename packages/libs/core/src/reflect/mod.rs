//! 필드 읽기 ("reflection")
//!
//! serde 데이터 모델을 이용해 조건/엔티티 객체의 필드 이름과 값을 읽습니다.
//!
//! # 모듈 구조
//!
//! - `introspect`: `Deserialize` 구현에서 선언된 필드 이름 목록 추출
//! - `reader`: 값 한 번 읽기용 `Serializer` (bool/Option<bool>, enum 순번 등 보존)

mod introspect;
mod reader;

use serde_json::Value;

use crate::error::{Error, Result};

pub use introspect::field_names;
pub use reader::{read_fields, Fields};

/// enum 값 인코딩 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumEncoding {
    /// 선언 순번 (기본값)
    #[default]
    Ordinal,
    /// variant 이름
    Name,
}

/// 읽어 들인 필드 값
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// `None`, unit, 또는 읽기 실패
    Absent,
    /// `Option`으로 감싸지 않은 `bool`
    Flag(bool),
    /// 숫자, 문자열, `Option<bool>` 등 단일 값
    Scalar(Value),
    /// unit variant enum
    Variant { index: u32, name: &'static str },
    /// 시퀀스/튜플
    List(Vec<FieldValue>),
    /// 중첩 구조체
    Struct(Vec<(&'static str, FieldValue)>),
    /// 바인딩할 수 없는 형태 (map, 데이터를 가진 variant 등)
    Unsupported(&'static str),
}

impl FieldValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }

    /// 단일 바인딩 인자로 변환
    ///
    /// 리스트/구조체는 JSON 문자열로 직렬화해 바인딩합니다.
    pub fn to_arg(&self, field: &str, encoding: EnumEncoding) -> Result<Value> {
        match self {
            FieldValue::List(_) | FieldValue::Struct(_) => {
                Ok(Value::String(self.to_json(field, encoding)?.to_string()))
            }
            other => other.to_json(field, encoding),
        }
    }

    /// JSON 값으로 변환 (enum은 인코딩 방식을 따름)
    pub fn to_json(&self, field: &str, encoding: EnumEncoding) -> Result<Value> {
        Ok(match self {
            FieldValue::Absent => Value::Null,
            FieldValue::Flag(b) => Value::Bool(*b),
            FieldValue::Scalar(v) => v.clone(),
            FieldValue::Variant { index, name } => match encoding {
                EnumEncoding::Ordinal => Value::from(*index),
                EnumEncoding::Name => Value::String((*name).to_string()),
            },
            FieldValue::List(items) => Value::Array(
                items
                    .iter()
                    .map(|item| item.to_json(field, encoding))
                    .collect::<Result<Vec<_>>>()?,
            ),
            FieldValue::Struct(fields) => {
                let mut map = serde_json::Map::with_capacity(fields.len());
                for (name, value) in fields {
                    map.insert((*name).to_string(), value.to_json(field, encoding)?);
                }
                Value::Object(map)
            }
            FieldValue::Unsupported(kind) => {
                return Err(Error::ValueShape {
                    field: field.to_string(),
                    operator: format!("bind({})", kind),
                    expected: "a scalar, enum, sequence or struct value",
                })
            }
        })
    }
}
