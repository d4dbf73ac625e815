//! 필드 값 읽기
//!
//! 객체를 `FieldValue` 트리로 직렬화합니다. JSON으로 바로 직렬화하면
//! `bool`과 `Option<bool>`, enum 순번이 구분되지 않기 때문에 전용
//! `Serializer`를 사용합니다.

use std::fmt::Display;

use serde::ser::{self, Impossible, Serialize};
use serde_json::Value;

use super::FieldValue;
use crate::error::{Error, Result};

type ReadResult<T> = std::result::Result<T, ReadError>;

/// 읽기 에러 (serde 내부용)
#[derive(Debug, thiserror::Error)]
enum ReadError {
    #[error("{0}")]
    Custom(String),

    #[error("unsupported value: {0}")]
    Unsupported(&'static str),
}

impl ser::Error for ReadError {
    fn custom<T: Display>(msg: T) -> Self {
        ReadError::Custom(msg.to_string())
    }
}

/// 읽어 들인 구조체 필드 목록 (선언 순서)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields {
    pub type_name: &'static str,
    entries: Vec<(&'static str, FieldValue)>,
}

impl Fields {
    /// 필드 값 조회 (없으면 `Absent`)
    pub fn get(&self, name: &str) -> &FieldValue {
        const ABSENT: &FieldValue = &FieldValue::Absent;
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
            .unwrap_or(ABSENT)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.entries.iter().map(|(n, v)| (*n, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 구조체의 필드 값을 선언 순서대로 읽기
///
/// 개별 필드의 직렬화 실패는 경고 로그 후 `Absent`로 처리되며
/// 전체 읽기를 중단하지 않습니다.
pub fn read_fields<T: Serialize + ?Sized>(value: &T) -> Result<Fields> {
    let type_name = std::any::type_name::<T>();
    match value.serialize(FieldReader::default()) {
        Ok(FieldValue::Struct(entries)) => Ok(Fields { type_name, entries }),
        Ok(_) | Err(ReadError::Unsupported(_)) => Err(Error::NotAStruct { type_name }),
        Err(ReadError::Custom(message)) => Err(Error::Read { type_name, message }),
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct FieldReader {
    /// `Option::Some` 내부 여부
    optional: bool,
}

impl ser::Serializer for FieldReader {
    type Ok = FieldValue;
    type Error = ReadError;

    type SerializeSeq = SeqReader;
    type SerializeTuple = SeqReader;
    type SerializeTupleStruct = SeqReader;
    type SerializeTupleVariant = Impossible<FieldValue, ReadError>;
    type SerializeMap = Impossible<FieldValue, ReadError>;
    type SerializeStruct = StructReader;
    type SerializeStructVariant = Impossible<FieldValue, ReadError>;

    fn serialize_bool(self, v: bool) -> ReadResult<FieldValue> {
        if self.optional {
            Ok(FieldValue::Scalar(Value::Bool(v)))
        } else {
            Ok(FieldValue::Flag(v))
        }
    }

    fn serialize_i8(self, v: i8) -> ReadResult<FieldValue> {
        Ok(FieldValue::Scalar(v.into()))
    }

    fn serialize_i16(self, v: i16) -> ReadResult<FieldValue> {
        Ok(FieldValue::Scalar(v.into()))
    }

    fn serialize_i32(self, v: i32) -> ReadResult<FieldValue> {
        Ok(FieldValue::Scalar(v.into()))
    }

    fn serialize_i64(self, v: i64) -> ReadResult<FieldValue> {
        Ok(FieldValue::Scalar(v.into()))
    }

    fn serialize_i128(self, v: i128) -> ReadResult<FieldValue> {
        i64::try_from(v)
            .map(|v| FieldValue::Scalar(v.into()))
            .map_err(|_| ReadError::Unsupported("i128 out of range"))
    }

    fn serialize_u8(self, v: u8) -> ReadResult<FieldValue> {
        Ok(FieldValue::Scalar(v.into()))
    }

    fn serialize_u16(self, v: u16) -> ReadResult<FieldValue> {
        Ok(FieldValue::Scalar(v.into()))
    }

    fn serialize_u32(self, v: u32) -> ReadResult<FieldValue> {
        Ok(FieldValue::Scalar(v.into()))
    }

    fn serialize_u64(self, v: u64) -> ReadResult<FieldValue> {
        Ok(FieldValue::Scalar(v.into()))
    }

    fn serialize_u128(self, v: u128) -> ReadResult<FieldValue> {
        u64::try_from(v)
            .map(|v| FieldValue::Scalar(v.into()))
            .map_err(|_| ReadError::Unsupported("u128 out of range"))
    }

    fn serialize_f32(self, v: f32) -> ReadResult<FieldValue> {
        Ok(FieldValue::Scalar(f64::from(v).into()))
    }

    fn serialize_f64(self, v: f64) -> ReadResult<FieldValue> {
        Ok(FieldValue::Scalar(v.into()))
    }

    fn serialize_char(self, v: char) -> ReadResult<FieldValue> {
        Ok(FieldValue::Scalar(Value::String(v.to_string())))
    }

    fn serialize_str(self, v: &str) -> ReadResult<FieldValue> {
        Ok(FieldValue::Scalar(Value::String(v.to_string())))
    }

    fn serialize_bytes(self, _v: &[u8]) -> ReadResult<FieldValue> {
        Err(ReadError::Unsupported("bytes"))
    }

    fn serialize_none(self) -> ReadResult<FieldValue> {
        Ok(FieldValue::Absent)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> ReadResult<FieldValue> {
        value.serialize(FieldReader { optional: true })
    }

    fn serialize_unit(self) -> ReadResult<FieldValue> {
        Ok(FieldValue::Absent)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> ReadResult<FieldValue> {
        Ok(FieldValue::Absent)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        variant_index: u32,
        variant: &'static str,
    ) -> ReadResult<FieldValue> {
        Ok(FieldValue::Variant {
            index: variant_index,
            name: variant,
        })
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> ReadResult<FieldValue> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> ReadResult<FieldValue> {
        Err(ReadError::Unsupported("newtype variant"))
    }

    fn serialize_seq(self, len: Option<usize>) -> ReadResult<SeqReader> {
        Ok(SeqReader {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> ReadResult<SeqReader> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> ReadResult<SeqReader> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> ReadResult<Self::SerializeTupleVariant> {
        Err(ReadError::Unsupported("tuple variant"))
    }

    fn serialize_map(self, _len: Option<usize>) -> ReadResult<Self::SerializeMap> {
        Err(ReadError::Unsupported("map"))
    }

    fn serialize_struct(self, name: &'static str, len: usize) -> ReadResult<StructReader> {
        Ok(StructReader {
            name,
            entries: Vec::with_capacity(len),
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> ReadResult<Self::SerializeStructVariant> {
        Err(ReadError::Unsupported("struct variant"))
    }
}

struct SeqReader {
    items: Vec<FieldValue>,
}

impl ser::SerializeSeq for SeqReader {
    type Ok = FieldValue;
    type Error = ReadError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> ReadResult<()> {
        self.items.push(value.serialize(FieldReader::default())?);
        Ok(())
    }

    fn end(self) -> ReadResult<FieldValue> {
        Ok(FieldValue::List(self.items))
    }
}

impl ser::SerializeTuple for SeqReader {
    type Ok = FieldValue;
    type Error = ReadError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> ReadResult<()> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> ReadResult<FieldValue> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SeqReader {
    type Ok = FieldValue;
    type Error = ReadError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> ReadResult<()> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> ReadResult<FieldValue> {
        ser::SerializeSeq::end(self)
    }
}

struct StructReader {
    name: &'static str,
    entries: Vec<(&'static str, FieldValue)>,
}

impl ser::SerializeStruct for StructReader {
    type Ok = FieldValue;
    type Error = ReadError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> ReadResult<()> {
        let value = match value.serialize(FieldReader::default()) {
            Ok(value) => value,
            Err(ReadError::Unsupported(kind)) => FieldValue::Unsupported(kind),
            Err(ReadError::Custom(message)) => {
                tracing::warn!(
                    type_name = self.name,
                    field = key,
                    error = %message,
                    "failed to read field, treating it as absent"
                );
                FieldValue::Absent
            }
        };
        self.entries.push((key, value));
        Ok(())
    }

    fn skip_field(&mut self, key: &'static str) -> ReadResult<()> {
        self.entries.push((key, FieldValue::Absent));
        Ok(())
    }

    fn end(self) -> ReadResult<FieldValue> {
        Ok(FieldValue::Struct(self.entries))
    }
}
