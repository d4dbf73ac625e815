//! 필드 이름 추출
//!
//! derive된 `Deserialize`는 `deserialize_struct`에 선언된 필드 이름 목록을
//! 넘깁니다. 인스턴스 없이 타입만으로 필드 목록을 얻기 위해 그 목록만
//! 가로채고 즉시 중단하는 `Deserializer`를 사용합니다.

use serde::de::{self, DeserializeOwned, Deserializer, Visitor};
use serde::forward_to_deserialize_any;

/// 타입의 필드 이름 목록 (선언 순서, `#[serde(skip)]` 제외)
///
/// 구조체가 아니면 `None`입니다.
pub fn field_names<T: DeserializeOwned>() -> Option<&'static [&'static str]> {
    let mut fields = None;
    // 필드 목록을 얻은 뒤에는 항상 에러로 중단되므로 결과는 무시
    let _ = T::deserialize(Introspector {
        fields: &mut fields,
    });
    fields
}

struct Introspector<'a> {
    fields: &'a mut Option<&'static [&'static str]>,
}

impl<'de, 'a> Deserializer<'de> for Introspector<'a> {
    type Error = de::value::Error;

    fn deserialize_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Self::Error> {
        Err(de::Error::custom("not a struct"))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, Self::Error> {
        *self.fields = Some(fields);
        Err(de::Error::custom("introspected"))
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map enum identifier ignored_any
    }
}
