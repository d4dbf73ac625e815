//! 조건/엔티티 트레이트
//!
//! 빌더에 넘기는 타입이 구현하는 트레이트입니다. 필드 이름과 값은 serde로
//! 읽고, 이름 규칙으로 표현할 수 없는 의미는 `annotate`에서 등록합니다.
//!
//! ```ignore
//! #[derive(Serialize, Deserialize, Default)]
//! #[serde(rename_all = "camelCase")]
//! struct UserQuery {
//!     #[serde(skip)]
//!     page: PageQuery,
//!     username_or_email_like: Option<String>,
//!     role_id: Option<i64>,
//! }
//!
//! impl Criteria for UserQuery {
//!     fn table() -> &'static str { "user" }
//!     fn page(&self) -> &PageQuery { &self.page }
//!     fn annotate(a: &mut Annotations) {
//!         a.sub_query("roleId", "userId", "t_user_and_role");
//!     }
//! }
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::metadata::Annotations;
use crate::page::PageQuery;

/// 조건 객체
///
/// 페이지 정보는 조건 필드가 아니므로 `#[serde(skip)]`로 두고
/// `page()`로 노출합니다.
pub trait Criteria: Serialize + DeserializeOwned + 'static {
    /// 테이블 이름 (`${field}` 템플릿 가능)
    fn table() -> &'static str;

    fn page(&self) -> &PageQuery;

    /// 조인 절 (`#{field}` 자리는 바인딩 인자)
    fn join() -> Option<&'static str> {
        None
    }

    /// GROUP BY 컬럼 목록
    fn group_by() -> Option<&'static str> {
        None
    }

    fn annotate(_annotations: &mut Annotations) {}
}

/// 엔티티
pub trait Entity: Serialize + DeserializeOwned + 'static {
    /// 테이블 이름 (`${field}` 템플릿 가능)
    fn table() -> &'static str;

    fn annotate(_annotations: &mut Annotations) {}
}

/// by-id 빌더의 식별자 인자
///
/// 구조체 래퍼는 동적 테이블 템플릿이 참조하는 필드를 함께 가질 수 있습니다.
pub trait IdWrapper: Serialize {
    fn id(&self) -> Value;
}

macro_rules! impl_id_wrapper {
    ($($ty:ty),*) => {
        $(
            impl IdWrapper for $ty {
                fn id(&self) -> Value {
                    Value::from(self.clone())
                }
            }
        )*
    };
}

impl_id_wrapper!(i32, i64, u32, u64, String);

impl IdWrapper for str {
    fn id(&self) -> Value {
        Value::from(self)
    }
}

impl<T: IdWrapper + ?Sized> IdWrapper for &T {
    fn id(&self) -> Value {
        (**self).id()
    }
}
