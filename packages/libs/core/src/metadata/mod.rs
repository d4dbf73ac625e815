//! 타입 메타데이터
//!
//! 조건/엔티티 타입별 디스크립터를 한 번 만들어 프로세스 수명 동안 공유합니다.
//!
//! # 모듈 구조
//!
//! - `annotation`: 필드 어노테이션 등록 테이블
//! - `relation`: 도메인 경로, 관계, 중첩 서브쿼리 정의
//! - `template`: `${field}` / `#{field}` 템플릿
//! - `descriptor`: 필드 계획과 디스크립터 생성

mod annotation;
mod descriptor;
mod relation;
mod template;

use std::any::TypeId;
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use tracing::debug;

use crate::config::SqlConfig;
use crate::criteria::{Criteria, Entity};
use crate::error::Result;

pub use annotation::{Annotation, Annotations};
pub use descriptor::{Descriptor, DescriptorKind, FieldKind, FieldPlan, IdPlan};
pub use relation::{Cardinality, DomainPath, ExpandedPath, NestedQueries, NestedQuery, Relation};
pub use template::Template;

/// 캐시 키: 타입, 종류, camelCase 변환 여부
type CacheKey = (TypeId, DescriptorKind, bool);

static DESCRIPTORS: LazyLock<DashMap<CacheKey, Arc<Descriptor>>> = LazyLock::new(DashMap::new);

impl Descriptor {
    /// 조건 타입 디스크립터 (캐시)
    pub fn for_criteria<Q: Criteria>(config: &SqlConfig) -> Result<Arc<Descriptor>> {
        cached::<Q>(DescriptorKind::Criteria, config.map_camel_case, || {
            Descriptor::build_criteria::<Q>(config.map_camel_case)
        })
    }

    /// 엔티티 타입 디스크립터 (캐시)
    pub fn for_entity<E: Entity>(config: &SqlConfig) -> Result<Arc<Descriptor>> {
        cached::<E>(DescriptorKind::Entity, config.map_camel_case, || {
            Descriptor::build_entity::<E>(config.map_camel_case)
        })
    }
}

/// 캐시 조회, 없으면 생성 후 삽입
///
/// 경합 시 중복 생성은 허용하고 먼저 삽입된 값을 사용합니다.
/// 생성 실패는 캐시하지 않습니다.
fn cached<T: 'static>(
    kind: DescriptorKind,
    map_camel_case: bool,
    build: impl FnOnce() -> Result<Descriptor>,
) -> Result<Arc<Descriptor>> {
    let key = (TypeId::of::<T>(), kind, map_camel_case);
    if let Some(found) = DESCRIPTORS.get(&key) {
        return Ok(Arc::clone(found.value()));
    }

    let built = Arc::new(build()?);
    debug!(
        type_name = built.type_name,
        kind = ?kind,
        fields = built.fields.len(),
        "descriptor built"
    );
    Ok(Arc::clone(DESCRIPTORS.entry(key).or_insert(built).value()))
}

#[cfg(test)]
mod tests {
    use std::thread;

    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::page::PageQuery;

    #[derive(Serialize, Deserialize, Default)]
    #[serde(rename_all = "camelCase")]
    struct CachedQuery {
        #[serde(skip)]
        page: PageQuery,
        name_like: Option<String>,
        created_at_gt: Option<String>,
    }

    impl Criteria for CachedQuery {
        fn table() -> &'static str {
            "t_cached"
        }

        fn page(&self) -> &PageQuery {
            &self.page
        }
    }

    #[test_log::test]
    fn test_descriptor_is_cached() {
        let config = SqlConfig::default();
        let first = Descriptor::for_criteria::<CachedQuery>(&config).unwrap();
        let second = Descriptor::for_criteria::<CachedQuery>(&config).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_camel_toggle_is_part_of_key() {
        let plain = Descriptor::for_criteria::<CachedQuery>(&SqlConfig::default()).unwrap();
        let camel = Descriptor::for_criteria::<CachedQuery>(
            &SqlConfig::default().with_map_camel_case(true),
        )
        .unwrap();
        assert_eq!(plain.field("createdAtGt").unwrap().column, "createdAt");
        assert_eq!(camel.field("createdAtGt").unwrap().column, "created_at");
    }

    #[test]
    fn test_concurrent_population() {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                thread::spawn(|| {
                    Descriptor::for_criteria::<CachedQuery>(&SqlConfig::default())
                        .map(|d| d.fields.len())
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), 2);
        }
    }
}
