//! 페이지/정렬 요청
//!
//! 모든 조건 객체가 공유하는 페이지 번호, 페이지 크기, 정렬식입니다.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::naming::to_column;

/// 페이지 번호만 지정된 경우의 기본 페이지 크기
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// `field` 또는 `field,asc|desc`
static PTN_SORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([A-Za-z_][\w.]*)(?:,(asc|desc))?$").expect("valid sort pattern")
});

/// 페이지 요청
///
/// 페이지 번호는 0부터 시작합니다. 번호나 크기 중 하나라도 지정되고
/// 실제 크기가 0보다 클 때만 페이징이 적용됩니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    #[serde(default)]
    pub page_number: Option<u32>,

    #[serde(default)]
    pub page_size: Option<u32>,

    /// 정렬식 (`id,desc;createTime,asc`)
    #[serde(default)]
    pub sort: Option<String>,
}

impl PageQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page_number: u32, page_size: u32) -> Self {
        self.page_number = Some(page_number);
        self.page_size = Some(page_size);
        self
    }

    pub fn sorted(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// 실제 페이지 크기
    pub fn effective_page_size(&self) -> u32 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    /// 페이징 필요 여부
    pub fn need_paging(&self) -> bool {
        (self.page_number.is_some() || self.page_size.is_some()) && self.effective_page_size() > 0
    }

    /// `page_number * page_size`
    pub fn calc_offset(&self) -> u64 {
        u64::from(self.page_number.unwrap_or(0)) * u64::from(self.effective_page_size())
    }

    /// ORDER BY 본문 생성
    ///
    /// `;`로 구분된 각 구간은 `field[,asc|desc]` 형식이어야 하며
    /// 그 외의 텍스트는 주입 방지를 위해 거부합니다.
    pub fn order_by(&self, map_camel_case: bool) -> Result<Option<String>> {
        let Some(sort) = self.sort.as_deref() else {
            return Ok(None);
        };
        if sort.trim().is_empty() {
            return Ok(None);
        }

        let mut items = Vec::new();
        for segment in sort.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            let caps = PTN_SORT.captures(segment).ok_or_else(|| Error::InvalidSort {
                segment: segment.to_string(),
            })?;
            let column = to_column(&caps[1], map_camel_case);
            match caps.get(2) {
                Some(direction) => items.push(format!("{} {}", column, direction.as_str())),
                None => items.push(column),
            }
        }

        if items.is_empty() {
            return Ok(None);
        }
        Ok(Some(items.join(", ")))
    }
}
