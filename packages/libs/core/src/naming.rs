//! 이름 규칙 유틸리티
//!
//! 프로퍼티 이름 → 컬럼 이름 변환, OR 그룹 분리, LIKE 이스케이프 등
//! 필드 이름 규칙에서 공통으로 쓰는 순수 함수들입니다.

/// camelCase 프로퍼티 이름을 컬럼 이름으로 변환
///
/// `map_camel_case`가 꺼져 있으면 이름을 그대로 사용합니다.
pub fn to_column(name: &str, map_camel_case: bool) -> String {
    if map_camel_case {
        camel_to_snake(name)
    } else {
        name.to_string()
    }
}

/// `createTime` → `create_time`
pub fn camel_to_snake(camel: &str) -> String {
    let mut out = String::with_capacity(camel.len() + 4);
    for ch in camel.chars() {
        if ch.is_ascii_uppercase() {
            out.push('_');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// 첫 글자를 소문자로 (`Email` → `email`)
pub fn camelize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// 대문자 앞의 `Or`를 기준으로 이름을 분리
///
/// `usernameOrEmailOrMobile` → `["username", "email", "mobile"]`.
/// `authorOrder`처럼 `Or` 뒤가 소문자인 경우는 분리하지 않습니다.
pub fn split_by_or(name: &str) -> Vec<String> {
    let bytes = name.as_bytes();
    let mut parts = Vec::new();
    let mut start = 0;
    let mut i = 1;

    while i + 2 < bytes.len() {
        if bytes[i] == b'O' && bytes[i + 1] == b'r' && bytes[i + 2].is_ascii_uppercase() && i > start {
            parts.push(&name[start..i]);
            start = i + 2;
            i = start + 1;
        } else {
            i += 1;
        }
    }
    parts.push(&name[start..]);

    parts
        .into_iter()
        .enumerate()
        .map(|(idx, part)| if idx == 0 { part.to_string() } else { camelize(part) })
        .collect()
}

/// LIKE 값 이스케이프 후 `%...%`로 감싸기
///
/// 값에 포함된 `%`, `_`는 와일드카드로 해석되지 않도록 `\`를 붙입니다.
/// 공백뿐인 값은 그대로 돌려줍니다.
pub fn escape_like(value: &str) -> String {
    if value.trim().is_empty() {
        return value.to_string();
    }
    let mut out = String::with_capacity(value.len() + 4);
    out.push('%');
    for ch in value.chars() {
        if ch == '%' || ch == '_' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('%');
    out
}

/// `{}` 자리표시자를 순서대로 치환
pub fn apply_format(format: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(format.len() + 16);
    let mut rest = format;
    let mut args = args.iter();
    while let Some(pos) = rest.find("{}") {
        out.push_str(&rest[..pos]);
        if let Some(arg) = args.next() {
            out.push_str(arg);
        }
        rest = &rest[pos + 2..];
    }
    out.push_str(rest);
    out
}

/// `(?, ?, ?)` 형태의 자리표시자 목록, 비어 있으면 `(null)`
pub fn placeholders(size: usize) -> String {
    if size == 0 {
        return "(null)".to_string();
    }
    let mut out = String::with_capacity(size * 3 + 1);
    out.push('(');
    for i in 0..size {
        if i > 0 {
            out.push_str(", ");
        }
        out.push('?');
    }
    out.push(')');
    out
}
