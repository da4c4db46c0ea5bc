//! 테넌트 토큰 처리.
//!
//! 토큰은 `tenantId-ingestionKey` 형식이며, 레코드에는 앞부분의
//! 테넌트 ID만 보고한다. 토큰 전체 파싱은 수집 단계의 몫이다.

/// 토큰에서 테넌트 ID(첫 `-` 이전)를 추출
pub fn tenant_id_of(token: &str) -> &str {
    match token.find('-') {
        Some(idx) => &token[..idx],
        None => token,
    }
}
