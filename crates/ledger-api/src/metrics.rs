//! Prometheus 메트릭 설정 및 유틸리티.
//!
//! HTTP 요청 메트릭과 인증 메트릭을 수집하고 `/metrics` 엔드포인트로 노출합니다.

use axum::extract::MatchedPath;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

/// Prometheus 메트릭 레코더를 설정하고 핸들을 반환합니다.
///
/// # 반환값
///
/// `/metrics` 엔드포인트에서 메트릭을 렌더링하기 위한 `PrometheusHandle`
///
/// # Errors
///
/// 레코더가 이미 설치되어 있으면 `BuildError`
pub fn setup_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
        )?
        .install_recorder()
}

// ============================================================================
// HTTP 메트릭 헬퍼 함수
// ============================================================================

/// HTTP 요청 카운터 증가.
pub fn record_http_request(method: &str, path: &str) {
    counter!("http_requests_total", "method" => method.to_string(), "path" => path.to_string())
        .increment(1);
}

/// HTTP 응답 카운터 증가.
pub fn record_http_response(method: &str, path: &str, status: u16) {
    counter!(
        "http_responses_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// HTTP 요청 지속 시간 기록.
pub fn record_http_duration(method: &str, path: &str, duration_secs: f64) {
    histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_secs);
}

// ============================================================================
// 인증 메트릭 헬퍼 함수
// ============================================================================

/// 게이트 거부 카운터 증가. `reason`은 `AccessDenied::reason()` 값.
pub fn record_access_denied(reason: &'static str) {
    counter!("ledger_auth_denied_total", "reason" => reason).increment(1);
}

/// 게이트 통과 카운터 증가.
pub fn record_access_authorized() {
    counter!("ledger_auth_authorized_total").increment(1);
}

/// 로그인 시도 결과.
pub fn record_login(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!("ledger_login_total", "outcome" => outcome).increment(1);
}

/// 토큰 발급 카운터 증가.
pub fn record_token_issued() {
    counter!("ledger_tokens_issued_total").increment(1);
}

// ============================================================================
// 경로 라벨
// ============================================================================

/// 라우트에 매칭되지 않은 요청의 경로 라벨.
pub const UNMATCHED_ROUTE: &str = "unmatched";

/// 메트릭 경로 라벨.
///
/// 라우트 템플릿(`/account/{id}/transfer`)을 그대로 쓰고, 매칭되지 않은 요청은
/// 모두 [`UNMATCHED_ROUTE`] 하나로 묶습니다. 라벨 종류가 등록된 라우트 수를
/// 넘지 않습니다.
pub fn route_label(matched: Option<&MatchedPath>) -> &str {
    matched.map_or(UNMATCHED_ROUTE, MatchedPath::as_str)
}
