//! HTTP 요청 metrics middleware.

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

use crate::metrics::{record_http_duration, record_http_request, record_http_response, route_label};

/// 요청/응답 카운터와 처리 시간 히스토그램을 기록하는 미들웨어.
///
/// 경로 라벨은 요청 URI가 아니라 매칭된 라우트 템플릿입니다. `Router::layer`로
/// 적용해야 `MatchedPath`가 채워집니다.
pub async fn metrics_layer(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = route_label(request.extensions().get::<MatchedPath>()).to_owned();

    record_http_request(&method, &route);

    let response = next.run(request).await;

    record_http_response(&method, &route, response.status().as_u16());
    record_http_duration(&method, &route, start.elapsed().as_secs_f64());

    response
}
