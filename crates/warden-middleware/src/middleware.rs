use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use warden_core::RequestContext;

use crate::permission::PermissionEngine;
use crate::ratelimit::ActionRateLimiter;
use crate::token::{AccessClaims, TokenManager};

/// 认证中间件
///
/// 从 Authorization header 提取访问令牌并验证（含黑名单检查），
/// 将解码出的 Claims 和请求上下文注入 request extensions。
pub async fn auth_middleware(
    State(tokens): State<Arc<TokenManager>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = extract_bearer(req.headers())
        .ok_or(StatusCode::UNAUTHORIZED)?
        .to_string();

    // 验证失败按拒绝处理，不区分原因
    let claims = tokens
        .verify_access_token(&token)
        .await
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let ctx = RequestContext::new(
        client_ip(req.headers()),
        header_str(req.headers(), header::USER_AGENT),
        req.method().to_string(),
    );

    req.extensions_mut().insert(claims);
    req.extensions_mut().insert(ctx);

    Ok(next.run(req).await)
}

/// 权限检查中间件生成器
///
/// 需要配合 auth_middleware 使用：从 extensions 读取 Claims，
/// 按角色查询权限引擎。
pub fn require_permission(
    permission: &'static str,
) -> impl Fn(
    State<Arc<PermissionEngine>>,
    Request,
    Next,
) -> Pin<Box<dyn Future<Output = Result<Response, StatusCode>> + Send>>
       + Clone {
    move |State(engine): State<Arc<PermissionEngine>>, req: Request, next: Next| {
        Box::pin(async move {
            let role = req
                .extensions()
                .get::<AccessClaims>()
                .map(|claims| claims.role.clone())
                .ok_or(StatusCode::UNAUTHORIZED)?;

            if !engine.has_permission(&role, permission) {
                return Err(StatusCode::FORBIDDEN);
            }

            Ok(next.run(req).await)
        })
    }
}

/// 限流中间件生成器
///
/// 按客户端 IP 和动作名限流，拒绝时返回 429 并带 Retry-After。
pub fn rate_limit_middleware(
    action: &'static str,
) -> impl Fn(
    State<Arc<ActionRateLimiter>>,
    Request,
    Next,
) -> Pin<Box<dyn Future<Output = Result<Response, StatusCode>> + Send>>
       + Clone {
    move |State(limiter): State<Arc<ActionRateLimiter>>, req: Request, next: Next| {
        Box::pin(async move {
            let ip = client_ip(req.headers());
            let decision = limiter.check_limit(&ip, action).await;

            if !decision.allowed {
                let mut response = StatusCode::TOO_MANY_REQUESTS.into_response();
                if let Ok(value) = HeaderValue::from_str(&decision.retry_after_secs.to_string()) {
                    response.headers_mut().insert(header::RETRY_AFTER, value);
                }
                return Ok(response);
            }

            Ok(next.run(req).await)
        })
    }
}

/// 从 Authorization header 提取 Bearer 令牌
fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

/// 提取客户端 IP，优先取 X-Forwarded-For 的第一跳
fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.split(',').next())
        .map(|ip| ip.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> String {
    headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(extract_bearer(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn test_extract_bearer_rejects_other_schemes() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwdw=="));
        assert_eq!(extract_bearer(&headers), None);

        assert_eq!(extract_bearer(&HeaderMap::new()), None);
    }

    #[test]
    fn test_client_ip_takes_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("1.1.1.1, 10.0.0.1"),
        );
        assert_eq!(client_ip(&headers), "1.1.1.1");

        assert_eq!(client_ip(&HeaderMap::new()), "unknown");
    }

    #[test]
    fn test_header_str_defaults_to_empty() {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static("test-agent/1.0"));
        assert_eq!(header_str(&headers, header::USER_AGENT), "test-agent/1.0");
        assert_eq!(header_str(&HeaderMap::new(), header::USER_AGENT), "");
    }
}
