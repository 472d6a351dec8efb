/// HTTP middleware and request extractors for adoption-service
///
/// - `JwtAuth`: validates an optional Bearer token and stores the caller's
///   `UserId` in request extensions. Requests without a usable token pass
///   through anonymously; handlers that need a caller take `UserId` (401 when
///   absent), those that only care take `Option<UserId>`.
/// - `ClientIp`: best-effort client address behind proxies.
use crate::error::AppError;
use actix_web::dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use crypto_core::jwt::JwtValidator;
use futures_util::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::net::{IpAddr, SocketAddr};
use std::rc::Rc;
use std::sync::Arc;
use uuid::Uuid;

// =====================================================================
// JWT Authentication
// =====================================================================

/// Extracted user identifier stored in request extensions after auth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub Uuid);

pub struct JwtAuth {
    validator: Option<Arc<JwtValidator>>,
}

impl JwtAuth {
    pub fn new(validator: Option<Arc<JwtValidator>>) -> Self {
        Self { validator }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthService {
            service: Rc::new(service),
            validator: self.validator.clone(),
        }))
    }
}

pub struct JwtAuthService<S> {
    service: Rc<S>,
    validator: Option<Arc<JwtValidator>>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let validator = self.validator.clone();

        Box::pin(async move {
            let header = req
                .headers()
                .get("Authorization")
                .and_then(|h| h.to_str().ok())
                .map(str::to_string);

            if let Some(header) = header {
                if let Some(user_id) = authenticate(&header, validator.as_deref()) {
                    req.extensions_mut().insert(UserId(user_id));
                }
            }

            service.call(req).await
        })
    }
}

/// Resolve a header value to a caller. Any failure leaves the request
/// anonymous so public routes keep working with stale or foreign tokens.
fn authenticate(header: &str, validator: Option<&JwtValidator>) -> Option<Uuid> {
    let Some(token) = header.strip_prefix("Bearer ") else {
        tracing::debug!("ignoring non-bearer Authorization header");
        return None;
    };
    let Some(validator) = validator else {
        tracing::warn!("bearer token sent but JWT_PUBLIC_KEY_PEM is not configured");
        return None;
    };
    match validator.user_id(token.trim()) {
        Ok(user_id) => Some(user_id),
        Err(e) => {
            tracing::debug!(error = %e, "bearer token rejected");
            None
        }
    }
}

impl FromRequest for UserId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<UserId>()
                .copied()
                .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()).into()),
        )
    }
}

// =====================================================================
// Client address
// =====================================================================

/// Client IP as reported by `Forwarded` / `X-Forwarded-For`, falling back
/// to the peer address. The headers are trusted as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl FromRequest for ClientIp {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let info = req.connection_info();
        let ip = info
            .realip_remote_addr()
            .map(strip_port)
            .unwrap_or_else(|| "unknown".to_string());
        ready(Ok(ClientIp(ip)))
    }
}

/// `203.0.113.7:5123` → `203.0.113.7`, `[2001:db8::1]:443` → `2001:db8::1`
pub fn strip_port(addr: &str) -> String {
    let addr = addr.trim();
    if let Ok(socket) = addr.parse::<SocketAddr>() {
        return socket.ip().to_string();
    }
    if let Ok(ip) = addr.trim_matches(|c| c == '[' || c == ']').parse::<IpAddr>() {
        return ip.to_string();
    }
    match addr.rsplit_once(':') {
        Some((host, port)) if !host.contains(':') && port.bytes().all(|b| b.is_ascii_digit()) => {
            host.to_string()
        }
        _ => addr.to_string(),
    }
}
