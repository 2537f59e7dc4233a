//! HTTP middleware for the gateway.
//!
//! `DownloadMiddleware` wraps the inner application and owns the
//! `/view/<directory>/<geometry>/<filename>` surface. Any request whose path
//! does not parse into a download descriptor is forwarded to the wrapped
//! application untouched, body included; the response for such requests is
//! whatever the inner application produces.

use crate::handlers::{download, AppState};
use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::error::ResponseError;
use actix_web::Error;
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;
use std::sync::Arc;

use crate::models::RequestDescriptor;

pub struct DownloadMiddleware {
    state: Arc<AppState>,
}

impl DownloadMiddleware {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }
}

impl<S, B> Transform<S, ServiceRequest> for DownloadMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = DownloadMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(DownloadMiddlewareService {
            service: Rc::new(service),
            state: self.state.clone(),
        }))
    }
}

pub struct DownloadMiddlewareService<S> {
    service: Rc<S>,
    state: Arc<AppState>,
}

impl<S, B> Service<ServiceRequest> for DownloadMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let state = self.state.clone();

        let descriptor = {
            let host = req.connection_info().host().to_string();
            RequestDescriptor::parse(&host, req.path())
        };

        Box::pin(async move {
            match descriptor {
                None => service
                    .call(req)
                    .await
                    .map(|res| res.map_into_left_body()),
                Some(descriptor) => {
                    let (req, _payload) = req.into_parts();
                    let response = download::serve(&state, descriptor)
                        .await
                        .unwrap_or_else(|e| e.error_response());
                    Ok(ServiceResponse::new(req, response).map_into_right_body())
                }
            }
        })
    }
}
