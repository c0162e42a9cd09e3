use edgeroute::context::{HasRequest, HasStaticAssets};
use edgeroute::dispatcher::RouterHandler;
use edgeroute::pipeline::{Defect, Outcome, Worker};
use edgeroute::request::ApiRequest;
use edgeroute::response::ApiResponse;
use edgeroute::router::{handler, merge, route, RouteSpec, Router, RouterMethod};
use edgeroute::static_files::{AssetError, StaticAssets};
use futures::future::{self, BoxFuture};
use http::{Method, StatusCode};
use serde_json::json;
use std::io;
use std::sync::Arc;

enum Assets {
    Serve(&'static str),
    Broken,
}

impl StaticAssets for Assets {
    fn fetch<'a>(&'a self, request: &'a ApiRequest) -> BoxFuture<'a, Result<ApiResponse, AssetError>> {
        let result = match self {
            Assets::Serve(body) if request.pathname() == "/app.js" => {
                Ok(ApiResponse::text(StatusCode::OK, *body))
            }
            Assets::Serve(_) => Err(AssetError::NotFound(request.pathname().to_owned())),
            Assets::Broken => Err(AssetError::Io(io::Error::other("disk on fire"))),
        };
        Box::pin(future::ready(result))
    }
}

struct Ctx {
    request: ApiRequest,
    assets: Option<Arc<Assets>>,
}

impl HasRequest for Ctx {
    fn request(&self) -> &ApiRequest {
        &self.request
    }
}

impl HasStaticAssets for Ctx {
    fn static_assets(&self) -> Option<&dyn StaticAssets> {
        self.assets.as_deref().map(|a| a as &dyn StaticAssets)
    }
}

fn blow_up() -> ApiResponse {
    panic!("handler exploded")
}

fn routes() -> Router<Ctx> {
    merge([
        route(
            RouteSpec::new("ok", "v1", RouterMethod::Get),
            handler(|_ctx: Arc<Ctx>| async { Ok(ApiResponse::text(StatusCode::OK, "ok")) }),
        ),
        route(
            RouteSpec::new("defect", "v1", RouterMethod::Get),
            handler(|_ctx: Arc<Ctx>| async { Err::<ApiResponse, _>(Defect::msg("database unreachable")) }),
        ),
        route(
            RouteSpec::new("panic", "v1", RouterMethod::Get),
            handler(|_ctx: Arc<Ctx>| async { Ok(blow_up()) }),
        ),
    ])
}

fn worker(assets: Option<Assets>) -> Worker<Ctx> {
    let assets = assets.map(Arc::new);
    Worker::new(RouterHandler::build(&routes()).unwrap(), move |request| {
        Ok(Ctx {
            request,
            assets: assets.clone(),
        })
    })
}

fn get(path: &str) -> ApiRequest {
    ApiRequest::new(Method::GET, &format!("https://edge.test{path}")).unwrap()
}

#[tokio::test]
async fn test_matched_route_succeeds() {
    let (res, outcome) = worker(None).handle_with_outcome(get("/v1/ok")).await;
    assert_eq!(outcome, Outcome::Succeeded);
    assert_eq!(res.body_text(), "ok");
}

#[tokio::test]
async fn test_returned_defect_becomes_generic_500() {
    let (res, outcome) = worker(None).handle_with_outcome(get("/v1/defect")).await;
    assert_eq!(outcome, Outcome::ErrorResponse);
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.body_json().unwrap(), json!({"error": "Internal server error"}));
    assert!(!res.body_text().contains("database"));
}

#[tokio::test]
async fn test_panic_becomes_generic_500() {
    let (res, outcome) = worker(None).handle_with_outcome(get("/v1/panic")).await;
    assert_eq!(outcome, Outcome::ErrorResponse);
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.body_json().unwrap(), json!({"error": "Internal server error"}));
}

#[tokio::test]
async fn test_worker_survives_panics() {
    let w = worker(None);
    let _ = w.handle(get("/v1/panic")).await;
    let res = w.handle(get("/v1/ok")).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unmatched_without_assets_is_plain_404() {
    let (res, outcome) = worker(None).handle_with_outcome(get("/v2/ok")).await;
    assert_eq!(outcome, Outcome::Recovered);
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.body_text(), "404 Not Found");
}

#[tokio::test]
async fn test_unmatched_method_falls_back() {
    let req = ApiRequest::new(Method::POST, "https://edge.test/v1/ok").unwrap();
    let (res, outcome) = worker(None).handle_with_outcome(req).await;
    assert_eq!(outcome, Outcome::Recovered);
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_static_fallback() {
    let w = worker(Some(Assets::Serve("console.log(1)")));
    let (res, outcome) = w.handle_with_outcome(get("/app.js")).await;
    assert_eq!(outcome, Outcome::Recovered);
    assert_eq!(res.body_text(), "console.log(1)");

    let res = w.handle(get("/nope.js")).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.body_text(), "404 Not Found");
}

#[tokio::test]
async fn test_asset_io_error_is_a_defect() {
    let (res, outcome) = worker(Some(Assets::Broken))
        .handle_with_outcome(get("/app.js"))
        .await;
    assert_eq!(outcome, Outcome::ErrorResponse);
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_context_factory_failure_is_contained() {
    let w: Worker<Ctx> = Worker::new(RouterHandler::build(&routes()).unwrap(), |_request| {
        Err(Defect::msg("no context"))
    });
    let (res, outcome) = w.handle_with_outcome(get("/v1/ok")).await;
    assert_eq!(outcome, Outcome::ErrorResponse);
    assert_eq!(res.body_json().unwrap(), json!({"error": "Internal server error"}));
}

#[tokio::test]
async fn test_concurrent_requests_share_the_table() {
    let w = worker(None);
    let handles: Vec<_> = (0..16)
        .map(|i| {
            let w = w.clone();
            tokio::spawn(async move {
                let path = if i % 2 == 0 { "/v1/ok" } else { "/v1/missing" };
                w.handle(get(path)).await.status()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let expected = if i % 2 == 0 { StatusCode::OK } else { StatusCode::NOT_FOUND };
        assert_eq!(handle.await.unwrap(), expected);
    }
}
