// HTTP Server Task - Serviert die LED REST-API
use alloc::string::String;
use core::str::FromStr;

use defmt::{info, warn};
use embassy_net::Stack;
use embassy_time::Duration;
use esp_core::api::{API_PREFIX, ApiResponse, LedApi, Method, RouteTable, api_path};
use picoserve::io::embedded_io_async;
use picoserve::request::Request;
use picoserve::response::{Content, IntoResponse, Response, ResponseWriter, StatusCode};
use picoserve::routing::{RequestHandlerService, parse_path_segment};

use crate::config::*;
use crate::{SharedEngine, SharedSettings};

/// Maximale Länge des Pfad-Segments nach `/api/led/`
const SEGMENT_CAPACITY: usize = 32;

/// Content-Type für Antworten ohne Body (Preflight)
const CONTENT_TYPE_EMPTY: &str = "text/plain; charset=utf-8";

/// Ein Pfad-Segment unter `/api/led`
///
/// Zu lange Segmente passen auf keine Route, picoserve antwortet dann mit 404.
struct ApiSegment(heapless::String<SEGMENT_CAPACITY>);

impl FromStr for ApiSegment {
    type Err = ();

    fn from_str(segment: &str) -> Result<Self, Self::Err> {
        heapless::String::try_from(segment)
            .map(ApiSegment)
            .map_err(|_| ())
    }
}

/// Pfad-Parameter, aus denen der volle API-Pfad wieder zusammengesetzt wird
///
/// Registriert sind `/api/led`, `/api/led/<a>` und `/api/led/<a>/<b>`;
/// über die Core-Routing-Tabelle bekommen so auch verschachtelte Pfade
/// Preflight bzw. 404 mit CORS-Headern.
trait ApiPath {
    fn full_path(&self) -> String;
}

impl ApiPath for () {
    fn full_path(&self) -> String {
        api_path(&[])
    }
}

impl ApiPath for ApiSegment {
    fn full_path(&self) -> String {
        api_path(&[self.0.as_str()])
    }
}

impl ApiPath for (ApiSegment, ApiSegment) {
    fn full_path(&self) -> String {
        api_path(&[self.0.0.as_str(), self.1.0.as_str()])
    }
}

/// JSON-Body einer `ApiResponse`
struct ApiBody {
    content_type: &'static str,
    body: String,
}

impl Content for ApiBody {
    fn content_type(&self) -> &'static str {
        self.content_type
    }

    fn content_length(&self) -> usize {
        self.body.len()
    }

    async fn write_content<W: embedded_io_async::Write>(self, mut writer: W) -> Result<(), W::Error> {
        writer.write_all(self.body.as_bytes()).await
    }
}

/// picoserve-Service: reicht jeden Request unter `/api/led/*` an `LedApi::serve` weiter
///
/// Die API wird pro Request neu gebaut; sie hält nur die Handles.
#[derive(Clone, Copy)]
struct LedApiService {
    routes: &'static RouteTable,
    engine: SharedEngine,
    settings: SharedSettings,
}

impl LedApiService {
    fn api(&self) -> LedApi<SharedEngine, SharedSettings> {
        LedApi::new(self.engine, self.settings).with_cors_origin(HTTP_CORS_ORIGIN)
    }
}

impl<P: ApiPath> RequestHandlerService<(), P> for LedApiService {
    async fn call_request_handler_service<
        R: embedded_io_async::Read,
        W: ResponseWriter<Error = R::Error>,
    >(
        &self,
        _state: &(),
        path_parameters: P,
        mut request: Request<'_, R>,
        response_writer: W,
    ) -> Result<picoserve::ResponseSent, W::Error> {
        let method = Method::parse(request.parts.method());
        let path = path_parameters.full_path();

        let response = match request.body_connection.body().read_all().await {
            Ok(body) => self.api().serve(self.routes, method, &path, body),
            Err(_) => {
                warn!("HTTP: {} {}: could not read request body", method.as_str(), path.as_str());
                self.api().serve(self.routes, method, &path, &[])
            }
        };
        info!("HTTP: {} {} -> {}", method.as_str(), path.as_str(), response.status);

        let connection = request.body_connection.finalize().await?;
        into_http(response)
            .write_to(connection, response_writer)
            .await
    }
}

/// Baut die picoserve-Antwort inkl. CORS-Header
fn into_http(response: ApiResponse) -> impl IntoResponse {
    let [origin, methods, headers] = response.cors_headers();
    let body = ApiBody {
        content_type: response.content_type().unwrap_or(CONTENT_TYPE_EMPTY),
        body: response.body,
    };

    Response::new(StatusCode::new(response.status), body)
        .with_header(origin.0, origin.1)
        .with_header(methods.0, methods.1)
        .with_header(headers.0, headers.1)
}

/// HTTP Server Task - läuft parallel zu anderen Tasks
///
/// **Task Pool:** Diese Task wird `HTTP_TASK_POOL_SIZE`-mal gespawnt,
/// jede Instanz bedient eine Connection gleichzeitig.
///
/// # Parameter
/// - `task_id`: Eindeutige ID für diese Server-Instanz
/// - `stack`: embassy-net Stack für Netzwerk-Zugriff
/// - `routes`: beim Start durch `begin()` gefüllte Routing-Tabelle
/// - `engine`: Handle auf die Effekt-Engine
/// - `settings`: Handle auf den Flash-Store
#[embassy_executor::task(pool_size = HTTP_TASK_POOL_SIZE)]
pub async fn http_server_task(
    task_id: usize,
    stack: &'static Stack<'static>,
    routes: &'static RouteTable,
    engine: SharedEngine,
    settings: SharedSettings,
) {
    info!("HTTP: Server task {} starting on port {}...", task_id, HTTP_PORT);

    let service = LedApiService {
        routes,
        engine,
        settings,
    };
    let app = picoserve::Router::new()
        .route_service(API_PREFIX, service)
        .route_service((API_PREFIX, parse_path_segment::<ApiSegment>()), service)
        .route_service(
            (
                API_PREFIX,
                parse_path_segment::<ApiSegment>(),
                parse_path_segment::<ApiSegment>(),
            ),
            service,
        );

    // Server-Konfiguration
    let config = picoserve::Config::new(picoserve::Timeouts {
        start_read_request: Some(Duration::from_secs(5)),
        read_request: Some(Duration::from_secs(1)),
        write: Some(Duration::from_secs(1)),
        persistent_start_read_request: Some(Duration::from_secs(5)),
    })
    .keep_connection_alive();

    // HTTP-Buffer für Requests/Responses
    let mut http_buffer = [0u8; HTTP_BUFFER_SIZE];

    // TCP-Buffers für Socket
    let mut rx_buffer = [0u8; TCP_RX_BUFFER_SIZE];
    let mut tx_buffer = [0u8; TCP_TX_BUFFER_SIZE];

    let server = picoserve::Server::new(&app, &config, &mut http_buffer);

    let _ = server
        .listen_and_serve(task_id, *stack, HTTP_PORT, &mut rx_buffer, &mut tx_buffer)
        .await;

    info!("HTTP: Server task {} ended", task_id);
}
