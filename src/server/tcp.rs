//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Servidor TCP que atiende cada conexión en su propio thread. Cada
//! conexión lleva exactamente un request y una respuesta (HTTP/1.0).

use super::build_router;
use crate::config::Config;
use crate::error::ServerError;
use crate::http::{Request, Response, StatusCode};
use crate::router::{add_common_headers, Router};
use crate::state::AppState;
use crate::tasks::Sweeper;
use std::io::{self, ErrorKind, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, info_span, warn};
use uuid::Uuid;

/// Tamaño máximo aceptado para un request (headers + body)
pub const MAX_REQUEST_BYTES: usize = 1024 * 1024;

/// Tiempo máximo esperando datos del cliente
const READ_TIMEOUT: Duration = Duration::from_secs(5);

const READ_CHUNK: usize = 8192;

/// Etiqueta de métricas para requests que no se pudieron parsear
const INVALID_ROUTE: &str = "<invalid>";

/// Resultado de leer un request del socket
enum Incoming {
    /// El cliente cerró sin enviar nada
    Closed,
    Complete(Vec<u8>),
    TooLarge,
}

/// Servidor HTTP/1.0 concurrente
pub struct Server {
    config: Config,
    router: Arc<Router>,
    state: AppState,
}

impl Server {
    /// Valida la configuración y construye el estado compartido
    pub fn new(config: Config) -> Result<Self, ServerError> {
        config.validate()?;
        let state = AppState::new(config.delay_policy());

        Ok(Self {
            config,
            router: Arc::new(build_router()),
            state,
        })
    }

    /// Estado compartido (stores y métricas)
    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn bind(&self) -> Result<TcpListener, ServerError> {
        let address = self.config.address();
        let listener = TcpListener::bind(&address)?;
        info!(address = %address, "listening");
        Ok(listener)
    }

    /// Acepta conexiones del listener hasta que falle
    ///
    /// Cada conexión se atiende en un thread propio. Si `task_ttl_secs`
    /// está activo, el thread de limpieza vive mientras dure esta llamada.
    pub fn serve(&self, listener: TcpListener) -> Result<(), ServerError> {
        let _sweeper = match self.config.task_ttl() {
            Some(ttl) => Some(Sweeper::start(
                self.state.tasks.clone(),
                ttl,
                self.config.sweep_interval(),
            )?),
            None => None,
        };

        for stream in listener.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(e) => {
                    warn!(error = %e, "failed to accept connection");
                    continue;
                }
            };

            let router = Arc::clone(&self.router);
            let state = self.state.clone();

            let spawned = thread::Builder::new()
                .name("connection".to_string())
                .spawn(move || {
                    state.metrics.connection_opened();
                    if let Err(e) = Self::handle_connection(stream, &router, &state) {
                        debug!(error = %e, "connection ended with I/O error");
                    }
                    state.metrics.connection_closed();
                });

            if let Err(e) = spawned {
                error!(error = %e, "failed to spawn connection thread");
            }
        }

        Ok(())
    }

    /// `bind` + `serve`. Bloquea el thread actual.
    pub fn run(&self) -> Result<(), ServerError> {
        let listener = self.bind()?;
        self.serve(listener)
    }

    fn handle_connection(mut stream: TcpStream, router: &Router, state: &AppState) -> io::Result<()> {
        let start = Instant::now();
        let request_id = Uuid::new_v4().to_string();
        let span = info_span!("request", request_id = %request_id);
        let _enter = span.enter();

        stream.set_read_timeout(Some(READ_TIMEOUT))?;

        let buffer = match read_request(&mut stream)? {
            Incoming::Closed => {
                debug!("peer closed without sending a request");
                return Ok(());
            }
            Incoming::TooLarge => {
                warn!(limit = MAX_REQUEST_BYTES, "request too large");
                let response = bad_request("request too large");
                return send(&mut stream, response, &request_id, INVALID_ROUTE, start, state);
            }
            Incoming::Complete(buffer) => buffer,
        };

        let (response, route) = match Request::parse(&buffer) {
            Ok(request) => {
                debug!(method = %request.method(), path = request.path(), bytes = buffer.len(), "request received");
                router.route(&request, state)
            }
            Err(e) => {
                warn!(error = %e, "parse error");
                (bad_request(&format!("Invalid request: {}", e)), INVALID_ROUTE)
            }
        };

        send(&mut stream, response, &request_id, route, start, state)
    }
}

/// Lee hasta tener headers + `Content-Length` bytes de body, EOF o timeout
fn read_request(stream: &mut TcpStream) -> io::Result<Incoming> {
    let mut buffer = Vec::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];

    loop {
        let bytes_read = match stream.read(&mut chunk) {
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                debug!(buffered = buffer.len(), "read timed out");
                break;
            }
            Err(e) => return Err(e),
        };

        if bytes_read == 0 {
            break;
        }

        buffer.extend_from_slice(&chunk[..bytes_read]);
        if buffer.len() > MAX_REQUEST_BYTES {
            return Ok(Incoming::TooLarge);
        }

        if let Some(expected) = Request::expected_len(&buffer) {
            if expected > MAX_REQUEST_BYTES {
                return Ok(Incoming::TooLarge);
            }
            if buffer.len() >= expected {
                break;
            }
        }
    }

    if buffer.is_empty() {
        Ok(Incoming::Closed)
    } else {
        Ok(Incoming::Complete(buffer))
    }
}

fn bad_request(message: &str) -> Response {
    let mut response = Response::error(StatusCode::BadRequest, message);
    add_common_headers(&mut response);
    response
}

/// Escribe la respuesta y registra métricas
fn send(
    stream: &mut TcpStream,
    mut response: Response,
    request_id: &str,
    route: &str,
    start: Instant,
    state: &AppState,
) -> io::Result<()> {
    response.add_header("X-Request-Id", request_id);

    stream.write_all(&response.to_bytes())?;
    stream.flush()?;

    let latency = start.elapsed();
    let status = response.status();
    state.metrics.record_request(route, status.as_u16(), latency);

    info!(
        route,
        status = status.as_u16(),
        latency_ms = latency.as_secs_f64() * 1000.0,
        "request served"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::DelayPolicy;
    use std::net::Shutdown;

    fn ephemeral_listener() -> TcpListener {
        TcpListener::bind("127.0.0.1:0").expect("bind")
    }

    fn test_state() -> AppState {
        AppState::new(DelayPolicy::Fixed(Duration::from_secs(3600)))
    }

    /// Atiende una conexión con `handle_connection` y devuelve lo que recibió el cliente
    fn exchange(state: &AppState, chunks: &[&[u8]]) -> String {
        let listener = ephemeral_listener();
        let addr = listener.local_addr().unwrap();

        let server = thread::spawn({
            let state = state.clone();
            move || {
                let router = build_router();
                let (stream, _) = listener.accept().unwrap();
                Server::handle_connection(stream, &router, &state).unwrap();
            }
        });

        let mut client = TcpStream::connect(addr).unwrap();
        for chunk in chunks {
            client.write_all(chunk).unwrap();
            thread::sleep(Duration::from_millis(20));
        }

        let mut buf = Vec::new();
        client.read_to_end(&mut buf).unwrap();
        server.join().unwrap();

        String::from_utf8_lossy(&buf).into_owned()
    }

    #[test]
    fn test_handle_connection_create_task() {
        let state = test_state();
        let text = exchange(&state, &[b"POST /task HTTP/1.0\r\n\r\n"]);

        assert!(text.starts_with("HTTP/1.0 201 Created"));
        assert!(text.contains("X-Request-Id:"));
        assert!(text.contains("\"task_id\""));
        assert_eq!(state.tasks.len(), 1);
        assert_eq!(state.metrics.snapshot().total_requests, 1);
    }

    #[test]
    fn test_handle_connection_metrics_ok() {
        let state = test_state();
        let text = exchange(&state, &[b"GET /metrics HTTP/1.0\r\n\r\n"]);

        assert!(text.contains("200 OK"));
        assert!(text.contains("\"latency_us\""));
    }

    #[test]
    fn test_handle_connection_body_in_two_writes() {
        let state = test_state();
        let body = br#"{"username":"ana","password":"pw"}"#;
        let head = format!(
            "POST /register HTTP/1.0\r\nContent-Length: {}\r\n\r\n",
            body.len()
        );

        let text = exchange(&state, &[head.as_bytes(), body]);

        assert!(text.starts_with("HTTP/1.0 201 Created"));
        assert!(state.users.login("ana", "pw"));
    }

    #[test]
    fn test_handle_connection_parse_error() {
        let listener = ephemeral_listener();
        let addr = listener.local_addr().unwrap();
        let state = test_state();

        let server = thread::spawn({
            let state = state.clone();
            move || {
                let (stream, _) = listener.accept().unwrap();
                Server::handle_connection(stream, &build_router(), &state).unwrap();
            }
        });

        let mut client = TcpStream::connect(addr).unwrap();
        client.write_all(b"\x00\x01\x02\x03garbage").unwrap();
        client.shutdown(Shutdown::Write).unwrap();

        let mut buf = Vec::new();
        client.read_to_end(&mut buf).unwrap();
        let text = String::from_utf8_lossy(&buf);

        assert!(text.contains("400 Bad Request"));
        assert!(text.contains("Invalid request"));
        assert!(text.contains("Connection: close"));

        server.join().unwrap();
    }

    #[test]
    fn test_handle_connection_too_large() {
        let state = test_state();
        let head = format!(
            "POST /register HTTP/1.0\r\nContent-Length: {}\r\n\r\n",
            MAX_REQUEST_BYTES + 1
        );

        let text = exchange(&state, &[head.as_bytes()]);

        assert!(text.contains("400 Bad Request"));
        assert!(text.contains("request too large"));
        assert!(state.users.is_empty());
    }

    #[test]
    fn test_huge_content_length_is_400_and_connection_closes() {
        let server = Server::new(Config::default()).unwrap();
        let state = server.state().clone();
        let listener = ephemeral_listener();
        let addr = listener.local_addr().unwrap();

        thread::spawn(move || server.serve(listener));

        let mut client = TcpStream::connect(addr).unwrap();
        let head = format!(
            "POST /register HTTP/1.0\r\nContent-Length: {}\r\n\r\n",
            usize::MAX
        );
        client.write_all(head.as_bytes()).unwrap();

        let mut buf = Vec::new();
        client.read_to_end(&mut buf).unwrap();
        let text = String::from_utf8_lossy(&buf);

        assert!(text.contains("400 Bad Request"));
        assert!(text.contains("request too large"));

        // El thread de la conexión termina y descuenta la conexión activa
        let deadline = Instant::now() + Duration::from_secs(5);
        while state.metrics.active_connections() > 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(state.metrics.active_connections(), 0);
    }

    #[test]
    fn test_handle_connection_peer_closed_immediately() {
        let listener = ephemeral_listener();
        let addr = listener.local_addr().unwrap();
        let state = test_state();

        let server = thread::spawn({
            let state = state.clone();
            move || {
                let (stream, _) = listener.accept().unwrap();
                // El peer no envía nada: read retorna 0 y no se escribe respuesta
                Server::handle_connection(stream, &build_router(), &state).unwrap();
            }
        });

        drop(TcpStream::connect(addr).unwrap());
        server.join().unwrap();

        assert_eq!(state.metrics.snapshot().total_requests, 0);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = Config::default();
        config.min_delay_ms = 10;
        config.max_delay_ms = 5;

        assert!(matches!(Server::new(config), Err(ServerError::Config(_))));
    }

    #[test]
    fn test_serve_spawns_thread_per_connection() {
        let mut config = Config::default();
        config.min_delay_ms = 1;
        config.max_delay_ms = 1;

        let server = Server::new(config).unwrap();
        let state = server.state().clone();
        let listener = ephemeral_listener();
        let addr = listener.local_addr().unwrap();

        thread::spawn(move || server.serve(listener));

        let clients: Vec<_> = (0..4)
            .map(|_| {
                thread::spawn(move || {
                    let mut client = TcpStream::connect(addr).unwrap();
                    client.write_all(b"POST /task HTTP/1.0\r\n\r\n").unwrap();
                    let mut buf = Vec::new();
                    client.read_to_end(&mut buf).unwrap();
                    String::from_utf8_lossy(&buf).into_owned()
                })
            })
            .collect();

        for client in clients {
            assert!(client.join().unwrap().contains("201 Created"));
        }
        assert_eq!(state.tasks.len(), 4);
    }
}
