use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Duration;

pub(crate) const FRONTPAGE_HTML: &str = r#"<!doctype html>
<html>
  <head>
    <script src="/static/app.js"></script>
    <!-- <script src="/static/disabled.js"></script> -->
    <script>window.inline = true;</script>
  </head>
  <body>
    <script type="module" src='/static/tailwind.js' defer></script>
  </body>
</html>
"#;

#[derive(Debug, Clone)]
pub(crate) struct Route {
    pub(crate) status: u16,
    pub(crate) body: String,
}

impl Route {
    pub(crate) fn ok(body: &str) -> Self {
        Self {
            status: 200,
            body: body.to_owned(),
        }
    }

    pub(crate) fn status(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
        }
    }
}

/// Single-purpose HTTP/1.1 server on a random local port. Every request
/// path is recorded; unknown paths answer `200 OK`.
pub(crate) struct FixtureServer {
    pub(crate) url: String,
    requests: Arc<Mutex<Vec<String>>>,
    shutdown: mpsc::Sender<()>,
    thread: Option<thread::JoinHandle<()>>,
}

impl Drop for FixtureServer {
    fn drop(&mut self) {
        drop(self.shutdown.send(()));
        if let Some(handle) = self.thread.take() {
            drop(handle.join());
        }
    }
}

impl FixtureServer {
    pub(crate) fn frontpage() -> Result<Self, String> {
        Self::start(vec![("/", Route::ok(FRONTPAGE_HTML))], Duration::ZERO)
    }

    pub(crate) fn start(routes: Vec<(&str, Route)>, delay: Duration) -> Result<Self, String> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .map_err(|err| format!("bind fixture server failed: {}", err))?;
        let addr = listener
            .local_addr()
            .map_err(|err| format!("fixture addr failed: {}", err))?;
        listener
            .set_nonblocking(true)
            .map_err(|err| format!("set_nonblocking failed: {}", err))?;

        let routes: Arc<HashMap<String, Route>> = Arc::new(
            routes
                .into_iter()
                .map(|(path, route)| (path.to_owned(), route))
                .collect(),
        );
        let requests = Arc::new(Mutex::new(Vec::new()));
        let (shutdown_tx, shutdown_rx) = mpsc::channel();

        let recorded = Arc::clone(&requests);
        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }
                match listener.accept() {
                    Ok((stream, _)) => {
                        let routes = Arc::clone(&routes);
                        let recorded = Arc::clone(&recorded);
                        thread::spawn(move || handle_client(stream, &routes, &recorded, delay));
                    }
                    Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(Duration::from_millis(5));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            url: format!("http://{}", addr),
            requests,
            shutdown: shutdown_tx,
            thread: Some(handle),
        })
    }

    pub(crate) fn requests(&self) -> Result<Vec<String>, String> {
        self.requests
            .lock()
            .map(|paths| paths.clone())
            .map_err(|err| format!("request log poisoned: {}", err))
    }
}

fn handle_client(
    mut stream: TcpStream,
    routes: &HashMap<String, Route>,
    recorded: &Mutex<Vec<String>>,
    delay: Duration,
) {
    if stream.set_nonblocking(false).is_err() {
        return;
    }
    let Some(path) = read_request_path(&mut stream) else {
        return;
    };
    if let Ok(mut paths) = recorded.lock() {
        paths.push(path.clone());
    }
    if !delay.is_zero() {
        thread::sleep(delay);
    }

    let route = routes.get(&path).cloned().unwrap_or_else(|| Route::ok("OK"));
    let response = format!(
        "HTTP/1.1 {} Fixture\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        route.status,
        route.body.len(),
        route.body
    );
    if stream.write_all(response.as_bytes()).is_err() {
        return;
    }
    if stream.flush().is_err() {
        return;
    }
    drop(stream.shutdown(Shutdown::Both));
}

fn read_request_path(stream: &mut TcpStream) -> Option<String> {
    let mut head = Vec::new();
    let mut buffer = [0u8; 1024];
    while !head.windows(4).any(|window| window == b"\r\n\r\n") {
        let read = stream.read(&mut buffer).ok()?;
        if read == 0 {
            break;
        }
        head.extend_from_slice(buffer.get(..read)?);
    }
    let head = String::from_utf8_lossy(&head);
    let request_line = head.lines().next()?;
    request_line.split_whitespace().nth(1).map(str::to_owned)
}
