use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

pub type Handler = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Starts a throwaway HTTP server answering every request with
/// `handler(request_line)` as a JSON body. Returns its base URL.
pub fn serve(handler: Handler) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { continue };
            let handler = Arc::clone(&handler);
            thread::spawn(move || respond(stream, handler));
        }
    });
    format!("http://{addr}")
}

fn respond(mut stream: TcpStream, handler: Handler) {
    let mut request = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let Ok(n) = stream.read(&mut buf) else { return };
        if n == 0 {
            break;
        }
        request.extend_from_slice(&buf[..n]);
        if request.windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }
    let text = String::from_utf8_lossy(&request);
    let request_line = text.lines().next().unwrap_or_default().to_string();
    let body = handler(&request_line);
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
}

fn matrix(streams: Vec<(&str, Vec<f64>)>) -> String {
    let result: Vec<String> = streams
        .iter()
        .map(|(labels, values)| {
            let points: Vec<String> = values
                .iter()
                .enumerate()
                .map(|(i, v)| format!("[{}, \"{}\"]", 1_700_000_000 + i * 300, v))
                .collect();
            format!(r#"{{"metric": {labels}, "values": [{}]}}"#, points.join(", "))
        })
        .collect();
    format!(
        r#"{{"status": "success", "data": {{"resultType": "matrix", "result": [{}]}}}}"#,
        result.join(", ")
    )
}

/// Canned node_exporter answers keyed on the PromQL in the request line.
pub fn node_exporter_handler() -> Handler {
    Arc::new(|request_line: &str| {
        if request_line.contains("node_cpu_seconds_total") {
            matrix(vec![(
                r#"{"instance": "a:9100", "name": "alpha"}"#,
                vec![0.5, 0.1, 0.3],
            )])
        } else if request_line.contains("node_network_receive_bytes_total") {
            matrix(vec![
                (r#"{"instance": "a:9100", "name": "alpha"}"#, vec![1048576.0]),
                (
                    r#"{"instance": "b:9100", "name": "beta"}"#,
                    vec![2097152.0, 1048576.0, 1572864.0],
                ),
            ])
        } else if request_line.contains("node_filesystem_free_bytes") {
            matrix(vec![
                (r#"{"instance": "a:9100", "mountpoint": "/"}"#, vec![0.25]),
                (r#"{"instance": "b:9100", "mountpoint": "/data"}"#, vec![0.5, 0.7]),
            ])
        } else {
            r#"{"status": "success", "data": {"resultType": "vector", "result": []}}"#.to_string()
        }
    })
}
