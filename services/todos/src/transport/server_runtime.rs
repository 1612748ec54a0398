use super::*;

/// Accepts on the calling thread and hands connections to `worker_count`
/// worker threads. Blocks until the listener fails.
pub fn serve_http_with_workers(
    runtime: TodoRuntime,
    bind_addr: &str,
    worker_count: usize,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(bind_addr)?;
    tracing::info!("todos service listening on http://{}", listener.local_addr()?);
    let worker_count = worker_count.max(1);
    let runtime = shared(runtime);
    let (tx, rx) = mpsc::channel::<TcpStream>();
    let rx = Arc::new(Mutex::new(rx));

    std::thread::scope(|scope| {
        for _ in 0..worker_count {
            let runtime = Arc::clone(&runtime);
            let rx = Arc::clone(&rx);
            scope.spawn(move || {
                loop {
                    let stream = {
                        let guard = match rx.lock() {
                            Ok(guard) => guard,
                            Err(_) => break,
                        };
                        match guard.recv() {
                            Ok(stream) => stream,
                            Err(_) => break,
                        }
                    };
                    if let Err(err) = handle_connection(&runtime, stream) {
                        tracing::warn!(error = %err, "todos transport connection error");
                    }
                }
            });
        }

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    if tx.send(stream).is_err() {
                        tracing::error!("todos transport worker queue closed");
                        break;
                    }
                }
                Err(err) => tracing::warn!(error = %err, "todos transport accept error"),
            }
        }
        drop(tx);
    });

    Ok(())
}
