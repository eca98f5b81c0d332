use gitchat::core::chat_log::{LineStyle, OutputHandle, Redraw, SharedLog};
use gitchat::core::session::{ClientSession, SessionEvent, SessionState, Submitted, spawn_receive_task};
use gitchat::core::store::{ChatStore, FileChatStore};
use gitchat::core::wire::Identity;
use gitchat::net::TcpConnection;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

// ============================================================================
// Helper Functions
// ============================================================================

#[derive(Default)]
struct CountingRedraw(AtomicUsize);

impl Redraw for CountingRedraw {
    fn request_redraw(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

fn alice() -> Identity {
    Identity::new("alice", "repo")
}

/// Binds a loopback listener and runs `serve` on the first accepted client.
fn start_server<T: Send + 'static>(
    serve: impl FnOnce(BufReader<std::net::TcpStream>) -> T + Send + 'static,
) -> (u16, thread::JoinHandle<T>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        serve(BufReader::new(stream))
    });
    (port, handle)
}

fn read_line(reader: &mut BufReader<std::net::TcpStream>) -> String {
    let mut line = String::new();
    reader.read_line(&mut line).unwrap();
    line.trim_end().to_string()
}

/// Waits for the receive task's final event, skipping redraw requests.
fn wait_for_end(events: &mpsc::Receiver<SessionEvent>) -> SessionEvent {
    loop {
        match events.recv_timeout(Duration::from_secs(5)).unwrap() {
            SessionEvent::Redraw => continue,
            other => return other,
        }
    }
}

fn log_lines(output: &OutputHandle) -> Vec<(String, LineStyle)> {
    output
        .log()
        .snapshot()
        .into_iter()
        .map(|line| (line.text, line.style))
        .collect()
}

// ============================================================================
// Submit Path
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_submit_path_sends_greeting_message_and_farewell() {
    let (port, server) = start_server(|mut reader| {
        let mut lines = Vec::new();
        loop {
            let line = read_line(&mut reader);
            if line.is_empty() {
                return lines;
            }
            lines.push(line);
        }
    });

    let connection = TcpConnection::connect("127.0.0.1", port).unwrap();
    let mut session = ClientSession::new(Box::new(connection.sender), alice());
    session.handshake().unwrap();

    assert_eq!(session.submit("hello there").unwrap(), Submitted::Sent);
    assert_eq!(session.submit("quit now").unwrap(), Submitted::Sent);
    assert_eq!(session.submit("  quit ").unwrap(), Submitted::Quit);
    assert_eq!(session.state(), SessionState::Terminating);

    let received = server.join().unwrap();
    assert_eq!(
        received,
        vec![
            "first repo alice",
            "[alice]: hello there repo",
            "[alice]: quit now repo",
            "exit alice repo",
        ]
    );

    session.close();
    assert_eq!(session.state(), SessionState::Closed);
}

// ============================================================================
// Receive Path
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_receive_path_frames_strips_tags_and_persists() {
    let (port, server) = start_server(|mut reader| {
        let greeting = read_line(&mut reader);
        let stream = reader.get_mut();
        // One line split across two writes, then a burst of two
        stream.write_all(b"[bob]: hel").unwrap();
        stream.flush().unwrap();
        thread::sleep(Duration::from_millis(20));
        stream.write_all(b"lo repo\n[alice]: hi bob repo\n[carol]: bye repo\n").unwrap();
        greeting
    });

    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("chat_store");

    let connection = TcpConnection::connect("127.0.0.1", port).unwrap();
    let mut session = ClientSession::new(Box::new(connection.sender), alice());
    session.handshake().unwrap();

    let redraw = Arc::new(CountingRedraw::default());
    let output = OutputHandle::new(SharedLog::new(100), redraw.clone());
    let (tx, rx) = mpsc::channel();
    let store: Box<dyn ChatStore> = Box::new(FileChatStore::new(&store_path));
    let _task = spawn_receive_task(
        Box::new(connection.receiver),
        Some(store),
        alice(),
        output.clone(),
        tx,
    );

    assert_eq!(server.join().unwrap(), "first repo alice");
    assert!(matches!(wait_for_end(&rx), SessionEvent::RemoteClosed));

    assert_eq!(
        log_lines(&output),
        vec![
            ("[bob]: hello".to_string(), LineStyle::HighlightOther),
            ("[alice]: hi bob".to_string(), LineStyle::HighlightSelf),
            ("[carol]: bye".to_string(), LineStyle::HighlightOther),
            ("Connection closed by server.".to_string(), LineStyle::Normal),
        ]
    );
    // Every line came from the background task
    assert_eq!(redraw.0.load(Ordering::SeqCst), 4);

    let stored = std::fs::read_to_string(&store_path).unwrap();
    assert_eq!(stored, "[bob]: hello\n[alice]: hi bob\n[carol]: bye\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_receive_task_replays_store_before_live_lines() {
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("chat_store");
    std::fs::write(&store_path, "[alice]: earlier\n[bob]: reply\n").unwrap();

    let (port, server) = start_server(|mut reader| {
        read_line(&mut reader);
        reader.get_mut().write_all(b"[bob]: live repo\n").unwrap();
    });

    let connection = TcpConnection::connect("127.0.0.1", port).unwrap();
    let mut session = ClientSession::new(Box::new(connection.sender), alice());
    session.handshake().unwrap();

    let output = OutputHandle::new(SharedLog::new(100), Arc::new(CountingRedraw::default()));
    let (tx, rx) = mpsc::channel();
    let store: Box<dyn ChatStore> = Box::new(FileChatStore::new(&store_path));
    let _task = spawn_receive_task(
        Box::new(connection.receiver),
        Some(store),
        alice(),
        output.clone(),
        tx,
    );

    server.join().unwrap();
    assert!(matches!(wait_for_end(&rx), SessionEvent::RemoteClosed));

    let texts: Vec<String> = log_lines(&output).into_iter().map(|(t, _)| t).collect();
    assert_eq!(
        texts,
        vec![
            "[alice]: earlier",
            "[bob]: reply",
            "[bob]: live",
            "Connection closed by server.",
        ]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_store_is_no_history() {
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("never_written");

    let (port, server) = start_server(|mut reader| {
        read_line(&mut reader);
    });

    let connection = TcpConnection::connect("127.0.0.1", port).unwrap();
    let mut session = ClientSession::new(Box::new(connection.sender), alice());
    session.handshake().unwrap();

    let output = OutputHandle::new(SharedLog::new(100), Arc::new(CountingRedraw::default()));
    let (tx, rx) = mpsc::channel();
    let store: Box<dyn ChatStore> = Box::new(FileChatStore::new(&store_path));
    let _task = spawn_receive_task(
        Box::new(connection.receiver),
        Some(store),
        alice(),
        output.clone(),
        tx,
    );

    server.join().unwrap();
    assert!(matches!(wait_for_end(&rx), SessionEvent::RemoteClosed));
    assert_eq!(
        log_lines(&output),
        vec![("Connection closed by server.".to_string(), LineStyle::Normal)]
    );
}
