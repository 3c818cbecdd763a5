use chrono::Utc;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

/// One entry of the canned demo feed.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: String,
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: String,
}

const CATALOG: [(&str, &str, &str, &str); 5] = [
    ("1", "Welcome!", "Welcome to gRPC streaming", "success"),
    ("2", "System Update", "System is running smoothly", "info"),
    ("3", "New Feature", "gRPC streaming is now available", "info"),
    ("4", "Performance", "All services are optimal", "success"),
    ("5", "Tutorial", "Learn more about Protocol Buffers", "info"),
];

/// Interval between two pushed notifications.
const PACE: Duration = Duration::from_secs(1);

fn stamped(entry: (&str, &str, &str, &str)) -> Notification {
    Notification {
        id: entry.0.to_owned(),
        title: entry.1.to_owned(),
        message: entry.2.to_owned(),
        timestamp: Utc::now().to_rfc3339(),
        kind: entry.3.to_owned(),
    }
}

/// Spawns the paced notification producer and hands back its stream.
///
/// Pushes one catalog entry per second, `min(duration_seconds, 5)` in
/// total, each stamped at send time. The producer dies the moment the
/// cancellation token fires or the receiving half is dropped, so a
/// disconnected client leaves no timer behind.
pub fn feed(duration_seconds: u32, cancel: CancellationToken) -> ReceiverStream<Notification> {
    let (tx, rx) = mpsc::channel(CATALOG.len());
    let total = CATALOG.len().min(duration_seconds as usize);

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PACE);
        // The first tick of a fresh interval completes immediately.
        interval.tick().await;

        for entry in CATALOG.iter().take(total) {
            tokio::select! {
                _ = cancel.cancelled() => break,
                () = tx.closed() => break,
                _ = interval.tick() => {}
            }

            if tx.send(stamped(*entry)).await.is_err() {
                break;
            }
        }
    });

    ReceiverStream::new(rx)
}

/// Rewrites a chat message's sender identity for the echo reply.
#[must_use]
pub fn echo_sender(username: &str) -> String {
    format!("Server (echoing {username})")
}

#[must_use]
pub fn echo_body(message: &str) -> String {
    format!("Echo: {message}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt;

    #[tokio::test(start_paused = true)]
    async fn pushes_min_of_duration_and_catalog() {
        let mut stream = feed(3, CancellationToken::new());

        let mut seen = Vec::new();
        while let Some(item) = stream.next().await {
            seen.push(item);
        }

        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].id, "1");
        assert_eq!(seen[2].id, "3");

        for pair in seen.windows(2) {
            assert!(pair[0].timestamp <= pair[1].timestamp);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn long_durations_exhaust_the_catalog() {
        let stream = feed(60, CancellationToken::new());
        let seen: Vec<_> = stream.collect().await;
        assert_eq!(seen.len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_duration_closes_immediately() {
        let mut stream = feed(0, CancellationToken::new());
        assert_eq!(stream.next().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn events_are_paced_a_second_apart() {
        let start = tokio::time::Instant::now();
        let mut stream = feed(2, CancellationToken::new());

        stream.next().await.unwrap();
        assert!(start.elapsed() >= PACE);

        stream.next().await.unwrap();
        assert!(start.elapsed() >= PACE * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_all_further_pushes() {
        let cancel = CancellationToken::new();
        let mut stream = feed(5, cancel.clone());

        assert!(stream.next().await.is_some());

        cancel.cancel();
        assert_eq!(stream.next().await, None);
    }
}
