// Background tasks - network work requested by the controller
//
// The controller never awaits I/O. Transitions return `Task` values, the
// event loop spawns each one on the runtime, and the `TaskResult` comes back
// over a channel to be applied on the control task.

use crate::feed::{FeedSource, FetchError, Message};
use crate::summarize::{ConnectionReport, GeminiSummarizer, SummaryOutcome};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Work the controller wants done off the control task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Load the message feed
    Fetch,
    /// Summarize `message`; the result is dropped if `generation` is stale
    Summarize { generation: u64, message: Message },
    /// Probe the generation API
    TestConnection { generation: u64 },
    /// Hand a URL to the system browser
    OpenUrl(String),
}

/// Completed task, applied back into controller state
#[derive(Debug)]
pub enum TaskResult {
    Fetched(Result<Vec<Message>, FetchError>),
    Summarized {
        generation: u64,
        outcome: SummaryOutcome,
    },
    ConnectionTested {
        generation: u64,
        report: ConnectionReport,
    },
    UrlOpened {
        url: String,
        result: Result<(), String>,
    },
}

/// Services the tasks run against
pub struct Services {
    pub feed: FeedSource,
    pub summarizer: GeminiSummarizer,
}

pub async fn execute(task: Task, services: &Services) -> TaskResult {
    match task {
        Task::Fetch => TaskResult::Fetched(services.feed.load().await),
        Task::Summarize {
            generation,
            message,
        } => TaskResult::Summarized {
            generation,
            outcome: services.summarizer.summarize(&message).await,
        },
        Task::TestConnection { generation } => TaskResult::ConnectionTested {
            generation,
            report: services.summarizer.test_connection().await,
        },
        Task::OpenUrl(url) => {
            let result = open_in_browser(&url).map_err(|e| e.to_string());
            TaskResult::UrlOpened { url, result }
        }
    }
}

/// Spawn every task; results arrive on `results`
pub fn spawn_all(tasks: Vec<Task>, services: &Arc<Services>, results: &mpsc::Sender<TaskResult>) {
    for task in tasks {
        tracing::debug!("Dispatching {:?}", TaskKind(&task));
        let services = Arc::clone(services);
        let results = results.clone();
        tokio::spawn(async move {
            let result = execute(task, &services).await;
            // receiver gone means the browser is shutting down
            let _ = results.send(result).await;
        });
    }
}

/// Debug view of a task without the message payload
struct TaskKind<'a>(&'a Task);

impl std::fmt::Debug for TaskKind<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Task::Fetch => write!(f, "Fetch"),
            Task::Summarize {
                generation,
                message,
            } => write!(f, "Summarize(#{}, message {})", generation, message.id),
            Task::TestConnection { generation } => write!(f, "TestConnection(#{})", generation),
            Task::OpenUrl(url) => write!(f, "OpenUrl({})", url),
        }
    }
}

/// Open `url` with the platform's default handler
pub fn open_in_browser(url: &str) -> std::io::Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", url])
            .spawn()?;
    }
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .spawn()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeminiConfig;
    use crate::feed::Author;
    use crate::summarize::SummaryFailure;
    use std::time::Duration;

    fn services(feed: FeedSource) -> Arc<Services> {
        Arc::new(Services {
            feed,
            summarizer: GeminiSummarizer::new(&GeminiConfig::default(), Duration::from_secs(1)),
        })
    }

    fn message() -> Message {
        Message {
            id: "1".to_string(),
            subject: "s".to_string(),
            body: String::new(),
            post_time: String::new(),
            view_href: String::new(),
            author: Author::default(),
            age: "unknown".to_string(),
        }
    }

    #[tokio::test]
    async fn test_results_come_back_tagged() {
        let services = services(FeedSource::File("/nonexistent/feed.json".into()));
        let (tx, mut rx) = mpsc::channel(4);

        spawn_all(
            vec![
                Task::Summarize {
                    generation: 7,
                    message: message(),
                },
                Task::TestConnection { generation: 3 },
            ],
            &services,
            &tx,
        );

        let mut seen = Vec::new();
        for _ in 0..2 {
            match rx.recv().await.unwrap() {
                TaskResult::Summarized {
                    generation,
                    outcome,
                } => {
                    assert_eq!(generation, 7);
                    assert_eq!(outcome, SummaryOutcome::Failed(SummaryFailure::Unavailable));
                    seen.push("summary");
                }
                TaskResult::ConnectionTested { generation, report } => {
                    assert_eq!(generation, 3);
                    assert_eq!(report, ConnectionReport::Unavailable);
                    seen.push("test");
                }
                other => panic!("unexpected result: {other:?}"),
            }
        }
        seen.sort();
        assert_eq!(seen, vec!["summary", "test"]);
    }

    #[tokio::test]
    async fn test_fetch_error_is_a_result() {
        let services = services(FeedSource::File("/nonexistent/feed.json".into()));
        match execute(Task::Fetch, &services).await {
            TaskResult::Fetched(Err(FetchError::Io(_))) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
