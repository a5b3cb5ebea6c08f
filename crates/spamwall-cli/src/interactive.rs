//! Interactive session: each stdin line is posted as a comment.
//!
//! Commands:
//! - `/user NAME`  change the display name
//! - `/check TEXT`  classify without posting
//! - `/inject FRAME`  publish a raw `comment` JSON frame as another client
//! - `/quit`

use std::sync::Arc;

use spamwall_ai::{
    ModelHandle, ModelStatus, OnnxLoader, PostOutcome, Session, SessionError, SpamFilter,
};
use spamwall_sync::{ChannelEvent, Relay, RelayClient};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::display;

enum Line<'a> {
    Quit,
    User(&'a str),
    Check(&'a str),
    Inject(&'a str),
    Comment(&'a str),
}

fn parse_line(line: &str) -> Line<'_> {
    let trimmed = line.trim();
    if trimmed == "/quit" {
        Line::Quit
    } else if let Some(name) = trimmed.strip_prefix("/user ") {
        Line::User(name)
    } else if let Some(text) = trimmed.strip_prefix("/check ") {
        Line::Check(text)
    } else if let Some(frame) = trimmed.strip_prefix("/inject ") {
        Line::Inject(frame)
    } else {
        Line::Comment(line)
    }
}

pub async fn run(
    filter: SpamFilter,
    model: Arc<ModelHandle<OnnxLoader>>,
    user: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let relay = Relay::default();
    let client = relay.connect();
    let bridge = relay.connect().publisher();

    let mut session = Session::new(filter, model, client.publisher());
    if let Some(name) = user {
        session.set_username(name);
    }

    let feed = spawn_feed(client, json);
    let status = spawn_status(session.model().subscribe());

    // Load up front so the first comment doesn't wait on it.
    if session.preload().await.is_err() {
        eprintln!("the next comment will retry loading the model");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            Line::Quit => break,
            Line::User(name) => {
                session.set_username(name);
                eprintln!("posting as {}", session.username());
            }
            Line::Check(text) => match session.check(text).await {
                Ok(classification) => println!("{}", display::verdict_line(text, &classification)),
                Err(e) => eprintln!("{e}"),
            },
            Line::Inject(frame) => {
                if let Err(e) = bridge.publish_frame(frame) {
                    eprintln!("rejected frame: {e}");
                }
            }
            Line::Comment(text) => match session.post(text).await {
                Ok(PostOutcome::Accepted { event, .. }) => {
                    println!("{}", display::comment_item(&event));
                }
                Ok(PostOutcome::Suppressed { classification }) => {
                    eprintln!(
                        "held back: marked as spam ({})",
                        classification.percent()
                    );
                }
                Err(SessionError::EmptyComment) => eprintln!("please enter a comment"),
                Err(e) => eprintln!("{e}"),
            },
        }
    }

    drop(session);
    drop(relay);
    feed.await?;
    status.await?;
    Ok(())
}

/// Print each model status change until the model handle is dropped.
fn spawn_status(mut rx: watch::Receiver<ModelStatus>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let status = rx.borrow_and_update().clone();
            eprintln!("{}", display::status_line(&status));
        }
    })
}

/// Print comments relayed from other clients until the relay shuts down.
fn spawn_feed(mut client: RelayClient, json: bool) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = client.next_remote().await {
            if json {
                match ChannelEvent::RemoteComment(event).to_json() {
                    Ok(frame) => println!("{frame}"),
                    Err(e) => tracing::warn!(error = %e, "could not encode remote comment"),
                }
            } else {
                println!("{}", display::comment_item(&event));
            }
        }
    })
}
