//! In-process demo of the challenge/response flow.
//!
//! - Server task runs a `Gate` over a TTL-bounded Moka store.
//! - Client requests a resource, gets a 428 with a puzzle, solves it on a
//!   blocking thread and retries with the solution.
//! - A replay of the same solution is turned away with a fresh puzzle.

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use hashgate::{
    client, init_logging, DateFormat, Gate, GateConfigBuilder, GateRequest, GateResponse,
    LogFormat, MokaChallengeStore, OpContext, SystemTimeProvider,
};
use tokio::sync::{mpsc, oneshot};

const CLIENT_ID: &str = "2001:db8::17";
const RESOURCE_ID: &str = "GET:/v1/quotes/random";

#[derive(Debug)]
struct Request {
    solution: Option<String>,
    reply: oneshot::Sender<GateResponse>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_logging(LogFormat::Human, "info,hashgate=debug")?;

    let cfg = GateConfigBuilder::default()
        .difficulty(18)
        .date_format(DateFormat::Yymmddhhmm)
        .build_validated()?;
    let store = Arc::new(MokaChallengeStore::with_ttl(10_000, Duration::from_secs(120)));
    let gate = Gate::new(cfg, store, Arc::new(SystemTimeProvider))?;

    let (req_tx, req_rx) = mpsc::channel::<Request>(8);
    let server = tokio::spawn(server_task(gate, req_rx));

    let first = send(&req_tx, None).await?;
    println!("first attempt: {} {:?}", first.status, first.body());
    let (_, puzzle) = first.header().ok_or("expected a puzzle")?;
    let puzzle = puzzle.to_owned();

    let solution =
        tokio::task::spawn_blocking(move || client::solve_challenge_parallel(&puzzle, 4)).await??;
    println!("solved: {solution}");

    let second = send(&req_tx, Some(solution.clone())).await?;
    println!("with solution: {}", second.status);

    let replay = send(&req_tx, Some(solution)).await?;
    println!("replayed: {} {:?}", replay.status, replay.body());

    drop(req_tx);
    server.await?;
    Ok(())
}

async fn send(
    tx: &mpsc::Sender<Request>,
    solution: Option<String>,
) -> Result<GateResponse, Box<dyn Error>> {
    let (reply, rx) = oneshot::channel();
    tx.send(Request { solution, reply }).await?;
    Ok(rx.await?)
}

async fn server_task(
    gate: Gate<MokaChallengeStore, SystemTimeProvider>,
    mut req_rx: mpsc::Receiver<Request>,
) {
    let gate = Arc::new(gate);
    while let Some(req) = req_rx.recv().await {
        let gate = gate.clone();
        // Store calls are synchronous.
        let resp = tokio::task::spawn_blocking(move || {
            let ctx = OpContext::with_timeout(Duration::from_secs(1));
            let gr = GateRequest::new(CLIENT_ID, RESOURCE_ID, req.solution.as_deref());
            (gate.respond(&ctx, &gr), req.reply)
        })
        .await;
        match resp {
            Ok((resp, reply)) => {
                let _ = reply.send(resp);
            }
            Err(e) => {
                eprintln!("gate task failed: {e}");
                break;
            }
        }
    }
}
