use actix_web::{HttpResponse, Responder, get, post, web};
use log::{error, info};

use super::models::{AppState, RegisterNodesRequest, RegisterNodesResponse, ResolveResponse};
use crate::consensus::{self, HttpPeerClient, PeerRegistry};

/// Register peers. Every entry is checked before any is added.
#[post("/nodes/register/")]
pub async fn register_nodes(
    state: web::Data<AppState>,
    body: web::Json<RegisterNodesRequest>,
) -> impl Responder {
    if body.nodes.is_empty() {
        return HttpResponse::BadRequest().body("Please supply a valid list of nodes");
    }
    let normalized = match body
        .nodes
        .iter()
        .map(|raw| PeerRegistry::normalize(raw))
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(nodes) => nodes,
        Err(e) => return HttpResponse::BadRequest().body(e.to_string()),
    };

    let mut peers = state.peers.lock().expect("mutex poisoned");
    for node in &normalized {
        if let Err(e) = peers.register(node) {
            return HttpResponse::BadRequest().body(e.to_string());
        }
    }
    info!("NODES - registered {} peer(s), {} known", normalized.len(), peers.len());

    HttpResponse::Created().json(RegisterNodesResponse {
        message: "New nodes have been added",
        total_nodes: peers.list(),
    })
}

/// Consensus: adopt the longest valid chain among the registered peers.
/// Peers are polled on the blocking pool with the ledger unlocked.
#[get("/nodes/resolve/")]
pub async fn resolve_nodes(state: web::Data<AppState>) -> impl Responder {
    let peers = state.peers.lock().expect("mutex poisoned").list();
    let timeout = state.peer_timeout;

    let fetched = web::block(move || {
        let client = HttpPeerClient::new(timeout)?;
        Ok::<_, consensus::PeerError>(consensus::fetch_candidates(&peers, &client))
    })
    .await;
    let candidates = match fetched {
        Ok(Ok(candidates)) => candidates,
        Ok(Err(e)) => {
            error!("NODES - could not build peer client: {e}");
            return HttpResponse::InternalServerError().body(e.to_string());
        }
        Err(e) => {
            error!("NODES - resolve worker failed: {e}");
            return HttpResponse::InternalServerError().body("resolve worker failed");
        }
    };

    let mut ledger = state.ledger.lock().expect("mutex poisoned");
    let replaced = ledger.adopt_longest(candidates);
    let snapshot = ledger.chain_snapshot();

    HttpResponse::Ok().json(ResolveResponse {
        message: if replaced {
            "Our chain was replaced"
        } else {
            "Our chain is authoritative"
        },
        replaced,
        length: snapshot.length,
        chain: snapshot.chain,
    })
}
