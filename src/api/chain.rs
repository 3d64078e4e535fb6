use actix_web::{HttpResponse, Responder, get, post, web};
use log::{error, info};

use super::models::{AppState, MineRequest, MineResponse, ValidateResponse};

/// Get the full blockchain, in the format peers fetch during resolution.
#[get("/chain/")]
pub async fn get_chain(state: web::Data<AppState>) -> impl Responder {
    let ledger = state.ledger.lock().expect("mutex poisoned");
    HttpResponse::Ok().json(ledger.chain_snapshot())
}

/// Validate the whole chain.
#[get("/validate/")]
pub async fn validate_chain(state: web::Data<AppState>) -> impl Responder {
    let ledger = state.ledger.lock().expect("mutex poisoned");
    HttpResponse::Ok().json(ValidateResponse {
        valid: ledger.chain().is_valid(),
        length: ledger.chain().len(),
    })
}

/// Mine a new block from the pending pool:
/// - Build the template (coinbase first, pool drained) under the lock
/// - Search the nonce on the blocking pool, lock released
/// - Re-lock and append from the worker; a block built on a replaced chain
///   is discarded
#[post("/mine/")]
pub async fn mine_block(state: web::Data<AppState>, req: web::Json<MineRequest>) -> impl Responder {
    let requested = req
        .miner_address
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string);
    let Some(miner_address) = requested.or_else(|| state.miner_address.clone()) else {
        return HttpResponse::BadRequest().body("miner_address required");
    };

    let template = {
        let mut ledger = state.ledger.lock().expect("mutex poisoned");
        match ledger.prepare_block(&miner_address) {
            Ok(template) => template,
            Err(e) => return HttpResponse::BadRequest().body(e.to_string()),
        }
    }; // release the ledger before the search
    info!(
        "MINER - solving block #{} on {} ({} txs, diff={})",
        template.index(),
        template.previous_hash(),
        template.transactions().len(),
        template.difficulty()
    );

    // Solve and commit on the blocking pool. The task runs to completion
    // even if the request is dropped.
    let fallback = template.clone();
    let worker = state.clone();
    let outcome = web::block(move || {
        let block = template.solve();
        let mut ledger = worker.ledger.lock().expect("mutex poisoned");
        ledger.commit_block(block).cloned()
    })
    .await;

    match outcome {
        Ok(Ok(sealed)) => HttpResponse::Ok().json(MineResponse::from(&sealed)),
        Ok(Err(e)) => HttpResponse::Conflict().body(format!("block discarded: {e}")),
        Err(e) => {
            error!("MINER - proof-of-work worker failed: {e}");
            let mut ledger = state.ledger.lock().expect("mutex poisoned");
            ledger.abandon_block(fallback);
            HttpResponse::InternalServerError().body("proof-of-work worker failed")
        }
    }
}
