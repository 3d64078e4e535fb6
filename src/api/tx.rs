use actix_web::{HttpResponse, Responder, get, post, web};
use log::{debug, info, warn};
use std::time::Instant;

use super::models::{AppState, MempoolResponse, NewTxRequest, NewTxResponse};
use crate::transaction::Transaction;

/// Submit a new transaction into the pool. Full validation (references,
/// signatures, amounts, pool conflicts) happens inside the ledger.
#[post("/tx/")]
pub async fn post_transaction(
    state: web::Data<AppState>,
    body: web::Json<NewTxRequest>,
) -> impl Responder {
    let t0 = Instant::now();
    let body = body.into_inner();
    debug!(
        "POST /tx/ - received: inputs={}, outputs={}",
        body.tx_ins.len(),
        body.tx_outs.len()
    );

    let mut tx = Transaction::new(body.tx_ins, body.tx_outs);
    if let Some(id) = body.id {
        tx.id = id;
    }
    let txid = tx.id.clone();

    let block_index = {
        let mut ledger = state.ledger.lock().expect("mutex poisoned");
        match ledger.submit_transaction(tx) {
            Ok(index) => index,
            Err(e) => {
                warn!("POST /tx/ - rejected txid={txid}: {e}");
                return HttpResponse::BadRequest().body(e.to_string());
            }
        }
    };

    info!("POST /tx/ - txid={txid} OK ({} ms)", t0.elapsed().as_millis());

    HttpResponse::Created().json(NewTxResponse {
        message: format!("Transaction will be added to Block {block_index}"),
        txid,
        block_index,
    })
}

/// List current mempool (just txids to keep it compact).
#[get("/mempool/")]
pub async fn get_mempool(state: web::Data<AppState>) -> impl Responder {
    let ledger = state.ledger.lock().expect("mutex poisoned");
    let pool = ledger.pool();
    HttpResponse::Ok().json(MempoolResponse {
        size: pool.len(),
        transactions: pool.pending().iter().map(|t| t.id.clone()).collect(),
    })
}
