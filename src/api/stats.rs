use actix_web::{HttpResponse, Responder, get, web};

use super::models::{AppState, StatsResponse};

#[get("/stats/")]
pub async fn get_stats(state: web::Data<AppState>) -> impl Responder {
    let peers = state.peers.lock().expect("mutex poisoned").len();

    let ledger = state.ledger.lock().expect("mutex poisoned");
    let blocks = ledger.chain().blocks();
    let retarget = &ledger.config().retarget;
    let height = blocks.len();

    let last_interval_secs = match blocks {
        [.., older, newer] => Some(newer.timestamp.saturating_sub(older.timestamp)),
        _ => None,
    };

    // average over the last adjustment window, genesis excluded
    let window = (retarget.difficulty_adjustment_interval as usize).min(height.saturating_sub(2));
    let avg_interval_secs = (window > 0).then(|| {
        let newer = &blocks[height - 1];
        let older = &blocks[height - 1 - window];
        newer.timestamp.saturating_sub(older.timestamp) as f64 / window as f64
    });

    HttpResponse::Ok().json(StatsResponse {
        node_id: state.node_id.clone(),
        height,
        difficulty: ledger.chain().last_block().difficulty,
        next_difficulty: ledger.next_difficulty(),
        block_generation_interval: retarget.block_generation_interval,
        difficulty_adjustment_interval: retarget.difficulty_adjustment_interval,
        last_interval_secs,
        avg_interval_secs,
        mempool_size: ledger.pool().len(),
        utxo_size: ledger.chain().outputs().len(),
        peers,
    })
}
