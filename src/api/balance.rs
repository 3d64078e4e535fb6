use actix_web::{HttpResponse, Responder, get, web};

use super::models::{AppState, BalanceResponse};

/// Sum of the unspent outputs locked to `address` on the current chain.
#[get("/balance/{address}/")]
pub async fn get_balance(state: web::Data<AppState>, path: web::Path<(String,)>) -> impl Responder {
    let address = path.into_inner().0;

    let (balance, utxos) = {
        let ledger = state.ledger.lock().expect("mutex poisoned");
        ledger.chain().outputs().balance_of(&address)
    };

    HttpResponse::Ok().json(BalanceResponse {
        address,
        balance,
        utxos,
    })
}
