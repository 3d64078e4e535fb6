use actix_web::{HttpResponse, Responder, post};

use super::models::WalletResponse;
use crate::wallet::generate_keypair_hex;

/// Dev convenience: a fresh key pair whose public key doubles as an address.
#[post("/wallet/new/")]
pub async fn create_wallet() -> impl Responder {
    let (private_key, public_key, address) = generate_keypair_hex();
    HttpResponse::Created().json(WalletResponse {
        private_key,
        public_key,
        address,
    })
}
