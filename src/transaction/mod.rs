pub mod model;
pub mod utxo;
pub mod validation;

pub use model::{Address, InputSignature, OutPoint, Transaction, TxIn, TxOut};
pub use utxo::{OutputIndex, OutputLookup};
pub use validation::{validate_input, validate_transaction};
