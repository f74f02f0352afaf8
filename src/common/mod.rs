pub mod mock_rpc;
pub mod rpc_client_wrapper;
pub mod types;

pub use mock_rpc::MockTransactionSource;
pub use rpc_client_wrapper::{
    FetchError, RpcTransactionSource, SignatureQuery, TransactionSource, parse_address,
};
pub use types::*;
