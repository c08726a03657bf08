mod http;
mod session;
mod traits;

pub use http::HttpClient;
pub use session::{
    FileTokenStore, MemoryTokenStore, Session, SessionError, SessionEvents, TokenStore, TOKEN_KEY,
};
pub use traits::{ApiClient, ClientError};
