mod error;
pub use error::{MemoriError, MemoriResult};

mod env;
pub use env::{load_dotenv, optional_env, required_env};

mod message;
pub use message::{Message, MessageRole};

mod fingerprint;
pub use fingerprint::uniq;

mod config;
pub use config::MemoriConfig;
