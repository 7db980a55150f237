mod env;
mod server;

pub use self::env::{EnvLookup, env_flag, env_is_set, env_or, parse_env_or, process_env};
pub use self::server::GrpcServerConfig;
