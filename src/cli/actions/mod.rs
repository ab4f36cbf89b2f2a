pub mod server;

/// Actions the CLI can dispatch to.
#[derive(Debug)]
pub enum Action {
    Server {
        port: u16,
        dsn: String,
        private_key: String,
        public_key: String,
        issuer: String,
        jwt_duration: i64,
        session_duration: i64,
        cookie_domain: String,
        cookie_secure: bool,
    },
}
