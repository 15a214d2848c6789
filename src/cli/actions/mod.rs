pub mod server;

#[derive(Debug)]
pub enum Action {
    Server {
        port: u16,
        backend_url: String,
        cookie_secure: bool,
    },
}
