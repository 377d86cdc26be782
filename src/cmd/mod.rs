//! CLI command implementations.
//!
//! | Module     | Commands handled |
//! |------------|------------------|
//! | `serve`    | `Serve`          |
//! | `rewrite`  | `Rewrite`        |
//! | `config`   | `Config`         |

pub mod config;
pub mod rewrite;
pub mod serve;

pub use config::cmd_config;
pub use rewrite::cmd_rewrite;
pub use serve::cmd_serve;
