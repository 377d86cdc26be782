//! Deployment back-end: clone a repository and launch it with Docker.
//!
//! ## Module Map
//!
//! ```text
//! ┌──────────┐   HTTP   ┌──────────────────────────────────────────────────┐
//! │ Operator │ ───────> │  server.rs  (axum Router, CORS, TraceLayer)      │
//! │   (UI)   │ <─────── │    └─ api.rs  (handlers, AppState, ApiError)     │
//! └──────────┘          │         │                                        │
//!                       │         │ Deployer::deploy() / status / stop     │
//!                       │         v                                        │
//!                       │  flow.rs     (Deployer, DeployRequest)           │
//!                       │    ├─ compose.rs  (port remap, volume strip)     │
//!                       │    ├─ inspect.rs  (status, list, stop)           │
//!                       │    └─ docker.rs   (git/docker argv, Toolchain)   │
//!                       │         │                                        │
//!                       │         v                                        │
//!                       │  runner.rs   (CommandRunner, SystemRunner)       │
//!                       └──────────────────────────────────────────────────┘
//! ```
//!
//! ## Typical Request Flow (`POST /desplegar`)
//!
//! 1. `api::deploy()` validates `nombre`, `link` and `puerto`.
//! 2. `Deployer::deploy()` creates `<projects_base>/<nombre>` and runs
//!    `git clone` unless the directory already holds a `.git`.
//! 3. With a compose file, `compose::rewrite_compose_file()` points every
//!    published port at `puerto` and drops service volumes, then
//!    `docker compose up --build -d` starts in the background.
//! 4. With a `Dockerfile`, `docker build` runs to completion and
//!    `docker run -d -p <puerto>:<internal>` starts in the background.
//! 5. The handler answers 202 without waiting for the background command.

pub mod api;
pub mod compose;
pub mod docker;
pub mod flow;
pub mod inspect;
pub mod runner;
pub mod server;
