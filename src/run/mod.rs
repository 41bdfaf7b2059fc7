//! End-to-end runs.
//!
//! This module combines [`crate::syntax`], [`crate::render`], and [`crate::wire`] into a single workflow: read the
//! input, convert it, and print it as JSON. It's what the CLI uses, but it can also run within-process.
//!
//! ## Example
//!
//! ```
//! # use mdnotion::run;
//!
//! // First, let's define a mocked I/O. Replace this with whatever you need.
//! #[derive(Default)]
//! struct MockIo {
//!     stdout: Vec<u8>,
//! }
//!
//! impl run::OsFacade for MockIo {
//!     fn read_stdin(&self) -> std::io::Result<String> {
//!         Ok("- hello\n- world".to_string())
//!     }
//!
//!     fn read_file(&self, path: &str) -> std::io::Result<String> {
//!         Err(std::io::Error::new(std::io::ErrorKind::NotFound, path))
//!     }
//!
//!     fn stdout(&mut self) -> impl std::io::Write {
//!         &mut self.stdout
//!     }
//!
//!     fn write_error(&mut self, err: run::Error) {
//!         eprintln!("{err}")
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut options = run::RunOptions::default();
//! options.output = run::OutputFormat::Blocks;
//!
//! let mut os_facade = MockIo::default();
//! let ok = run::run(&options, &mut os_facade);
//! let stdout_text = String::from_utf8(os_facade.stdout)?;
//!
//! assert!(ok);
//! assert!(stdout_text.starts_with(r#"[{"type":"list","ordered":false,"items":["#));
//! #
//! #     Ok(())
//! # }
//! ```
mod cli;
mod fence_unwrap;
mod run_main;

pub use cli::*;
pub use run_main::*;
