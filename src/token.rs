//! Access-token acquisition through the `cloudflared` CLI.
//!
//! Tokens come from two shell-outs: `cloudflared access login <addr>`
//! (opens the browser flow on first use) followed by
//! `cloudflared access token -app=<addr>`. Both run through the
//! [`CommandRunner`] seam so tests never execute real binaries, and
//! the whole thing sits behind the [`TokenProvider`] trait so the
//! orchestration layer can be tested with canned tokens.

use std::process::Output;

use async_trait::async_trait;

pub const CLOUDFLARED_DOC_URL: &str =
    "https://developers.cloudflare.com/cloudflare-one/connections/connect-apps/install-and-setup/installation";

// Substring cloudflared prints when the hostname has no Access application.
const ACCESS_APP_NOT_FOUND_MSG: &str = "failed to find Access application";

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TokenError {
    /// The hostname is reachable but has no Access application in
    /// front of it. Expected for plain tunnels; callers proxy without
    /// the auth header.
    #[error("access application not found")]
    AccessAppNotFound,

    #[error("cloudflared is not installed. Please install it first: {CLOUDFLARED_DOC_URL}")]
    NotInstalled,

    #[error("cloudflared login failed: {0}")]
    LoginFailed(String),

    #[error("cloudflared token failed: {0}")]
    TokenFailed(String),

    #[error("failed to run cloudflared: {0}")]
    Io(#[from] std::io::Error),
}

/// Capability to resolve a bearer token for one `host:port` address.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self, address: &str) -> Result<String, TokenError>;
}

/// Executes a command and returns its output. Seam for tests.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn output(&self, program: &str, args: &[&str]) -> std::io::Result<Output>;
}

pub struct SystemCommand;

#[async_trait]
impl CommandRunner for SystemCommand {
    async fn output(&self, program: &str, args: &[&str]) -> std::io::Result<Output> {
        tokio::process::Command::new(program)
            .args(args)
            .output()
            .await
    }
}

/// [`TokenProvider`] backed by the real `cloudflared` binary.
pub struct CloudflaredCli<R = SystemCommand> {
    runner: R,
}

impl CloudflaredCli {
    #[must_use]
    pub fn new() -> Self {
        Self {
            runner: SystemCommand,
        }
    }
}

impl Default for CloudflaredCli {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CommandRunner> CloudflaredCli<R> {
    pub fn with_runner(runner: R) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl<R: CommandRunner> TokenProvider for CloudflaredCli<R> {
    async fn access_token(&self, address: &str) -> Result<String, TokenError> {
        tracing::debug!(address, "running cloudflared access login");
        let login = self
            .runner
            .output("cloudflared", &["access", "login", address])
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TokenError::NotInstalled
                } else {
                    TokenError::Io(e)
                }
            })?;

        if !login.status.success() {
            let output = combined_output(&login);
            if output.contains(ACCESS_APP_NOT_FOUND_MSG) {
                return Err(TokenError::AccessAppNotFound);
            }
            return Err(TokenError::LoginFailed(output));
        }

        tracing::debug!(address, "running cloudflared access token");
        let app_flag = format!("-app={address}");
        let token = self
            .runner
            .output("cloudflared", &["access", "token", &app_flag])
            .await?;

        if !token.status.success() {
            return Err(TokenError::TokenFailed(combined_output(&token)));
        }

        Ok(String::from_utf8_lossy(&token.stdout).trim().to_string())
    }
}

fn combined_output(output: &Output) -> String {
    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    combined.trim().to_string()
}
