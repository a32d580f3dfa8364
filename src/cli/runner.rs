//! CLI runner - executes commands

use crate::api::{GiteaClient, HookScope};
use crate::auth::{AuthConverters, AuthToken, SecretText, UsernamePassword};
use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::{load_servers, ServerConfig};
use crate::connection::{BackendRegistry, ConnectionRequest, DefaultConnectionFactory, HttpConfig};
use crate::error::{Error, Result};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
    cancellation: CancellationToken,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self {
            cli,
            cancellation: CancellationToken::new(),
        }
    }

    /// Token that interrupts the running command when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let server = self.server()?;
        let auth = self.auth()?;
        let request = server
            .connection_request(auth)
            .cancellation(self.cancellation.clone());

        let http_config = HttpConfig::builder()
            .timeout(Duration::from_secs(self.cli.timeout))
            .build();
        let registry =
            BackendRegistry::with_fallback(Arc::new(DefaultConnectionFactory::with_config(http_config)));

        info!("Connecting to {}", server.server_url);
        let mut client = GiteaClient::open(&registry, &request).await?;
        let result = self.execute(&mut client).await;
        client.close().await?;
        result
    }

    async fn execute(&self, client: &mut GiteaClient) -> Result<()> {
        match &self.cli.command {
            Commands::Version => self.output(&client.fetch_version().await?),
            Commands::Whoami => self.output(&client.fetch_current_user().await?),
            Commands::Repos { owner } => {
                let owner = client.fetch_owner(owner).await?;
                self.output(&client.fetch_repositories(&owner).await?)
            }
            Commands::Branches { owner, repo } => {
                self.output(&client.fetch_branches(owner, repo).await?)
            }
            Commands::Tags { owner, repo } => self.output(&client.fetch_tags(owner, repo).await?),
            Commands::Pulls { owner, repo, state } => {
                self.output(&client.fetch_pull_requests(owner, repo, *state).await?)
            }
            Commands::Issues { owner, repo, state } => {
                self.output(&client.fetch_issues(owner, repo, *state).await?)
            }
            Commands::Hooks { owner, repo } => {
                let scope = match repo {
                    Some(repo) => HookScope::Repository { owner, repo },
                    None => HookScope::Organization(owner),
                };
                self.output(&client.fetch_hooks(scope).await?)
            }
        }
    }

    /// Resolve the target server from `--server` or the servers file
    fn server(&self) -> Result<ServerConfig> {
        if let Some(url) = &self.cli.server {
            return ServerConfig::new(url.as_str());
        }

        let path = self
            .cli
            .servers
            .as_ref()
            .ok_or_else(|| Error::config("No server specified (use --server or --servers)"))?;
        let servers = load_servers(path)?;

        let server = match &self.cli.server_id {
            Some(id) => servers.find_by_credentials_id(id).ok_or_else(|| {
                Error::config(format!("No server with credentials id '{id}'"))
            })?,
            None => servers
                .servers
                .first()
                .ok_or_else(|| Error::config("Servers file lists no servers"))?,
        };
        Ok(server.clone())
    }

    /// Convert command-line credentials into a token
    fn auth(&self) -> Result<AuthToken> {
        let converters = AuthConverters::with_defaults();
        match (&self.cli.token, &self.cli.username, &self.cli.password) {
            (Some(_), Some(_), _) => Err(Error::config(
                "Use either --token or --username/--password, not both",
            )),
            (Some(token), None, _) => converters.convert(&SecretText::new(token.as_str())),
            (None, Some(username), Some(password)) => {
                converters.convert(&UsernamePassword::new(username.as_str(), password.as_str()))
            }
            _ => Ok(AuthToken::Anonymous),
        }
    }

    fn output<T: Serialize>(&self, value: &T) -> Result<()> {
        let rendered = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(value)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        };
        println!("{rendered}");
        Ok(())
    }

    /// The request this runner would open, for inspection
    pub fn connection_request(&self) -> Result<ConnectionRequest> {
        Ok(self.server()?.connection_request(self.auth()?))
    }
}
