//! Command line argument parsing

use crate::core::context::{ResolverOptions, SoftDenialPolicy};
use crate::platform::client::HttpClientConfig;
use crate::platform::resolver::StrategyKind;
use clap::{Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use std::time::Duration;

/// Video metadata resolver and caching stream proxy
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// HTTP timeout per upstream request (e.g., 10s, 1m)
    #[arg(long, global = true, value_name = "DURATION", default_value = "10s")]
    pub timeout: humantime::Duration,

    /// TTL of cached bodies, metadata, stream targets and cipher programs
    #[arg(long, global = true, value_name = "DURATION", default_value = "1h")]
    pub cache_ttl: humantime::Duration,

    /// Strategies to try, in order (api, watch, legacy)
    #[arg(
        long,
        global = true,
        value_name = "LIST",
        value_delimiter = ',',
        default_value = "api,watch,legacy"
    )]
    pub strategies: Vec<StrategyKind>,

    /// Whether soft-denied videos still get stream urls
    #[arg(long, global = true, value_enum, default_value = "metadata-only")]
    pub soft_denial: SoftDenialMode,

    /// Internal API client name (default ANDROID)
    #[arg(long, global = true, value_name = "NAME")]
    pub client_name: Option<String>,

    /// Internal API client version (default 16.02)
    #[arg(long, global = true, value_name = "VERSION")]
    pub client_version: Option<String>,

    /// Override User-Agent header
    #[arg(long, global = true, value_name = "USER_AGENT")]
    pub user_agent: Option<String>,

    /// Proxy URL (http/https/socks)
    #[arg(long, global = true, value_name = "URL")]
    pub proxy: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet output (only errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Run the HTTP front end
    Serve {
        /// Address to listen on
        #[arg(long, value_name = "ADDR", default_value = "127.0.0.1:8080")]
        listen: SocketAddr,

        /// Include stream urls in info JSON
        #[arg(long)]
        expose_urls: bool,
    },
    /// Resolve one video and print its metadata as JSON
    Info {
        /// Video ID or watch/short/share URL
        video: String,

        /// Print only the target of this stream
        #[arg(long, value_name = "TAG")]
        itag: Option<String>,
    },
}

/// Soft-denial handling
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum SoftDenialMode {
    /// Return metadata without stream urls
    MetadataOnly,
    /// Build stream urls anyway
    BuildUrls,
}

impl From<SoftDenialMode> for SoftDenialPolicy {
    fn from(mode: SoftDenialMode) -> Self {
        match mode {
            SoftDenialMode::MetadataOnly => SoftDenialPolicy::MetadataOnly,
            SoftDenialMode::BuildUrls => SoftDenialPolicy::BuildUrls,
        }
    }
}

impl Args {
    /// Get HTTP timeout as Duration
    pub fn timeout_duration(&self) -> Duration {
        self.timeout.into()
    }

    /// Get cache TTL as Duration
    pub fn cache_ttl_duration(&self) -> Duration {
        self.cache_ttl.into()
    }

    /// Resolver options reflecting the command line
    pub fn resolver_options(&self) -> ResolverOptions {
        let http = HttpClientConfig {
            timeout: self.timeout_duration(),
            user_agent: self.user_agent.clone(),
            proxy_url: self.proxy.clone(),
            ..HttpClientConfig::default()
        };

        let defaults = ResolverOptions::default();
        let client_name = self
            .client_name
            .clone()
            .unwrap_or_else(|| defaults.client_name.clone());
        let client_version = self
            .client_version
            .clone()
            .unwrap_or_else(|| defaults.client_version.clone());

        defaults
            .with_client(&client_name, &client_version)
            .with_http(http)
            .with_strategies(self.strategies.clone())
            .with_soft_denial(self.soft_denial.into())
            .with_cache_ttl(self.cache_ttl_duration())
    }

    /// Get output verbosity level
    pub fn verbosity_level(&self) -> VerbosityLevel {
        if self.quiet {
            VerbosityLevel::Quiet
        } else if self.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }
}

/// Output verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbosityLevel {
    /// Quiet (only errors)
    Quiet,
    /// Normal
    Normal,
    /// Verbose (debug info)
    Verbose,
}

impl VerbosityLevel {
    /// Default log filter for this level
    pub fn log_filter(&self) -> &'static str {
        match self {
            VerbosityLevel::Quiet => "error",
            VerbosityLevel::Normal => "info",
            VerbosityLevel::Verbose => "debug",
        }
    }
}
