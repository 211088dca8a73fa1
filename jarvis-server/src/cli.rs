use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "jarvis-server",
    about = "JARVIS Gateway - stateless edge proxy for a hosted inference API",
    version = env!("CARGO_PKG_VERSION"),
    author,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, env = "JARVIS_PORT", default_value = "8790")]
    pub port: u16,

    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    #[arg(
        long,
        env = "JARVIS_ALLOWED_ORIGINS",
        value_delimiter = ',',
        help = "Exact origin strings the gate accepts (repeatable)"
    )]
    pub allow_origin: Vec<String>,

    #[arg(
        long,
        env = "JARVIS_GATE_POLICY",
        default_value = "permissive",
        help = "Origin gate variant: 'permissive' (user-agent fallback) or 'strict'"
    )]
    pub gate_policy: String,

    #[arg(
        long,
        env = "JARVIS_UPSTREAM_API",
        default_value = "chat-completions",
        help = "Upstream API flavor: 'chat-completions' or 'text-generation'"
    )]
    pub upstream_api: String,

    #[arg(long, env = "JARVIS_UPSTREAM_URL", help = "Override the upstream endpoint URL")]
    pub upstream_url: Option<String>,

    #[arg(long, env = "JARVIS_MODEL", help = "Override the upstream model identifier")]
    pub model: Option<String>,

    #[arg(long, help = "Bind 0.0.0.0 instead of 127.0.0.1")]
    pub listen_all: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Start the gateway (default if no command specified)")]
    Serve {
        #[arg(short, long, env = "JARVIS_PORT", default_value = "8790")]
        port: u16,
    },

    #[command(about = "Probe a running gateway's /health endpoint")]
    Status {
        #[arg(short, long, env = "JARVIS_PORT", default_value = "8790")]
        port: u16,
    },
}
